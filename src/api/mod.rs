//! HTTP surface. Handlers lock the store, call one service function and map
//! the result onto a response shape.

use axum::{
    Router,
    http::Uri,
    middleware,
    routing::{get, put},
};
use tower_http::trace::TraceLayer;

use crate::{errors::ApiError, problem::normalize_error_body, state::AppState};

/// Wire a body type's `validator` rules into [`RequestBody::check`](crate::extract::RequestBody::check).
macro_rules! validated_body {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::extract::RequestBody for $ty {
                fn check(&self) -> Result<(), Vec<$crate::errors::FieldViolation>> {
                    validator::Validate::validate(self)
                        .map_err(|e| $crate::extract::violations(&e))
                }
            }
        )+
    };
}
pub(crate) use validated_body;

pub mod cities;
pub mod kitchens;
pub mod orders;
pub mod provinces;
pub mod restaurants;
pub mod users;
pub mod views;

async fn resource_not_found(uri: Uri) -> ApiError {
    ApiError::ResourceNotFound(uri.path().to_string())
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/estados", get(provinces::list).post(provinces::create))
        .route(
            "/estados/{id}",
            get(provinces::find)
                .put(provinces::update)
                .delete(provinces::remove),
        )
        .route("/cidades", get(cities::list).post(cities::create))
        .route(
            "/cidades/{id}",
            get(cities::find).put(cities::update).delete(cities::remove),
        )
        .route("/cozinhas", get(kitchens::list).post(kitchens::create))
        .route(
            "/cozinhas/{id}",
            get(kitchens::find)
                .put(kitchens::update)
                .delete(kitchens::remove),
        )
        .route("/usuarios", get(users::list).post(users::create))
        .route(
            "/usuarios/{id}",
            get(users::find).put(users::update).delete(users::remove),
        )
        .route("/usuarios/{id}/senha", put(users::change_password))
        .route(
            "/restaurantes",
            get(restaurants::list).post(restaurants::create),
        )
        .route(
            "/restaurantes/ativacoes",
            put(restaurants::activate_many).delete(restaurants::inactivate_many),
        )
        .route(
            "/restaurantes/{id}",
            get(restaurants::find)
                .put(restaurants::update)
                .delete(restaurants::remove),
        )
        .route("/restaurantes/{id}/ativo", put(restaurants::activate))
        .route(
            "/restaurantes/{id}/inativo",
            axum::routing::delete(restaurants::inactivate),
        )
        .route("/restaurantes/{id}/abertura", put(restaurants::open))
        .route("/restaurantes/{id}/fechamento", put(restaurants::close))
        .route(
            "/restaurantes/{id}/produtos",
            get(restaurants::list_products).post(restaurants::create_product),
        )
        .route(
            "/restaurantes/{id}/produtos/{product_id}",
            get(restaurants::find_product).put(restaurants::update_product),
        )
        .route("/pedidos", get(orders::list).post(orders::create))
        .route("/pedidos/{code}", get(orders::find))
        .route(
            "/pedidos/{code}/confirmacao",
            put(orders::confirm).post(orders::confirm),
        )
        .route("/pedidos/{code}/cancelamento", put(orders::cancel))
        .route("/pedidos/{code}/entregua", put(orders::deliver))
        .fallback(resource_not_found)
        .layer(middleware::from_fn(normalize_error_body))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
