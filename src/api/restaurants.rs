use axum::{
    Json,
    extract::State,
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use super::{
    validated_body,
    views::{AddressForm, AddressView, NameRef},
};
use crate::{
    domain::{Kitchen, Product, Restaurant},
    errors::ApiError,
    extract::{AppJson, AppPath, AppQuery, RequestBody},
    service::{kitchens, products, restaurants},
    state::AppState,
    store::Store,
};

/// Largest price or freight fee accepted from clients: 10,000,000.00.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 2);

fn valid_amount(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() || *value > MAX_AMOUNT {
        let mut err = ValidationError::new("amount");
        err.message = Some(format!("must be between 0 and {MAX_AMOUNT}").into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct RestaurantForm {
    #[validate(length(min = 1, message = "must not be blank"))]
    pub name: String,
    #[validate(custom(function = "valid_amount"))]
    pub freight_fee: Decimal,
    pub kitchen_id: u64,
    #[validate(nested)]
    pub address: Option<AddressForm>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct ProductForm {
    #[validate(length(min = 1, message = "must not be blank"))]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[validate(custom(function = "valid_amount"))]
    pub price: Decimal,
    #[serde(default = "default_true")]
    pub active: bool,
}

fn default_true() -> bool {
    true
}

validated_body!(RestaurantForm, ProductForm);

/// Body of the bulk activation endpoints: a JSON array of restaurant ids.
#[derive(Debug, Deserialize)]
#[serde(transparent)]
pub struct IdList(pub Vec<u64>);

impl RequestBody for IdList {}

impl RestaurantForm {
    /// Copy the editable fields onto `target`. Id, activation, opening state
    /// and creation time are left untouched.
    fn copy_onto(self, target: &mut Restaurant) {
        target.name = self.name;
        target.freight_fee = self.freight_fee;
        target.kitchen_id = self.kitchen_id;
        target.address = self.address.map(Into::into);
    }
}

impl ProductForm {
    fn copy_onto(self, target: &mut Product) {
        target.name = self.name;
        target.description = self.description;
        target.price = self.price;
        target.active = self.active;
    }
}

/// Which shape `GET /restaurantes` returns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub enum Projection {
    #[default]
    #[serde(rename = "resumo")]
    Summary,
    #[serde(rename = "apenas-nome")]
    NameOnly,
    #[serde(rename = "completo")]
    Complete,
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    #[serde(default)]
    pub projecao: Projection,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RestaurantSummary {
    pub id: u64,
    pub name: String,
    pub freight_fee: Decimal,
    pub kitchen: Kitchen,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RestaurantView {
    pub id: u64,
    pub name: String,
    pub freight_fee: Decimal,
    pub kitchen: Kitchen,
    pub active: bool,
    pub open: bool,
    pub address: Option<AddressView>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum RestaurantListing {
    Summary(Vec<RestaurantSummary>),
    NameOnly(Vec<NameRef>),
    Complete(Vec<RestaurantView>),
}

impl RestaurantView {
    fn build(store: &Store, r: Restaurant) -> Result<Self, ApiError> {
        let kitchen = kitchens::find_or_fail(store, r.kitchen_id)?;
        let address = r
            .address
            .map(|a| AddressView::build(store, a))
            .transpose()?;
        Ok(RestaurantView {
            id: r.id,
            name: r.name,
            freight_fee: r.freight_fee,
            kitchen,
            active: r.active,
            open: r.open,
            address,
            created_at: r.created_at,
            updated_at: r.updated_at,
        })
    }
}

impl RestaurantSummary {
    fn build(store: &Store, r: Restaurant) -> Result<Self, ApiError> {
        let kitchen = kitchens::find_or_fail(store, r.kitchen_id)?;
        Ok(RestaurantSummary {
            id: r.id,
            name: r.name,
            freight_fee: r.freight_fee,
            kitchen,
        })
    }
}

/// Shape `rows` as requested by `projection`.
pub fn project(
    store: &Store,
    rows: Vec<Restaurant>,
    projection: Projection,
) -> Result<RestaurantListing, ApiError> {
    Ok(match projection {
        Projection::Summary => RestaurantListing::Summary(
            rows.into_iter()
                .map(|r| RestaurantSummary::build(store, r))
                .collect::<Result<_, _>>()?,
        ),
        Projection::NameOnly => RestaurantListing::NameOnly(
            rows.into_iter()
                .map(|r| NameRef {
                    id: r.id,
                    name: r.name,
                })
                .collect(),
        ),
        Projection::Complete => RestaurantListing::Complete(
            rows.into_iter()
                .map(|r| RestaurantView::build(store, r))
                .collect::<Result<_, _>>()?,
        ),
    })
}

pub async fn list(
    State(state): State<AppState>,
    AppQuery(params): AppQuery<ListParams>,
) -> Result<Json<RestaurantListing>, ApiError> {
    let store = state.store();
    let rows = restaurants::list(&store)?;
    Ok(Json(project(&store, rows, params.projecao)?))
}

pub async fn find(
    State(state): State<AppState>,
    AppPath(id): AppPath<u64>,
) -> Result<Json<RestaurantView>, ApiError> {
    let store = state.store();
    let restaurant = restaurants::find_or_fail(&store, id)?;
    Ok(Json(RestaurantView::build(&store, restaurant)?))
}

pub async fn create(
    State(state): State<AppState>,
    AppJson(form): AppJson<RestaurantForm>,
) -> Result<(StatusCode, Json<RestaurantView>), ApiError> {
    let mut store = state.store();
    let now = Utc::now();
    let mut restaurant = Restaurant {
        id: 0,
        name: String::new(),
        freight_fee: Decimal::ZERO,
        kitchen_id: 0,
        active: true,
        open: false,
        address: None,
        created_at: now,
        updated_at: now,
    };
    form.copy_onto(&mut restaurant);
    let restaurant = restaurants::save(&mut store, restaurant)?;
    Ok((
        StatusCode::CREATED,
        Json(RestaurantView::build(&store, restaurant)?),
    ))
}

pub async fn update(
    State(state): State<AppState>,
    AppPath(id): AppPath<u64>,
    AppJson(form): AppJson<RestaurantForm>,
) -> Result<Json<RestaurantView>, ApiError> {
    let mut store = state.store();
    let mut restaurant = restaurants::find_or_fail(&store, id)?;
    form.copy_onto(&mut restaurant);
    let restaurant = restaurants::save(&mut store, restaurant)?;
    Ok(Json(RestaurantView::build(&store, restaurant)?))
}

pub async fn remove(
    State(state): State<AppState>,
    AppPath(id): AppPath<u64>,
) -> Result<StatusCode, ApiError> {
    let mut store = state.store();
    restaurants::remove(&mut store, id)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn activate(
    State(state): State<AppState>,
    AppPath(id): AppPath<u64>,
) -> Result<StatusCode, ApiError> {
    let mut store = state.store();
    restaurants::activate(&mut store, id)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn inactivate(
    State(state): State<AppState>,
    AppPath(id): AppPath<u64>,
) -> Result<StatusCode, ApiError> {
    let mut store = state.store();
    restaurants::inactivate(&mut store, id)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn activate_many(
    State(state): State<AppState>,
    AppJson(IdList(ids)): AppJson<IdList>,
) -> Result<StatusCode, ApiError> {
    let mut store = state.store();
    restaurants::set_active_many(&mut store, &ids, true).map_err(ApiError::into_business_rule)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn inactivate_many(
    State(state): State<AppState>,
    AppJson(IdList(ids)): AppJson<IdList>,
) -> Result<StatusCode, ApiError> {
    let mut store = state.store();
    restaurants::set_active_many(&mut store, &ids, false).map_err(ApiError::into_business_rule)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn open(
    State(state): State<AppState>,
    AppPath(id): AppPath<u64>,
) -> Result<StatusCode, ApiError> {
    let mut store = state.store();
    restaurants::open(&mut store, id)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn close(
    State(state): State<AppState>,
    AppPath(id): AppPath<u64>,
) -> Result<StatusCode, ApiError> {
    let mut store = state.store();
    restaurants::close(&mut store, id)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_products(
    State(state): State<AppState>,
    AppPath(restaurant_id): AppPath<u64>,
) -> Result<Json<Vec<Product>>, ApiError> {
    let store = state.store();
    Ok(Json(products::list(&store, restaurant_id)?))
}

pub async fn find_product(
    State(state): State<AppState>,
    AppPath((restaurant_id, product_id)): AppPath<(u64, u64)>,
) -> Result<Json<Product>, ApiError> {
    let store = state.store();
    Ok(Json(products::find_or_fail(&store, restaurant_id, product_id)?))
}

pub async fn create_product(
    State(state): State<AppState>,
    AppPath(restaurant_id): AppPath<u64>,
    AppJson(form): AppJson<ProductForm>,
) -> Result<(StatusCode, Json<Product>), ApiError> {
    let mut store = state.store();
    let mut product = Product {
        id: 0,
        restaurant_id,
        name: String::new(),
        description: String::new(),
        price: Decimal::ZERO,
        active: true,
    };
    form.copy_onto(&mut product);
    let product = products::save(&mut store, product)?;
    Ok((StatusCode::CREATED, Json(product)))
}

pub async fn update_product(
    State(state): State<AppState>,
    AppPath((restaurant_id, product_id)): AppPath<(u64, u64)>,
    AppJson(form): AppJson<ProductForm>,
) -> Result<Json<Product>, ApiError> {
    let mut store = state.store();
    let mut product = products::find_or_fail(&store, restaurant_id, product_id)?;
    form.copy_onto(&mut product);
    Ok(Json(products::save(&mut store, product)?))
}
