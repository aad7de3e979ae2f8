use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;
use validator::Validate;

use super::validated_body;
use crate::{
    domain::Kitchen,
    errors::ApiError,
    extract::{AppJson, AppPath},
    service::kitchens,
    state::AppState,
};

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct KitchenForm {
    #[validate(length(min = 1, message = "must not be blank"))]
    pub name: String,
}

validated_body!(KitchenForm);

impl KitchenForm {
    fn copy_onto(self, target: &mut Kitchen) {
        target.name = self.name;
    }
}

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Kitchen>>, ApiError> {
    let store = state.store();
    Ok(Json(kitchens::list(&store)?))
}

pub async fn find(
    State(state): State<AppState>,
    AppPath(id): AppPath<u64>,
) -> Result<Json<Kitchen>, ApiError> {
    let store = state.store();
    Ok(Json(kitchens::find_or_fail(&store, id)?))
}

pub async fn create(
    State(state): State<AppState>,
    AppJson(form): AppJson<KitchenForm>,
) -> Result<(StatusCode, Json<Kitchen>), ApiError> {
    let mut store = state.store();
    let kitchen = kitchens::save(
        &mut store,
        Kitchen {
            id: 0,
            name: form.name,
        },
    )?;
    Ok((StatusCode::CREATED, Json(kitchen)))
}

pub async fn update(
    State(state): State<AppState>,
    AppPath(id): AppPath<u64>,
    AppJson(form): AppJson<KitchenForm>,
) -> Result<Json<Kitchen>, ApiError> {
    let mut store = state.store();
    let mut kitchen = kitchens::find_or_fail(&store, id)?;
    form.copy_onto(&mut kitchen);
    Ok(Json(kitchens::save(&mut store, kitchen)?))
}

pub async fn remove(
    State(state): State<AppState>,
    AppPath(id): AppPath<u64>,
) -> Result<StatusCode, ApiError> {
    let mut store = state.store();
    kitchens::remove(&mut store, id)?;
    Ok(StatusCode::NO_CONTENT)
}
