use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;
use validator::Validate;

use super::validated_body;
use crate::{
    domain::Province,
    errors::ApiError,
    extract::{AppJson, AppPath},
    service::provinces,
    state::AppState,
};

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct ProvinceForm {
    #[validate(length(min = 1, message = "must not be blank"))]
    pub name: String,
}

validated_body!(ProvinceForm);

impl ProvinceForm {
    /// Copy every field except the id onto `target`.
    fn copy_onto(self, target: &mut Province) {
        target.name = self.name;
    }
}

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Province>>, ApiError> {
    let store = state.store();
    Ok(Json(provinces::list(&store)?))
}

pub async fn find(
    State(state): State<AppState>,
    AppPath(id): AppPath<u64>,
) -> Result<Json<Province>, ApiError> {
    let store = state.store();
    Ok(Json(provinces::find_or_fail(&store, id)?))
}

pub async fn create(
    State(state): State<AppState>,
    AppJson(form): AppJson<ProvinceForm>,
) -> Result<(StatusCode, Json<Province>), ApiError> {
    let mut store = state.store();
    let province = provinces::save(
        &mut store,
        Province {
            id: 0,
            name: form.name,
        },
    )?;
    Ok((StatusCode::CREATED, Json(province)))
}

pub async fn update(
    State(state): State<AppState>,
    AppPath(id): AppPath<u64>,
    AppJson(form): AppJson<ProvinceForm>,
) -> Result<Json<Province>, ApiError> {
    let mut store = state.store();
    let mut province = provinces::find_or_fail(&store, id)?;
    form.copy_onto(&mut province);
    Ok(Json(provinces::save(&mut store, province)?))
}

pub async fn remove(
    State(state): State<AppState>,
    AppPath(id): AppPath<u64>,
) -> Result<StatusCode, ApiError> {
    let mut store = state.store();
    provinces::remove(&mut store, id)?;
    Ok(StatusCode::NO_CONTENT)
}
