use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;
use validator::Validate;

use super::{validated_body, views::CityView};
use crate::{
    domain::City,
    errors::ApiError,
    extract::{AppJson, AppPath},
    service::cities,
    state::AppState,
};

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct CityForm {
    #[validate(length(min = 1, message = "must not be blank"))]
    pub name: String,
    pub province_id: u64,
}

validated_body!(CityForm);

impl CityForm {
    /// Copy every field except the id onto `target`.
    fn copy_onto(self, target: &mut City) {
        target.name = self.name;
        target.province_id = self.province_id;
    }
}

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<CityView>>, ApiError> {
    let store = state.store();
    let views = cities::list(&store)?
        .into_iter()
        .map(|c| CityView::build(&store, c))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Json(views))
}

pub async fn find(
    State(state): State<AppState>,
    AppPath(id): AppPath<u64>,
) -> Result<Json<CityView>, ApiError> {
    let store = state.store();
    let city = cities::find_or_fail(&store, id)?;
    Ok(Json(CityView::build(&store, city)?))
}

pub async fn create(
    State(state): State<AppState>,
    AppJson(form): AppJson<CityForm>,
) -> Result<(StatusCode, Json<CityView>), ApiError> {
    let mut store = state.store();
    let mut city = City {
        id: 0,
        name: String::new(),
        province_id: 0,
    };
    form.copy_onto(&mut city);
    let city = cities::save(&mut store, city)?;
    Ok((StatusCode::CREATED, Json(CityView::build(&store, city)?)))
}

pub async fn update(
    State(state): State<AppState>,
    AppPath(id): AppPath<u64>,
    AppJson(form): AppJson<CityForm>,
) -> Result<Json<CityView>, ApiError> {
    let mut store = state.store();
    let mut city = cities::find_or_fail(&store, id)?;
    form.copy_onto(&mut city);
    let city = cities::save(&mut store, city)?;
    Ok(Json(CityView::build(&store, city)?))
}

pub async fn remove(
    State(state): State<AppState>,
    AppPath(id): AppPath<u64>,
) -> Result<StatusCode, ApiError> {
    let mut store = state.store();
    cities::remove(&mut store, id)?;
    Ok(StatusCode::NO_CONTENT)
}
