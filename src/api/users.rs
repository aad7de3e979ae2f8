use axum::{Json, extract::State, http::StatusCode};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::validated_body;
use crate::{
    domain::User,
    errors::ApiError,
    extract::{AppJson, AppPath},
    service::users,
    state::AppState,
};

/// A user as returned to clients. The password never leaves the service.
#[derive(Debug, Serialize, Deserialize)]
pub struct UserView {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserView {
    fn from(u: User) -> Self {
        UserView {
            id: u.id,
            name: u.name,
            email: u.email,
            created_at: u.created_at,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct UserForm {
    #[validate(length(min = 1, message = "must not be blank"))]
    pub name: String,
    #[validate(email(message = "must be a well-formed e-mail address"))]
    pub email: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct NewUserForm {
    #[validate(length(min = 1, message = "must not be blank"))]
    pub name: String,
    #[validate(email(message = "must be a well-formed e-mail address"))]
    pub email: String,
    #[validate(length(min = 1, message = "must not be blank"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct PasswordForm {
    #[validate(length(min = 1, message = "must not be blank"))]
    pub current_password: String,
    #[validate(length(min = 1, message = "must not be blank"))]
    pub new_password: String,
}

validated_body!(UserForm, NewUserForm, PasswordForm);

impl UserForm {
    fn copy_onto(self, target: &mut User) {
        target.name = self.name;
        target.email = self.email;
    }
}

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<UserView>>, ApiError> {
    let store = state.store();
    let all = users::list(&store)?;
    Ok(Json(all.into_iter().map(UserView::from).collect()))
}

pub async fn find(
    State(state): State<AppState>,
    AppPath(id): AppPath<u64>,
) -> Result<Json<UserView>, ApiError> {
    let store = state.store();
    Ok(Json(users::find_or_fail(&store, id)?.into()))
}

pub async fn create(
    State(state): State<AppState>,
    AppJson(form): AppJson<NewUserForm>,
) -> Result<(StatusCode, Json<UserView>), ApiError> {
    let mut store = state.store();
    let user = users::save(
        &mut store,
        User {
            id: 0,
            name: form.name,
            email: form.email,
            password: form.password,
            created_at: Utc::now(),
        },
    )?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

pub async fn update(
    State(state): State<AppState>,
    AppPath(id): AppPath<u64>,
    AppJson(form): AppJson<UserForm>,
) -> Result<Json<UserView>, ApiError> {
    let mut store = state.store();
    let mut user = users::find_or_fail(&store, id)?;
    form.copy_onto(&mut user);
    Ok(Json(users::save(&mut store, user)?.into()))
}

pub async fn change_password(
    State(state): State<AppState>,
    AppPath(id): AppPath<u64>,
    AppJson(form): AppJson<PasswordForm>,
) -> Result<StatusCode, ApiError> {
    let mut store = state.store();
    users::change_password(&mut store, id, &form.current_password, &form.new_password)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn remove(
    State(state): State<AppState>,
    AppPath(id): AppPath<u64>,
) -> Result<StatusCode, ApiError> {
    let mut store = state.store();
    users::remove(&mut store, id)?;
    Ok(StatusCode::NO_CONTENT)
}
