use crate::{domain::User, errors::ApiError, store::Store};

pub fn list(store: &Store) -> Result<Vec<User>, ApiError> {
    Ok(store.find_all()?)
}

pub fn find_or_fail(store: &Store, id: u64) -> Result<User, ApiError> {
    super::find_or_fail(store, id)
}

/// Insert or update a user. E-mail addresses are unique; the check runs under
/// the same store guard as the write.
pub fn save(store: &mut Store, user: User) -> Result<User, ApiError> {
    let email = user.email.to_lowercase();
    let taken = store.find_first(|u: &User| u.id != user.id && u.email.to_lowercase() == email)?;
    if taken.is_some() {
        return Err(ApiError::BusinessRule(format!(
            "A user with e-mail {} already exists",
            user.email
        )));
    }
    Ok(store.save(user)?)
}

pub fn change_password(
    store: &mut Store,
    id: u64,
    current: &str,
    new: &str,
) -> Result<(), ApiError> {
    let mut user = find_or_fail(store, id)?;
    if !user.password_matches(current) {
        return Err(ApiError::BusinessRule(
            "The current password does not match the user's password".to_string(),
        ));
    }
    user.password = new.to_string();
    store.save(user)?;
    Ok(())
}

pub fn remove(store: &mut Store, id: u64) -> Result<(), ApiError> {
    super::remove::<User>(store, id)
}
