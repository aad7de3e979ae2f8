use crate::{domain::Kitchen, errors::ApiError, store::Store};

pub fn list(store: &Store) -> Result<Vec<Kitchen>, ApiError> {
    Ok(store.find_all()?)
}

pub fn find_or_fail(store: &Store, id: u64) -> Result<Kitchen, ApiError> {
    super::find_or_fail(store, id)
}

pub fn save(store: &mut Store, kitchen: Kitchen) -> Result<Kitchen, ApiError> {
    Ok(store.save(kitchen)?)
}

pub fn remove(store: &mut Store, id: u64) -> Result<(), ApiError> {
    super::remove::<Kitchen>(store, id)
}
