use crate::{domain::Province, errors::ApiError, store::Store};

pub fn list(store: &Store) -> Result<Vec<Province>, ApiError> {
    Ok(store.find_all()?)
}

pub fn find_or_fail(store: &Store, id: u64) -> Result<Province, ApiError> {
    super::find_or_fail(store, id)
}

pub fn save(store: &mut Store, province: Province) -> Result<Province, ApiError> {
    Ok(store.save(province)?)
}

pub fn remove(store: &mut Store, id: u64) -> Result<(), ApiError> {
    super::remove::<Province>(store, id)
}
