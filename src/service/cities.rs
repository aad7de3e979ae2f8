use super::provinces;
use crate::{domain::City, errors::ApiError, store::Store};

pub fn list(store: &Store) -> Result<Vec<City>, ApiError> {
    Ok(store.find_all()?)
}

pub fn find_or_fail(store: &Store, id: u64) -> Result<City, ApiError> {
    super::find_or_fail(store, id)
}

/// Insert or update a city. The province id comes from the request body, so
/// an unknown one is a business-rule failure.
pub fn save(store: &mut Store, city: City) -> Result<City, ApiError> {
    provinces::find_or_fail(store, city.province_id).map_err(ApiError::into_business_rule)?;
    Ok(store.save(city)?)
}

pub fn remove(store: &mut Store, id: u64) -> Result<(), ApiError> {
    super::remove::<City>(store, id)
}
