use chrono::Utc;

use super::{cities, kitchens};
use crate::{domain::Restaurant, errors::ApiError, store::Store};

pub fn list(store: &Store) -> Result<Vec<Restaurant>, ApiError> {
    Ok(store.find_all()?)
}

pub fn find_or_fail(store: &Store, id: u64) -> Result<Restaurant, ApiError> {
    super::find_or_fail(store, id)
}

/// Insert or update a restaurant after resolving its kitchen and city, both of
/// which come from the request body.
pub fn save(store: &mut Store, mut restaurant: Restaurant) -> Result<Restaurant, ApiError> {
    kitchens::find_or_fail(store, restaurant.kitchen_id).map_err(ApiError::into_business_rule)?;
    if let Some(address) = &restaurant.address {
        cities::find_or_fail(store, address.city_id).map_err(ApiError::into_business_rule)?;
    }
    restaurant.updated_at = Utc::now();
    Ok(store.save(restaurant)?)
}

fn update_flag<F>(store: &mut Store, id: u64, set: F) -> Result<(), ApiError>
where
    F: FnOnce(&mut Restaurant),
{
    let mut restaurant = find_or_fail(store, id)?;
    set(&mut restaurant);
    restaurant.updated_at = Utc::now();
    store.save(restaurant)?;
    Ok(())
}

pub fn activate(store: &mut Store, id: u64) -> Result<(), ApiError> {
    update_flag(store, id, |r| r.active = true)
}

pub fn inactivate(store: &mut Store, id: u64) -> Result<(), ApiError> {
    update_flag(store, id, |r| r.active = false)
}

pub fn open(store: &mut Store, id: u64) -> Result<(), ApiError> {
    update_flag(store, id, |r| r.open = true)
}

pub fn close(store: &mut Store, id: u64) -> Result<(), ApiError> {
    update_flag(store, id, |r| r.open = false)
}

/// Set `active` on every listed restaurant, all or nothing.
pub fn set_active_many(store: &mut Store, ids: &[u64], active: bool) -> Result<(), ApiError> {
    let now = Utc::now();
    let mut batch = Vec::with_capacity(ids.len());
    for id in ids {
        let mut restaurant = find_or_fail(store, *id)?;
        restaurant.active = active;
        restaurant.updated_at = now;
        batch.push(restaurant);
    }
    store.save_all(batch)?;
    Ok(())
}

pub fn remove(store: &mut Store, id: u64) -> Result<(), ApiError> {
    super::remove::<Restaurant>(store, id)
}
