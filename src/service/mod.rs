//! Application services. Every function takes the store guard, so one call is
//! one transaction: reads, guards and writes cannot interleave with another
//! request's.

pub mod cities;
pub mod kitchens;
pub mod order_flow;
pub mod orders;
pub mod products;
pub mod provinces;
pub mod restaurants;
pub mod users;

use crate::{
    errors::ApiError,
    store::{Entity, Store, StoreError},
};

/// Load a row or fail with a not-found naming the entity.
pub fn find_or_fail<E: Entity>(store: &Store, id: u64) -> Result<E, ApiError> {
    store
        .find::<E>(id)?
        .ok_or_else(|| ApiError::NotFound(format!("There is no {} with id {}", E::LABEL, id)))
}

/// Delete a row, reporting a missing row and a referenced row distinctly.
pub fn remove<E: Entity>(store: &mut Store, id: u64) -> Result<(), ApiError> {
    store.delete::<E>(id).map_err(|e| match e {
        StoreError::NotFound { .. } => {
            ApiError::NotFound(format!("There is no {} with id {}", E::LABEL, id))
        }
        StoreError::InUse { .. } => ApiError::InUse(format!(
            "{} {} cannot be removed because it is in use",
            E::LABEL,
            id
        )),
        other => other.into(),
    })
}
