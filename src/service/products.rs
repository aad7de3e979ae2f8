use super::restaurants;
use crate::{domain::Product, errors::ApiError, store::Store};

pub fn list(store: &Store, restaurant_id: u64) -> Result<Vec<Product>, ApiError> {
    restaurants::find_or_fail(store, restaurant_id)?;
    Ok(store.scan(|p: &Product| p.restaurant_id == restaurant_id)?)
}

pub fn find_or_fail(store: &Store, restaurant_id: u64, id: u64) -> Result<Product, ApiError> {
    match store.find::<Product>(id)? {
        Some(p) if p.restaurant_id == restaurant_id => Ok(p),
        _ => Err(ApiError::NotFound(format!(
            "There is no Product with id {id} for Restaurant {restaurant_id}"
        ))),
    }
}

pub fn save(store: &mut Store, product: Product) -> Result<Product, ApiError> {
    restaurants::find_or_fail(store, product.restaurant_id)?;
    Ok(store.save(product)?)
}
