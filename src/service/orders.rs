use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use super::{cities, products, restaurants, users};
use crate::{
    domain::{Address, Order, OrderLine, OrderStatus},
    errors::ApiError,
    store::Store,
};

/// A line as submitted by the client; the price is taken from the product.
#[derive(Debug, Clone)]
pub struct LineRequest {
    pub product_id: u64,
    pub quantity: u32,
    pub note: Option<String>,
}

#[derive(Debug, Clone)]
pub struct OrderRequest {
    pub client_id: u64,
    pub restaurant_id: u64,
    pub delivery_address: Address,
    pub lines: Vec<LineRequest>,
}

pub fn list(store: &Store) -> Result<Vec<Order>, ApiError> {
    Ok(store.find_all()?)
}

pub fn find_by_code(store: &Store, code: &str) -> Result<Order, ApiError> {
    store
        .find_first(|o: &Order| o.code == code)?
        .ok_or_else(|| ApiError::NotFound(format!("There is no Order with code {code}")))
}

/// Validate and persist a new order in status `CREATED`.
///
/// Every id in the request refers to something the client picked, so a
/// missing one is reported as a business-rule failure.
pub fn issue(store: &mut Store, request: OrderRequest) -> Result<Order, ApiError> {
    users::find_or_fail(store, request.client_id).map_err(ApiError::into_business_rule)?;
    let restaurant = restaurants::find_or_fail(store, request.restaurant_id)
        .map_err(ApiError::into_business_rule)?;
    if !restaurant.active {
        return Err(ApiError::BusinessRule(format!(
            "Restaurant {} is not active",
            restaurant.id
        )));
    }
    cities::find_or_fail(store, request.delivery_address.city_id)
        .map_err(ApiError::into_business_rule)?;

    let mut lines = Vec::with_capacity(request.lines.len());
    for line in request.lines {
        let product = products::find_or_fail(store, restaurant.id, line.product_id)
            .map_err(ApiError::into_business_rule)?;
        if !product.active {
            return Err(ApiError::BusinessRule(format!(
                "Product {} is not available",
                product.id
            )));
        }
        let mut built = OrderLine::new(product.id, Some(line.quantity), Some(product.price))?;
        built.note = line.note;
        lines.push(built);
    }

    let mut order = Order {
        id: 0,
        code: Uuid::new_v4().to_string(),
        status: OrderStatus::Created,
        client_id: request.client_id,
        restaurant_id: restaurant.id,
        delivery_address: request.delivery_address,
        lines,
        subtotal: Decimal::ZERO,
        freight_fee: restaurant.freight_fee,
        total: Decimal::ZERO,
        created_at: Utc::now(),
        confirmed_at: None,
        cancelled_at: None,
        delivered_at: None,
    };
    order.recalculate_total()?;
    let order = store.save(order)?;
    tracing::info!(code = %order.code, total = %order.total, "order issued");
    Ok(order)
}
