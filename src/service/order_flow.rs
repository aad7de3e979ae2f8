//! Order status transitions.
//!
//! Lookup, guard and write happen under one store guard, so two concurrent
//! requests against the same order see each other's result: the second
//! `confirm` fails instead of overwriting the first.

use chrono::Utc;

use super::orders;
use crate::{
    domain::Order,
    domain::order::TransitionError,
    errors::ApiError,
    store::Store,
};

fn apply<F>(store: &mut Store, code: &str, transition: F) -> Result<Order, ApiError>
where
    F: FnOnce(&mut Order) -> Result<(), TransitionError>,
{
    let mut order = orders::find_by_code(store, code)?;
    transition(&mut order)?;
    let order = store.save(order)?;
    tracing::info!(code = %order.code, status = %order.status, "order status changed");
    Ok(order)
}

pub fn confirm(store: &mut Store, code: &str) -> Result<Order, ApiError> {
    apply(store, code, |o| o.confirm(Utc::now()))
}

pub fn cancel(store: &mut Store, code: &str) -> Result<Order, ApiError> {
    apply(store, code, |o| o.cancel(Utc::now()))
}

pub fn deliver(store: &mut Store, code: &str) -> Result<Order, ApiError> {
    apply(store, code, |o| o.deliver(Utc::now()))
}
