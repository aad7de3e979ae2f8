use axum::{Json, extract::State, http::StatusCode};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{
    validated_body,
    views::{AddressForm, AddressView, NameRef},
};
use crate::{
    domain::{Order, OrderStatus, Product},
    errors::ApiError,
    extract::{AppJson, AppPath},
    service::{
        order_flow,
        orders::{self, LineRequest, OrderRequest},
        restaurants, users,
    },
    state::AppState,
    store::Store,
};

#[derive(Debug, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct LineForm {
    pub product_id: u64,
    #[validate(range(min = 1, message = "must be at least 1"))]
    pub quantity: u32,
    pub note: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct OrderForm {
    pub client_id: u64,
    pub restaurant_id: u64,
    #[validate(nested)]
    pub delivery_address: AddressForm,
    #[validate(length(min = 1, message = "must contain at least one line"), nested)]
    pub lines: Vec<LineForm>,
}

validated_body!(OrderForm);

impl From<OrderForm> for OrderRequest {
    fn from(f: OrderForm) -> Self {
        OrderRequest {
            client_id: f.client_id,
            restaurant_id: f.restaurant_id,
            delivery_address: f.delivery_address.into(),
            lines: f
                .lines
                .into_iter()
                .map(|l| LineRequest {
                    product_id: l.product_id,
                    quantity: l.quantity,
                    note: l.note,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LineView {
    pub product_id: u64,
    pub product_name: String,
    pub quantity: Option<u32>,
    pub unit_price: Option<Decimal>,
    pub line_total: Decimal,
    pub note: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OrderSummary {
    pub code: String,
    pub status: OrderStatus,
    pub subtotal: Decimal,
    pub freight_fee: Decimal,
    pub total: Decimal,
    pub created_at: DateTime<Utc>,
    pub client: NameRef,
    pub restaurant: NameRef,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OrderView {
    pub code: String,
    pub status: OrderStatus,
    pub subtotal: Decimal,
    pub freight_fee: Decimal,
    pub total: Decimal,
    pub created_at: DateTime<Utc>,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub client: NameRef,
    pub restaurant: NameRef,
    pub delivery_address: AddressView,
    pub lines: Vec<LineView>,
}

fn parties(store: &Store, order: &Order) -> Result<(NameRef, NameRef), ApiError> {
    let client = users::find_or_fail(store, order.client_id)?;
    let restaurant = restaurants::find_or_fail(store, order.restaurant_id)?;
    Ok((
        NameRef {
            id: client.id,
            name: client.name,
        },
        NameRef {
            id: restaurant.id,
            name: restaurant.name,
        },
    ))
}

impl OrderSummary {
    fn build(store: &Store, order: Order) -> Result<Self, ApiError> {
        let (client, restaurant) = parties(store, &order)?;
        Ok(OrderSummary {
            code: order.code,
            status: order.status,
            subtotal: order.subtotal,
            freight_fee: order.freight_fee,
            total: order.total,
            created_at: order.created_at,
            client,
            restaurant,
        })
    }
}

impl OrderView {
    fn build(store: &Store, order: Order) -> Result<Self, ApiError> {
        let (client, restaurant) = parties(store, &order)?;
        let lines = order
            .lines
            .into_iter()
            .map(|l| -> Result<LineView, ApiError> {
                let product_name = store
                    .find::<Product>(l.product_id)?
                    .map(|p| p.name)
                    .unwrap_or_default();
                Ok(LineView {
                    product_id: l.product_id,
                    product_name,
                    quantity: l.quantity,
                    unit_price: l.unit_price,
                    line_total: l.line_total,
                    note: l.note,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(OrderView {
            code: order.code,
            status: order.status,
            subtotal: order.subtotal,
            freight_fee: order.freight_fee,
            total: order.total,
            created_at: order.created_at,
            confirmed_at: order.confirmed_at,
            cancelled_at: order.cancelled_at,
            delivered_at: order.delivered_at,
            client,
            restaurant,
            delivery_address: AddressView::build(store, order.delivery_address)?,
            lines,
        })
    }
}

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<OrderSummary>>, ApiError> {
    let store = state.store();
    let summaries = orders::list(&store)?
        .into_iter()
        .map(|o| OrderSummary::build(&store, o))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Json(summaries))
}

pub async fn find(
    State(state): State<AppState>,
    AppPath(code): AppPath<String>,
) -> Result<Json<OrderView>, ApiError> {
    let store = state.store();
    let order = orders::find_by_code(&store, &code)?;
    Ok(Json(OrderView::build(&store, order)?))
}

pub async fn create(
    State(state): State<AppState>,
    AppJson(form): AppJson<OrderForm>,
) -> Result<(StatusCode, Json<OrderView>), ApiError> {
    let mut store = state.store();
    let order = orders::issue(&mut store, form.into())?;
    Ok((StatusCode::CREATED, Json(OrderView::build(&store, order)?)))
}

pub async fn confirm(
    State(state): State<AppState>,
    AppPath(code): AppPath<String>,
) -> Result<StatusCode, ApiError> {
    let mut store = state.store();
    order_flow::confirm(&mut store, &code)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn cancel(
    State(state): State<AppState>,
    AppPath(code): AppPath<String>,
) -> Result<StatusCode, ApiError> {
    let mut store = state.store();
    order_flow::cancel(&mut store, &code)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn deliver(
    State(state): State<AppState>,
    AppPath(code): AppPath<String>,
) -> Result<StatusCode, ApiError> {
    let mut store = state.store();
    order_flow::deliver(&mut store, &code)?;
    Ok(StatusCode::NO_CONTENT)
}
