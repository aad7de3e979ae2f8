use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use super::{Address, Product, Restaurant, User};
use crate::store::{Entity, Reference};

/// Where an order stands in its lifecycle.
///
/// ```text
/// CREATED ──confirm──> CONFIRMED ──deliver──> DELIVERED
///    │
///    └──cancel──> CANCELLED
/// ```
///
/// `DELIVERED` and `CANCELLED` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Created,
    Confirmed,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// States the order may move to from `self`.
    pub fn successors(self) -> &'static [OrderStatus] {
        match self {
            OrderStatus::Created => &[OrderStatus::Confirmed, OrderStatus::Cancelled],
            OrderStatus::Confirmed => &[OrderStatus::Delivered],
            OrderStatus::Delivered | OrderStatus::Cancelled => &[],
        }
    }

    pub fn can_move_to(self, next: OrderStatus) -> bool {
        self.successors().contains(&next)
    }

    pub fn is_terminal(self) -> bool {
        self.successors().is_empty()
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OrderStatus::Created => "CREATED",
            OrderStatus::Confirmed => "CONFIRMED",
            OrderStatus::Delivered => "DELIVERED",
            OrderStatus::Cancelled => "CANCELLED",
        };
        f.write_str(s)
    }
}

/// A transition the current status does not allow.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("order {code} status cannot be changed from {from} to {to}")]
pub struct TransitionError {
    pub code: String,
    pub from: OrderStatus,
    pub to: OrderStatus,
}

/// An amount too large to be represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("order amount exceeds the largest representable value")]
pub struct AmountOverflow;

/// One product line of an order.
///
/// `quantity` and `unit_price` may be absent while the line is being built;
/// absent values count as zero when the total is computed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    pub product_id: u64,
    pub quantity: Option<u32>,
    pub unit_price: Option<Decimal>,
    pub line_total: Decimal,
    pub note: Option<String>,
}

impl OrderLine {
    pub fn new(
        product_id: u64,
        quantity: Option<u32>,
        unit_price: Option<Decimal>,
    ) -> Result<Self, AmountOverflow> {
        let mut line = OrderLine {
            product_id,
            quantity,
            unit_price,
            line_total: Decimal::ZERO,
            note: None,
        };
        line.recalculate()?;
        Ok(line)
    }

    pub fn recalculate(&mut self) -> Result<(), AmountOverflow> {
        let price = self.unit_price.unwrap_or(Decimal::ZERO);
        let qty = Decimal::from(self.quantity.unwrap_or(0));
        self.line_total = price.checked_mul(qty).ok_or(AmountOverflow)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: u64,
    /// Public identifier used in lifecycle URLs.
    pub code: String,
    pub status: OrderStatus,
    pub client_id: u64,
    pub restaurant_id: u64,
    pub delivery_address: Address,
    pub lines: Vec<OrderLine>,
    pub subtotal: Decimal,
    pub freight_fee: Decimal,
    pub total: Decimal,
    pub created_at: DateTime<Utc>,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
}

impl Order {
    /// Recompute every line total, the subtotal and the grand total.
    /// On overflow the subtotal and total are left as they were.
    pub fn recalculate_total(&mut self) -> Result<(), AmountOverflow> {
        let mut subtotal = Decimal::ZERO;
        for line in self.lines.iter_mut() {
            line.recalculate()?;
            subtotal = subtotal
                .checked_add(line.line_total)
                .ok_or(AmountOverflow)?;
        }
        self.total = subtotal
            .checked_add(self.freight_fee)
            .ok_or(AmountOverflow)?;
        self.subtotal = subtotal;
        Ok(())
    }

    pub fn confirm(&mut self, now: DateTime<Utc>) -> Result<(), TransitionError> {
        self.move_to(OrderStatus::Confirmed)?;
        self.confirmed_at = Some(now);
        Ok(())
    }

    pub fn cancel(&mut self, now: DateTime<Utc>) -> Result<(), TransitionError> {
        self.move_to(OrderStatus::Cancelled)?;
        self.cancelled_at = Some(now);
        Ok(())
    }

    pub fn deliver(&mut self, now: DateTime<Utc>) -> Result<(), TransitionError> {
        self.move_to(OrderStatus::Delivered)?;
        self.delivered_at = Some(now);
        Ok(())
    }

    fn move_to(&mut self, next: OrderStatus) -> Result<(), TransitionError> {
        if !self.status.can_move_to(next) {
            return Err(TransitionError {
                code: self.code.clone(),
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        Ok(())
    }
}

impl Entity for Order {
    const TABLE: &'static str = "order";
    const LABEL: &'static str = "Order";

    fn id(&self) -> u64 {
        self.id
    }
    fn set_id(&mut self, id: u64) {
        self.id = id;
    }
    fn references(&self) -> Vec<Reference> {
        let mut refs = vec![
            Reference::to::<User>(self.client_id),
            Reference::to::<Restaurant>(self.restaurant_id),
        ];
        refs.extend(self.delivery_address.references());
        refs.extend(
            self.lines
                .iter()
                .map(|l| Reference::to::<Product>(l.product_id)),
        );
        refs
    }
}
