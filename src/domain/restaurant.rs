use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{Address, Kitchen};
use crate::store::{Entity, Reference};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Restaurant {
    pub id: u64,
    pub name: String,
    pub freight_fee: Decimal,
    pub kitchen_id: u64,
    pub active: bool,
    pub open: bool,
    pub address: Option<Address>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for Restaurant {
    const TABLE: &'static str = "restaurant";
    const LABEL: &'static str = "Restaurant";

    fn id(&self) -> u64 {
        self.id
    }
    fn set_id(&mut self, id: u64) {
        self.id = id;
    }
    fn references(&self) -> Vec<Reference> {
        let mut refs = vec![Reference::to::<Kitchen>(self.kitchen_id)];
        if let Some(address) = &self.address {
            refs.extend(address.references());
        }
        refs
    }
}

/// Something a restaurant sells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: u64,
    pub restaurant_id: u64,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub active: bool,
}

impl Entity for Product {
    const TABLE: &'static str = "product";
    const LABEL: &'static str = "Product";

    fn id(&self) -> u64 {
        self.id
    }
    fn set_id(&mut self, id: u64) {
        self.id = id;
    }
    fn references(&self) -> Vec<Reference> {
        vec![Reference::to::<Restaurant>(self.restaurant_id)]
    }
}
