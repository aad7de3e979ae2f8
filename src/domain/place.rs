use serde::{Deserialize, Serialize};

use super::plain_entity;
use crate::store::{Entity, Reference};

/// A federative unit ("estado").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Province {
    pub id: u64,
    pub name: String,
}

plain_entity!(Province, "province", "Province");

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct City {
    pub id: u64,
    pub name: String,
    pub province_id: u64,
}

impl Entity for City {
    const TABLE: &'static str = "city";
    const LABEL: &'static str = "City";

    fn id(&self) -> u64 {
        self.id
    }
    fn set_id(&mut self, id: u64) {
        self.id = id;
    }
    fn references(&self) -> Vec<Reference> {
        vec![Reference::to::<Province>(self.province_id)]
    }
}

/// Street address embedded in restaurants and orders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub zip_code: String,
    pub street: String,
    pub number: String,
    pub complement: Option<String>,
    pub district: Option<String>,
    pub city_id: u64,
}

impl Address {
    pub fn references(&self) -> Vec<Reference> {
        vec![Reference::to::<City>(self.city_id)]
    }
}
