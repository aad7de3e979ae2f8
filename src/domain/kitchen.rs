use serde::{Deserialize, Serialize};

use super::plain_entity;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Kitchen {
    pub id: u64,
    pub name: String,
}

plain_entity!(Kitchen, "kitchen", "Kitchen");
