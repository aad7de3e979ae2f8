use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::plain_entity;

/// A back-office user. Also the client of an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub password: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn password_matches(&self, candidate: &str) -> bool {
        self.password == candidate
    }
}

plain_entity!(User, "user", "User");
