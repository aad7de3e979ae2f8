use thiserror::Error;

use crate::{
    domain::order::{AmountOverflow, TransitionError},
    store::StoreError,
};

/// One rejected field of a request body.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldViolation {
    pub name: String,
    pub user_message: String,
}

/// Why a request body could not be turned into the expected shape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedBody {
    #[error("property '{path}' does not exist")]
    UnknownField { path: String },
    #[error("property '{path}' is read-only")]
    IgnoredField { path: String },
    #[error("property '{path}' got '{value}', expected {expected}")]
    InvalidType {
        path: String,
        value: String,
        expected: String,
    },
    #[error("unreadable body: {0}")]
    Syntax(String),
}

/// Every failure a request can end in. Rendered by [`crate::problem::translate`].
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    BusinessRule(String),
    #[error("{0}")]
    InUse(String),
    #[error(transparent)]
    StateTransition(#[from] TransitionError),
    #[error("malformed request body: {0}")]
    Malformed(#[from] MalformedBody),
    #[error("{} invalid field(s)", .0.len())]
    InvalidData(Vec<FieldViolation>),
    #[error("parameter '{name}' got '{value}', expected {expected}")]
    InvalidParameter {
        name: String,
        value: String,
        expected: String,
    },
    #[error("no resource at {0}")]
    ResourceNotFound(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// A referenced id that came from the request body is the caller's
    /// mistake, not a missing resource at the URL.
    pub fn into_business_rule(self) -> Self {
        match self {
            ApiError::NotFound(msg) => ApiError::BusinessRule(msg),
            other => other,
        }
    }
}

impl From<AmountOverflow> for ApiError {
    fn from(err: AmountOverflow) -> Self {
        ApiError::BusinessRule(format!("{err}. Reduce the quantities and try again"))
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { table, id } => {
                ApiError::NotFound(format!("no {table} with id {id}"))
            }
            StoreError::InUse { table, id } => {
                ApiError::InUse(format!("{table} {id} is still in use"))
            }
            other => ApiError::Internal(other.to_string()),
        }
    }
}
