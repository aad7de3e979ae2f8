//! Uniform error payloads.
//!
//! Every failure leaving the service is a [`Problem`] serialized as
//! `application/problem+json`. [`translate`] maps an [`ApiError`] to its status
//! and payload; [`normalize_error_body`] catches error responses produced
//! outside our handlers (framework rejections, unknown methods) and rewrites
//! them into the same shape.

use axum::{
    body::{Body, to_bytes},
    extract::Request,
    http::{
        HeaderValue, StatusCode,
        header::{CONTENT_LENGTH, CONTENT_TYPE},
    },
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{ApiError, FieldViolation, MalformedBody};

pub const APPLICATION_PROBLEM_JSON: &str = "application/problem+json";

const TYPE_BASE_URI: &str = "https://lmgfood.com.br";
const MAX_ERROR_BODY: usize = 64 * 1024;

pub const GENERIC_USER_MESSAGE: &str = "An unexpected internal error occurred. Try again and, \
     if the problem persists, contact the system administrator.";

const INVALID_DATA_MESSAGE: &str =
    "One or more fields are invalid. Fill them in correctly and try again.";

/// Closed catalog of problem types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProblemType {
    InvalidData,
    SystemError,
    InvalidParameter,
    IncomprehensibleMessage,
    ResourceNotFound,
    EntityNotFound,
    EntityInUse,
    BusinessRule,
    InvalidStateTransition,
}

impl ProblemType {
    fn slug(self) -> &'static str {
        match self {
            ProblemType::InvalidData => "invalid-data",
            ProblemType::SystemError => "system-error",
            ProblemType::InvalidParameter => "invalid-parameter",
            ProblemType::IncomprehensibleMessage => "incomprehensible-message",
            ProblemType::ResourceNotFound => "resource-not-found",
            ProblemType::EntityNotFound => "entity-not-found",
            ProblemType::EntityInUse => "entity-in-use",
            ProblemType::BusinessRule => "business-rule",
            ProblemType::InvalidStateTransition => "invalid-state-transition",
        }
    }

    pub fn uri(self) -> String {
        format!("{}/{}", TYPE_BASE_URI, self.slug())
    }

    pub fn title(self) -> &'static str {
        match self {
            ProblemType::InvalidData => "Invalid data",
            ProblemType::SystemError => "System error",
            ProblemType::InvalidParameter => "Invalid parameter",
            ProblemType::IncomprehensibleMessage => "Incomprehensible message",
            ProblemType::ResourceNotFound => "Resource not found",
            ProblemType::EntityNotFound => "Entity not found",
            ProblemType::EntityInUse => "Entity in use",
            ProblemType::BusinessRule => "Business rule violation",
            ProblemType::InvalidStateTransition => "Invalid status transition",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Problem {
    pub status: u16,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldViolation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_message: Option<String>,
}

/// What an error response carried before normalization.
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorBody {
    Empty,
    Text(String),
    Problem(Problem),
}

impl Problem {
    pub fn new(status: StatusCode, kind: ProblemType, detail: impl Into<String>) -> Self {
        Problem {
            status: status.as_u16(),
            kind: Some(kind.uri()),
            title: kind.title().to_string(),
            detail: Some(detail.into()),
            timestamp: Utc::now(),
            fields: Vec::new(),
            user_message: None,
        }
    }

    /// A bare problem titled `title`, used when no catalog entry applies.
    pub fn titled(status: StatusCode, title: impl Into<String>) -> Self {
        Problem {
            status: status.as_u16(),
            kind: None,
            title: title.into(),
            detail: None,
            timestamp: Utc::now(),
            fields: Vec::new(),
            user_message: None,
        }
    }

    pub fn with_user_message(mut self, msg: impl Into<String>) -> Self {
        self.user_message = Some(msg.into());
        self
    }

    pub fn with_fields(mut self, fields: Vec<FieldViolation>) -> Self {
        self.fields = fields;
        self
    }

    /// Whatever the handler produced, the caller receives a problem: an empty
    /// body becomes the status reason phrase, a string becomes the title.
    pub fn normalize(status: StatusCode, body: ErrorBody) -> Self {
        match body {
            ErrorBody::Problem(p) => p,
            ErrorBody::Text(text) => Problem::titled(status, text),
            ErrorBody::Empty => {
                Problem::titled(status, status.canonical_reason().unwrap_or("Error"))
            }
        }
    }

    fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

fn malformed_detail(err: &MalformedBody) -> String {
    match err {
        MalformedBody::UnknownField { path } => format!(
            "Property '{path}' does not exist. Remove it from the request body and try again."
        ),
        MalformedBody::IgnoredField { path } => format!(
            "Property '{path}' cannot be set by the client. Remove it from the request body and try again."
        ),
        MalformedBody::InvalidType {
            path,
            value,
            expected,
        } => format!(
            "Property '{path}' received the value '{value}', which is of an invalid type. \
             Correct it and send a value compatible with type {expected}."
        ),
        MalformedBody::Syntax(_) => {
            "The request body is invalid. Check for syntax errors.".to_string()
        }
    }
}

/// Map a failure to its HTTP status and payload. Total over [`ApiError`].
pub fn translate(err: &ApiError) -> (StatusCode, Problem) {
    let (status, problem) = match err {
        ApiError::NotFound(msg) => (
            StatusCode::NOT_FOUND,
            Problem::new(StatusCode::NOT_FOUND, ProblemType::EntityNotFound, msg),
        ),
        ApiError::BusinessRule(msg) => (
            StatusCode::BAD_REQUEST,
            Problem::new(StatusCode::BAD_REQUEST, ProblemType::BusinessRule, msg),
        ),
        ApiError::InUse(msg) => (
            StatusCode::CONFLICT,
            Problem::new(StatusCode::CONFLICT, ProblemType::EntityInUse, msg),
        ),
        ApiError::StateTransition(e) => (
            StatusCode::CONFLICT,
            Problem::new(
                StatusCode::CONFLICT,
                ProblemType::InvalidStateTransition,
                e.to_string(),
            ),
        ),
        ApiError::Malformed(e) => (
            StatusCode::BAD_REQUEST,
            Problem::new(
                StatusCode::BAD_REQUEST,
                ProblemType::IncomprehensibleMessage,
                malformed_detail(e),
            ),
        ),
        ApiError::InvalidData(fields) => (
            StatusCode::BAD_REQUEST,
            Problem::new(
                StatusCode::BAD_REQUEST,
                ProblemType::InvalidData,
                INVALID_DATA_MESSAGE,
            )
            .with_user_message(INVALID_DATA_MESSAGE)
            .with_fields(fields.clone()),
        ),
        ApiError::InvalidParameter {
            name,
            value,
            expected,
        } => (
            StatusCode::BAD_REQUEST,
            Problem::new(
                StatusCode::BAD_REQUEST,
                ProblemType::InvalidParameter,
                format!(
                    "URL parameter '{name}' received the value '{value}', which is of an invalid type. \
                     Correct it and send a value compatible with type {expected}."
                ),
            ),
        ),
        ApiError::ResourceNotFound(path) => (
            StatusCode::NOT_FOUND,
            Problem::new(
                StatusCode::NOT_FOUND,
                ProblemType::ResourceNotFound,
                format!("Resource '{path}', which you tried to access, does not exist."),
            ),
        ),
        ApiError::Internal(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Problem::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                ProblemType::SystemError,
                GENERIC_USER_MESSAGE,
            )
            .with_user_message(GENERIC_USER_MESSAGE),
        ),
    };
    (status, problem)
}

impl IntoResponse for Problem {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = serde_json::to_vec(&self).unwrap_or_default();
        (
            status,
            [(CONTENT_TYPE, HeaderValue::from_static(APPLICATION_PROBLEM_JSON))],
            body,
        )
            .into_response()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::Internal(cause) => tracing::error!(error = %cause, "unhandled failure"),
            ApiError::BusinessRule(_) | ApiError::InUse(_) | ApiError::StateTransition(_) => {
                tracing::warn!(error = %self, "request refused")
            }
            other => tracing::debug!(error = %other, "request rejected"),
        }
        let (_, problem) = translate(&self);
        problem.into_response()
    }
}

fn is_problem(res: &Response) -> bool {
    res.headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with(APPLICATION_PROBLEM_JSON))
}

/// Middleware rewriting any non-problem error response into a [`Problem`].
pub async fn normalize_error_body(req: Request, next: Next) -> Response {
    let res = next.run(req).await;
    let status = res.status();
    if !(status.is_client_error() || status.is_server_error()) || is_problem(&res) {
        return res;
    }

    let (mut parts, body) = res.into_parts();
    let bytes = to_bytes(body, MAX_ERROR_BODY).await.unwrap_or_default();
    let original = if bytes.is_empty() {
        ErrorBody::Empty
    } else {
        ErrorBody::Text(String::from_utf8_lossy(&bytes).trim().to_string())
    };
    let problem = Problem::normalize(status, original);

    parts.headers.remove(CONTENT_LENGTH);
    parts.headers.insert(
        CONTENT_TYPE,
        HeaderValue::from_static(APPLICATION_PROBLEM_JSON),
    );
    let body = serde_json::to_vec(&problem).unwrap_or_default();
    Response::from_parts(parts, Body::from(body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::{OrderStatus, TransitionError};

    #[test]
    fn taxonomy_maps_to_statuses() {
        let cases = [
            (ApiError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (ApiError::BusinessRule("x".into()), StatusCode::BAD_REQUEST),
            (ApiError::InUse("x".into()), StatusCode::CONFLICT),
            (
                ApiError::StateTransition(TransitionError {
                    code: "c".into(),
                    from: OrderStatus::Delivered,
                    to: OrderStatus::Delivered,
                }),
                StatusCode::CONFLICT,
            ),
            (
                ApiError::Malformed(MalformedBody::Syntax("eof".into())),
                StatusCode::BAD_REQUEST,
            ),
            (ApiError::InvalidData(vec![]), StatusCode::BAD_REQUEST),
            (
                ApiError::ResourceNotFound("/nope".into()),
                StatusCode::NOT_FOUND,
            ),
            (
                ApiError::Internal("disk on fire".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, expected) in cases {
            let (status, problem) = translate(&err);
            assert_eq!(status, expected, "{err:?}");
            assert_eq!(problem.status, expected.as_u16());
            assert!(problem.kind.is_some());
        }
    }

    #[test]
    fn domain_messages_become_detail() {
        let (_, p) = translate(&ApiError::InUse("City 3 is in use".into()));
        assert_eq!(p.kind.as_deref(), Some("https://lmgfood.com.br/entity-in-use"));
        assert_eq!(p.title, "Entity in use");
        assert_eq!(p.detail.as_deref(), Some("City 3 is in use"));
    }

    #[test]
    fn internal_errors_are_not_echoed() {
        let (_, p) = translate(&ApiError::Internal("secret stack detail".into()));
        let json = serde_json::to_string(&p).unwrap();
        assert!(!json.contains("secret"));
        assert_eq!(p.detail.as_deref(), Some(GENERIC_USER_MESSAGE));
        assert_eq!(p.user_message.as_deref(), Some(GENERIC_USER_MESSAGE));
    }

    #[test]
    fn malformed_details_name_the_offender() {
        let (_, p) = translate(&ApiError::Malformed(MalformedBody::UnknownField {
            path: "address.color".into(),
        }));
        assert!(p.detail.unwrap().contains("'address.color'"));

        let (_, p) = translate(&ApiError::Malformed(MalformedBody::InvalidType {
            path: "freight_fee".into(),
            value: "abc".into(),
            expected: "decimal".into(),
        }));
        let detail = p.detail.unwrap();
        assert!(detail.contains("'freight_fee'"));
        assert!(detail.contains("'abc'"));
        assert!(detail.contains("decimal"));
    }

    #[test]
    fn invalid_data_lists_fields() {
        let fields = vec![FieldViolation {
            name: "name".into(),
            user_message: "must not be blank".into(),
        }];
        let (_, p) = translate(&ApiError::InvalidData(fields.clone()));
        assert_eq!(p.fields, fields);
        let v = serde_json::to_value(&p).unwrap();
        assert_eq!(v["fields"][0]["userMessage"], "must not be blank");
    }

    #[test]
    fn normalize_fills_missing_bodies() {
        let p = Problem::normalize(StatusCode::METHOD_NOT_ALLOWED, ErrorBody::Empty);
        assert_eq!(p.title, "Method Not Allowed");
        assert_eq!(p.status, 405);

        let p = Problem::normalize(StatusCode::BAD_REQUEST, ErrorBody::Text("bad".into()));
        assert_eq!(p.title, "bad");
        assert!(p.kind.is_none());

        let built = Problem::titled(StatusCode::CONFLICT, "kept");
        let p = Problem::normalize(StatusCode::CONFLICT, ErrorBody::Problem(built.clone()));
        assert_eq!(p, built);
    }

    #[test]
    fn wire_shape_uses_type_and_camel_case() {
        let p = Problem::new(StatusCode::NOT_FOUND, ProblemType::EntityNotFound, "gone")
            .with_user_message("gone");
        let v = serde_json::to_value(&p).unwrap();
        assert_eq!(v["status"], 404);
        assert_eq!(v["type"], "https://lmgfood.com.br/entity-not-found");
        assert_eq!(v["userMessage"], "gone");
        assert!(v.get("fields").is_none());
        assert!(v["timestamp"].is_string());
    }
}
