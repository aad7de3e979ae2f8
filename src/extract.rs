//! Request extractors that fail with [`ApiError`] instead of axum's plain-text
//! rejections.

use axum::{
    extract::{
        FromRequest, FromRequestParts, Path, Query, Request,
        rejection::{PathRejection, QueryRejection},
    },
    body::Bytes,
    http::request::Parts,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use validator::{ValidationErrors, ValidationErrorsKind};

use crate::errors::{ApiError, FieldViolation, MalformedBody};

/// A JSON request body shape.
pub trait RequestBody: DeserializeOwned {
    /// Fields the client may see in responses but must not send back.
    const IGNORED_FIELDS: &'static [&'static str] = &["id"];

    /// Field-level validation, run after a successful parse.
    fn check(&self) -> Result<(), Vec<FieldViolation>> {
        Ok(())
    }
}

/// Flatten nested `validator` errors into dotted field paths, sorted by name.
pub fn violations(errors: &ValidationErrors) -> Vec<FieldViolation> {
    let mut out = Vec::new();
    collect_violations("", errors, &mut out);
    out.sort_by(|a, b| a.name.cmp(&b.name));
    out
}

fn collect_violations(prefix: &str, errors: &ValidationErrors, out: &mut Vec<FieldViolation>) {
    for (field, kind) in errors.errors() {
        let name = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{prefix}.{field}")
        };
        match kind {
            ValidationErrorsKind::Field(errs) => {
                for e in errs {
                    let user_message = e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("is invalid ({})", e.code));
                    out.push(FieldViolation {
                        name: name.clone(),
                        user_message,
                    });
                }
            }
            ValidationErrorsKind::Struct(inner) => collect_violations(&name, inner, out),
            ValidationErrorsKind::List(items) => {
                for (idx, inner) in items {
                    collect_violations(&format!("{name}[{idx}]"), inner, out);
                }
            }
        }
    }
}

/// Strip serde_json's trailing " at line X column Y".
fn without_position(msg: &str) -> &str {
    msg.rsplit_once(" at line ").map_or(msg, |(head, _)| head)
}

/// Name inside the first pair of backticks, e.g. "unknown field `foo`, ..."
fn backticked(msg: &str) -> Option<&str> {
    let start = msg.find('`')? + 1;
    let len = msg[start..].find('`')?;
    Some(&msg[start..start + len])
}

fn join_path(path: &str, leaf: &str) -> String {
    if path.is_empty() || path == "." || path == "?" {
        leaf.to_string()
    } else if path == leaf || path.ends_with(&format!(".{leaf}")) {
        path.to_string()
    } else {
        format!("{path}.{leaf}")
    }
}

/// Classify a typed-deserialization failure.
fn classify(err: serde_path_to_error::Error<serde_json::Error>) -> ApiError {
    let path = err.path().to_string();
    let msg = err.inner().to_string();
    let msg = without_position(&msg);

    if let Some(rest) = msg.strip_prefix("unknown field ") {
        let field = backticked(rest).unwrap_or(rest);
        return MalformedBody::UnknownField {
            path: join_path(&path, field),
        }
        .into();
    }
    for prefix in ["invalid type: ", "invalid value: "] {
        if let Some(rest) = msg.strip_prefix(prefix) {
            let (value, expected) = rest.split_once(", expected ").unwrap_or((rest, "?"));
            return MalformedBody::InvalidType {
                path,
                value: value.to_string(),
                expected: expected.to_string(),
            }
            .into();
        }
    }
    if let Some(rest) = msg.strip_prefix("missing field ") {
        let field = backticked(rest).unwrap_or(rest);
        return ApiError::InvalidData(vec![FieldViolation {
            name: join_path(&path, field),
            user_message: "must be provided".to_string(),
        }]);
    }
    MalformedBody::Syntax(msg.to_string()).into()
}

/// Parse `bytes` into `T`, rejecting read-only and unknown properties.
pub fn parse_body<T: RequestBody>(bytes: &[u8]) -> Result<T, ApiError> {
    let value: Value = serde_json::from_slice(bytes)
        .map_err(|e| MalformedBody::Syntax(without_position(&e.to_string()).to_string()))?;

    if let Value::Object(map) = &value {
        if let Some(field) = T::IGNORED_FIELDS.iter().find(|f| map.contains_key(**f)) {
            return Err(MalformedBody::IgnoredField {
                path: field.to_string(),
            }
            .into());
        }
    }

    let parsed: T = serde_path_to_error::deserialize(value).map_err(classify)?;
    parsed.check().map_err(ApiError::InvalidData)?;
    Ok(parsed)
}

/// JSON body extractor.
pub struct AppJson<T>(pub T);

impl<S, T> FromRequest<S> for AppJson<T>
where
    T: RequestBody,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| MalformedBody::Syntax(e.body_text()))?;
        parse_body(&bytes).map(AppJson)
    }
}

/// Path parameter extractor.
pub struct AppPath<T>(pub T);

impl<S, T> FromRequestParts<S> for AppPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Path::<T>::from_request_parts(parts, state).await {
            Ok(Path(value)) => Ok(AppPath(value)),
            Err(rejection) => Err(path_error(rejection)),
        }
    }
}

fn path_error(rejection: PathRejection) -> ApiError {
    use axum::extract::path::ErrorKind;

    match rejection {
        PathRejection::FailedToDeserializePathParams(e) => match e.into_kind() {
            ErrorKind::ParseErrorAtKey {
                key,
                value,
                expected_type,
            } => ApiError::InvalidParameter {
                name: key,
                value,
                expected: expected_type.to_string(),
            },
            ErrorKind::ParseErrorAtIndex {
                index,
                value,
                expected_type,
            } => ApiError::InvalidParameter {
                name: index.to_string(),
                value,
                expected: expected_type.to_string(),
            },
            ErrorKind::ParseError {
                value,
                expected_type,
            } => ApiError::InvalidParameter {
                name: "path".to_string(),
                value,
                expected: expected_type.to_string(),
            },
            other => ApiError::Internal(other.to_string()),
        },
        PathRejection::MissingPathParams(e) => ApiError::Internal(e.to_string()),
        other => ApiError::Internal(other.body_text()),
    }
}

/// Query string extractor.
pub struct AppQuery<T>(pub T);

impl<S, T> FromRequestParts<S> for AppQuery<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match Query::<T>::try_from_uri(&parts.uri) {
            Ok(Query(value)) => Ok(AppQuery(value)),
            Err(rejection) => {
                let pairs = Query::<Vec<(String, String)>>::try_from_uri(&parts.uri)
                    .map(|Query(pairs)| pairs)
                    .unwrap_or_default();
                Err(query_error(&rejection, &pairs))
            }
        }
    }
}

/// Name the offending parameter by matching the value serde quoted back
/// against the raw pairs.
fn query_error(rejection: &QueryRejection, pairs: &[(String, String)]) -> ApiError {
    let text = rejection.body_text();
    let msg = text.split_once(": ").map_or(text.as_str(), |(_, rest)| rest);
    let quoted = backticked(msg);
    let expected = msg
        .split_once("expected ")
        .map_or("a supported value", |(_, rest)| rest);

    let hit = quoted.and_then(|v| pairs.iter().find(|(_, value)| value == v));
    match hit {
        Some((name, value)) => ApiError::InvalidParameter {
            name: name.clone(),
            value: value.clone(),
            expected: expected.to_string(),
        },
        None => ApiError::InvalidParameter {
            name: "query".to_string(),
            value: quoted.unwrap_or(msg).to_string(),
            expected: expected.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use validator::Validate;

    #[derive(Debug, Deserialize, Validate)]
    #[serde(deny_unknown_fields)]
    struct Inner {
        city_id: u64,
    }

    #[derive(Debug, Deserialize, Validate)]
    #[serde(deny_unknown_fields)]
    struct Form {
        #[validate(length(min = 1, message = "must not be blank"))]
        name: String,
        #[validate(nested)]
        address: Option<Inner>,
    }

    impl RequestBody for Form {
        fn check(&self) -> Result<(), Vec<FieldViolation>> {
            self.validate().map_err(|e| violations(&e))
        }
    }

    fn malformed(res: Result<Form, ApiError>) -> MalformedBody {
        match res {
            Err(ApiError::Malformed(m)) => m,
            other => panic!("expected malformed body, got {other:?}"),
        }
    }

    #[test]
    fn parses_a_valid_body() {
        let form: Form = parse_body(br#"{"name":"Uberlandia","address":{"city_id":3}}"#).unwrap();
        assert_eq!(form.name, "Uberlandia");
        assert_eq!(form.address.unwrap().city_id, 3);
    }

    #[test]
    fn unknown_top_level_field_is_named() {
        let m = malformed(parse_body(br#"{"name":"x","colour":"red"}"#));
        assert_eq!(
            m,
            MalformedBody::UnknownField {
                path: "colour".into()
            }
        );
    }

    #[test]
    fn unknown_nested_field_keeps_its_path() {
        let m = malformed(parse_body(br#"{"name":"x","address":{"city_id":1,"zip":"1"}}"#));
        match m {
            MalformedBody::UnknownField { path } => assert_eq!(path, "address.zip"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn read_only_field_is_ignored_field() {
        let m = malformed(parse_body(br#"{"id":5,"name":"x"}"#));
        assert_eq!(m, MalformedBody::IgnoredField { path: "id".into() });
    }

    #[test]
    fn wrong_type_names_path_value_and_expectation() {
        let m = malformed(parse_body(br#"{"name":"x","address":{"city_id":"abc"}}"#));
        match m {
            MalformedBody::InvalidType {
                path,
                value,
                expected,
            } => {
                assert_eq!(path, "address.city_id");
                assert!(value.contains("abc"));
                assert!(expected.contains("u64"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn broken_json_is_a_syntax_error() {
        let m = malformed(parse_body(br#"{"name": "#));
        assert!(matches!(m, MalformedBody::Syntax(_)));
    }

    #[test]
    fn validation_failures_list_fields() {
        match parse_body::<Form>(br#"{"name":""}"#) {
            Err(ApiError::InvalidData(fields)) => {
                assert_eq!(fields.len(), 1);
                assert_eq!(fields[0].name, "name");
                assert_eq!(fields[0].user_message, "must not be blank");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn missing_field_is_invalid_data() {
        match parse_body::<Form>(br#"{}"#) {
            Err(ApiError::InvalidData(fields)) => assert_eq!(fields[0].name, "name"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "kebab-case")]
    enum Shape {
        Short,
        Long,
    }

    #[derive(Debug, Deserialize)]
    struct Params {
        #[allow(dead_code)]
        shape: Shape,
    }

    #[test]
    fn bad_query_value_names_the_parameter() {
        let uri: axum::http::Uri = "/x?page=2&shape=wide".parse().unwrap();
        let rejection = Query::<Params>::try_from_uri(&uri).err().unwrap();
        let Query(pairs) = Query::<Vec<(String, String)>>::try_from_uri(&uri).unwrap();
        match query_error(&rejection, &pairs) {
            ApiError::InvalidParameter {
                name,
                value,
                expected,
            } => {
                assert_eq!(name, "shape");
                assert_eq!(value, "wide");
                assert!(expected.contains("short"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn helpers_trim_serde_noise() {
        assert_eq!(without_position("oops at line 1 column 4"), "oops");
        assert_eq!(backticked("unknown field `zip`, expected one of"), Some("zip"));
        assert_eq!(join_path(".", "zip"), "zip");
        assert_eq!(join_path("address", "zip"), "address.zip");
        assert_eq!(join_path("address.zip", "zip"), "address.zip");
    }
}
