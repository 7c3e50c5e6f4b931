//! Typed errors and HTTP mapping.

use crate::response::failure_alert_headers;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("duplicate path segment: {0}")]
    DuplicatePathSegment(String),
    #[error("duplicate table: {0}")]
    DuplicateTable(String),
    #[error("entity {entity}: duplicate column '{column}'")]
    DuplicateColumn { entity: String, column: String },
    #[error("entity {entity}: identity column '{column}' must not be declared as a field")]
    IdentityAsField { entity: String, column: String },
    #[error("entity {0} declares no fields")]
    NoFields(String),
    #[error("invalid value for {key}: '{value}'")]
    Invalid { key: &'static str, value: String },
}

/// Row decoding failures. Raised by the mapper when a selected row does not
/// match the entity descriptor.
#[derive(Error, Debug)]
pub enum MappingError {
    #[error("column '{0}' is missing from the row")]
    MissingColumn(String),
    #[error("column '{column}' cannot be read as {expected}")]
    IncompatibleType { column: String, expected: &'static str },
}

#[derive(Error, Debug)]
pub enum StorageError {
    /// The row targeted by an update disappeared before the write landed.
    #[error("table {table}: row with id {id} does not exist")]
    StaleRow { table: &'static str, id: i64 },
    #[error("table {table}: column '{column}' must not be null")]
    NullConstraint { table: &'static str, column: &'static str },
    #[error("store lock poisoned")]
    Poisoned,
}

/// Reason codes of the identity checks performed by the entity handlers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AlertKey {
    IdExists,
    IdNull,
    IdInvalid,
    IdNotFound,
}

impl AlertKey {
    pub fn as_str(self) -> &'static str {
        match self {
            AlertKey::IdExists => "idexists",
            AlertKey::IdNull => "idnull",
            AlertKey::IdInvalid => "idinvalid",
            AlertKey::IdNotFound => "idnotfound",
        }
    }

    pub fn message(self, entity: &str) -> String {
        match self {
            AlertKey::IdExists => format!("A new {} cannot already have an ID", entity),
            AlertKey::IdNull => "Invalid id".to_string(),
            AlertKey::IdInvalid => "Invalid ID".to_string(),
            AlertKey::IdNotFound => "Entity not found".to_string(),
        }
    }
}

impl fmt::Display for AlertKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A client error tied to one entity, reported with a machine-readable key.
#[derive(Clone, Debug)]
pub struct Alert {
    pub app_name: String,
    pub entity_name: &'static str,
    pub key: AlertKey,
    pub message: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    pub field: String,
    pub message: String,
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("validation failed: {}", violation_summary(.0))]
    Validation(Vec<FieldViolation>),
    #[error("{}", .0.message)]
    BadRequestAlert(Alert),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("database: {0}")]
    Db(#[from] sqlx::Error),
    #[error("mapping: {0}")]
    Mapping(#[from] MappingError),
    #[error("storage: {0}")]
    Storage(#[from] StorageError),
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

fn body(code: &str, message: String, details: Option<serde_json::Value>) -> Json<ErrorBody> {
    Json(ErrorBody {
        error: ErrorDetail {
            code: code.to_string(),
            message,
            details,
        },
    })
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Validation(violations) => {
                let message = violation_summary(&violations);
                let details = serde_json::json!({ "fieldErrors": violations });
                (StatusCode::BAD_REQUEST, body("validation_error", message, Some(details))).into_response()
            }
            AppError::BadRequestAlert(alert) => {
                let headers = failure_alert_headers(&alert.app_name, alert.entity_name, alert.key);
                let details = serde_json::json!({
                    "entityName": alert.entity_name,
                    "errorKey": alert.key.as_str(),
                });
                (
                    StatusCode::BAD_REQUEST,
                    headers,
                    body(alert.key.as_str(), alert.message, Some(details)),
                )
                    .into_response()
            }
            AppError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, body("bad_request", message, None)).into_response()
            }
            AppError::NotFound(what) => {
                (StatusCode::NOT_FOUND, body("not_found", format!("not found: {}", what), None)).into_response()
            }
            internal @ (AppError::Config(_) | AppError::Db(_) | AppError::Mapping(_) | AppError::Storage(_)) => {
                tracing::error!(error = %internal, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    body("internal_error", "internal server error".into(), None),
                )
                    .into_response()
            }
        }
    }
}

fn violation_summary(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(|v| format!("{}: {}", v.field, v.message))
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn internal_errors_do_not_leak_detail() {
        let err = AppError::Storage(StorageError::StaleRow { table: "schedule", id: 7 });
        let res = err.into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn alert_carries_failure_headers() {
        let err = AppError::BadRequestAlert(Alert {
            app_name: "stuffSchedulingApp".into(),
            entity_name: "stuffSchedulingRoles",
            key: AlertKey::IdNull,
            message: AlertKey::IdNull.message("roles"),
        });
        let res = err.into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let error = res.headers().get("x-stuffschedulingapp-error").and_then(|v| v.to_str().ok());
        assert_eq!(error, Some("error.idnull"));
        let params = res.headers().get("x-stuffschedulingapp-params").and_then(|v| v.to_str().ok());
        assert_eq!(params, Some("stuffSchedulingRoles"));
    }
}
