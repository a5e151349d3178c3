//! # Error Handling
//!
//! This module provides unified error handling for the tracker API,
//! implementing a consistent problem+json response format with trace ID propagation.
//!
//! Failure classes and where they surface:
//! - conflicts (a chapter already held in the organization) become `409`
//! - callers without an organization get `403 NO_ORGANIZATION` on writes
//! - store and network failures are logged and become `500`/`503`
//! - identity provider rejections become `401`/`400`

use axum::{
    extract::rejection::JsonRejection,
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use utoipa::ToSchema;

use crate::identity::AuthError;
use crate::telemetry;
use crate::tracker::{ScopeResolutionError, UnknownStatus};

/// Unified API error response structure
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ApiError {
    /// HTTP status code for the response
    #[serde(skip_serializing, skip_deserializing)]
    pub status: StatusCode,
    /// Error code for programmatic handling
    pub code: Box<str>,
    /// Human-readable error message
    pub message: Box<str>,
    /// Additional error details (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Box<serde_json::Value>>,
    /// Correlation trace ID for debugging (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<Box<str>>,
}

impl ApiError {
    /// Create a new API error with the given status code and message
    pub fn new<S: Into<String>>(status: StatusCode, code: S, message: S) -> Self {
        Self {
            status,
            code: code.into().into_boxed_str(),
            message: message.into().into_boxed_str(),
            details: None,
            trace_id: Self::current_trace_id(),
        }
    }

    /// Add details to the error
    pub fn with_details<V: Into<serde_json::Value>>(mut self, details: V) -> Self {
        self.details = Some(Box::new(details.into()));
        self
    }

    /// Extract current trace ID from the active request (falls back to generated correlation ID)
    fn current_trace_id() -> Option<Box<str>> {
        telemetry::current_trace_id()
            .map(|trace_id| trace_id.into_boxed_str())
            .or_else(|| {
                Some(format!("corr-{}", &uuid::Uuid::new_v4().to_string()[..8]).into_boxed_str())
            })
    }
}

/// Errors produced by the repository layer.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The chapter already has an assignment in this organization
    #[error("chapter {chapter_id} is already assigned in this organization")]
    ChapterAlreadyAssigned { chapter_id: i32 },
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    NotFound(String),
    #[error("validation failed: {0}")]
    Validation(String),
    /// A stored row failed conversion into its domain type
    #[error("invalid stored row: {0}")]
    InvalidRow(String),
    #[error("database error: {0}")]
    Database(#[source] sea_orm::DbErr),
}

impl RepositoryError {
    /// Wrap a database error, classifying unique violations as conflicts.
    pub fn database_error(error: sea_orm::DbErr) -> Self {
        if is_unique_violation(&error) {
            tracing::debug!(?error, "Unique constraint violation detected");
            return Self::Conflict("Resource already exists".to_string());
        }
        Self::Database(error)
    }

    pub fn validation_error<S: Into<String>>(message: S) -> Self {
        Self::Validation(message.into())
    }

    pub fn not_found<S: Into<String>>(message: S) -> Self {
        Self::NotFound(message.into())
    }
}

impl From<UnknownStatus> for RepositoryError {
    fn from(error: UnknownStatus) -> Self {
        Self::InvalidRow(error.to_string())
    }
}

pub(crate) fn is_unique_violation(error: &sea_orm::DbErr) -> bool {
    use sea_orm::SqlErr;

    const UNIQUE_CODES: &[&str] = &["23505", "1555", "2067"];

    if matches!(error.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
        return true;
    }

    database_error_code(error).is_some_and(|code| UNIQUE_CODES.contains(&code.as_str()))
}

/// A referenced row (reader, organization) vanished before the write landed.
pub(crate) fn is_foreign_key_violation(error: &sea_orm::DbErr) -> bool {
    use sea_orm::SqlErr;

    const FOREIGN_KEY_CODES: &[&str] = &["23503", "787"];

    if matches!(
        error.sql_err(),
        Some(SqlErr::ForeignKeyConstraintViolation(_))
    ) {
        return true;
    }

    database_error_code(error).is_some_and(|code| FOREIGN_KEY_CODES.contains(&code.as_str()))
}

fn database_error_code(error: &sea_orm::DbErr) -> Option<String> {
    use sea_orm::RuntimeErr;

    let runtime_err = match error {
        sea_orm::DbErr::Query(RuntimeErr::SqlxError(sqlx_err))
        | sea_orm::DbErr::Exec(RuntimeErr::SqlxError(sqlx_err)) => sqlx_err,
        _ => return None,
    };

    runtime_err
        .as_database_error()
        .and_then(|db_error| db_error.code())
        .map(|code| code.into_owned())
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut headers = HeaderMap::new();
        headers.insert(
            "content-type",
            HeaderValue::from_static("application/problem+json"),
        );

        (self.status, headers, axum::Json(self)).into_response()
    }
}

// Error mappers for common sources

impl From<anyhow::Error> for ApiError {
    fn from(error: anyhow::Error) -> Self {
        tracing::error!("Internal error: {:?}", error);

        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "INTERNAL_SERVER_ERROR",
            "An internal error occurred",
        )
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        let message = match rejection {
            JsonRejection::JsonDataError(err) => format!("Invalid JSON: {}", err),
            JsonRejection::JsonSyntaxError(err) => format!("JSON syntax error: {}", err),
            JsonRejection::MissingJsonContentType(_) => {
                "Missing 'Content-Type: application/json' header".to_string()
            }
            _ => "Invalid request body".to_string(),
        };

        Self::new(StatusCode::BAD_REQUEST, "VALIDATION_FAILED", &message)
    }
}

impl From<sea_orm::DbErr> for ApiError {
    fn from(error: sea_orm::DbErr) -> Self {
        if is_unique_violation(&error) {
            tracing::debug!(?error, "Unique constraint violation detected");
            return Self::new(StatusCode::CONFLICT, "CONFLICT", "Resource already exists");
        }

        match error {
            sea_orm::DbErr::RecordNotFound(record) => Self::new(
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                &format!("Record not found: {}", record),
            ),
            sea_orm::DbErr::Conn(connection_err) => {
                tracing::error!("Database connection error: {:?}", connection_err);
                Self::new(
                    StatusCode::SERVICE_UNAVAILABLE,
                    "SERVICE_UNAVAILABLE",
                    "Database service unavailable",
                )
            }
            _ => {
                tracing::error!("Database error: {:?}", error);
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_SERVER_ERROR",
                    "Database error occurred",
                )
            }
        }
    }
}

impl From<RepositoryError> for ApiError {
    fn from(error: RepositoryError) -> Self {
        match error {
            RepositoryError::ChapterAlreadyAssigned { chapter_id } => Self::new(
                StatusCode::CONFLICT,
                "CHAPTER_ALREADY_ASSIGNED",
                "Failed to assign chapter. It may already be assigned.",
            )
            .with_details(json!({ "chapter_id": chapter_id })),
            RepositoryError::Conflict(message) => {
                Self::new(StatusCode::CONFLICT, "CONFLICT", &message)
            }
            RepositoryError::NotFound(message) => {
                Self::new(StatusCode::NOT_FOUND, "NOT_FOUND", &message)
            }
            RepositoryError::Validation(message) => {
                Self::new(StatusCode::BAD_REQUEST, "VALIDATION_FAILED", &message)
            }
            RepositoryError::InvalidRow(message) => {
                tracing::error!(%message, "Stored row failed domain conversion");
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_SERVER_ERROR",
                    "Stored data is inconsistent",
                )
            }
            RepositoryError::Database(db_err) => db_err.into(),
        }
    }
}

impl From<ScopeResolutionError> for ApiError {
    fn from(_: ScopeResolutionError) -> Self {
        no_organization()
    }
}

impl From<AuthError> for ApiError {
    fn from(error: AuthError) -> Self {
        match error {
            AuthError::InvalidCredentials(message) => {
                Self::new(StatusCode::UNAUTHORIZED, "AUTH_FAILED", &message)
            }
            AuthError::Rejected { status, message } => {
                tracing::info!(status, %message, "Identity provider rejected request");
                Self::new(StatusCode::BAD_REQUEST, "SIGN_UP_FAILED", &message)
            }
            AuthError::NotConfigured => Self::new(
                StatusCode::SERVICE_UNAVAILABLE,
                "AUTH_NOT_CONFIGURED",
                "Authentication provider is not configured",
            ),
            other => {
                tracing::error!(error = %other, "Identity provider call failed");
                Self::new(
                    StatusCode::BAD_GATEWAY,
                    "AUTH_PROVIDER_ERROR",
                    "Authentication provider is unavailable",
                )
            }
        }
    }
}

/// Create an unauthorized error (401)
pub fn unauthorized(message: Option<&str>) -> ApiError {
    let msg = message.unwrap_or("Authentication required");
    ApiError::new(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg)
}

/// Caller is authenticated but belongs to no organization (403)
pub fn no_organization() -> ApiError {
    ApiError::new(
        StatusCode::FORBIDDEN,
        "NO_ORGANIZATION",
        "You are not a member of any organization",
    )
}

/// Create a validation error with field details
pub fn validation_error(message: &str, field_errors: serde_json::Value) -> ApiError {
    ApiError::new(StatusCode::BAD_REQUEST, "VALIDATION_FAILED", message).with_details(field_errors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use serde_json::json;

    #[test]
    fn test_api_error_basic() {
        let error = ApiError::new(
            StatusCode::BAD_REQUEST,
            "VALIDATION_FAILED",
            "Test error message",
        );

        assert_eq!(error.code, Box::from("VALIDATION_FAILED"));
        assert_eq!(error.message, Box::from("Test error message"));
        assert_eq!(error.details, None);
    }

    #[test]
    fn test_from_anyhow() {
        let api_error: ApiError = anyhow::anyhow!("Something went wrong").into();

        assert_eq!(api_error.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(api_error.message, Box::from("An internal error occurred"));
    }

    #[test]
    fn test_content_type_header() {
        let response = ApiError::new(StatusCode::BAD_REQUEST, "VALIDATION_FAILED", "Test error")
            .into_response();

        assert_eq!(
            response.headers().get("content-type").unwrap(),
            "application/problem+json"
        );
    }

    #[test]
    fn test_trace_id_generation() {
        let error = ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_SERVER_ERROR", "x");

        let trace_id = error.trace_id.unwrap();
        assert!(trace_id.starts_with("corr-"));
        assert_eq!(trace_id.len(), 13);
    }

    #[test]
    fn test_chapter_conflict_mapping() {
        let api_error: ApiError = RepositoryError::ChapterAlreadyAssigned { chapter_id: 5 }.into();

        assert_eq!(api_error.status, StatusCode::CONFLICT);
        assert_eq!(api_error.code, Box::from("CHAPTER_ALREADY_ASSIGNED"));
        assert_eq!(api_error.details, Some(Box::new(json!({ "chapter_id": 5 }))));
    }

    #[test]
    fn test_scope_resolution_maps_to_forbidden() {
        let api_error: ApiError = ScopeResolutionError.into();

        assert_eq!(api_error.status, StatusCode::FORBIDDEN);
        assert_eq!(api_error.code, Box::from("NO_ORGANIZATION"));
    }

    #[test]
    fn test_repository_error_mapping() {
        let not_found: ApiError = RepositoryError::not_found("Reader not found").into();
        assert_eq!(not_found.status, StatusCode::NOT_FOUND);

        let invalid: ApiError = RepositoryError::validation_error("name is required").into();
        assert_eq!(invalid.status, StatusCode::BAD_REQUEST);
        assert_eq!(invalid.code, Box::from("VALIDATION_FAILED"));

        let corrupt: ApiError = RepositoryError::from(UnknownStatus("done".into())).into();
        assert_eq!(corrupt.status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_database_error_mapping() {
        let api_error: ApiError = sea_orm::DbErr::RecordNotFound("test_record".to_string()).into();
        assert_eq!(api_error.status, StatusCode::NOT_FOUND);
        assert!(api_error.message.contains("test_record"));

        let conn: ApiError = RepositoryError::database_error(sea_orm::DbErr::Conn(
            sea_orm::RuntimeErr::Internal("refused".to_string()),
        ))
        .into();
        assert_eq!(conn.status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_auth_error_mapping() {
        let bad_credentials: ApiError =
            AuthError::InvalidCredentials("Invalid login credentials".to_string()).into();
        assert_eq!(bad_credentials.status, StatusCode::UNAUTHORIZED);
        assert_eq!(bad_credentials.code, Box::from("AUTH_FAILED"));

        let rejected: ApiError = AuthError::Rejected {
            status: 422,
            message: "Password should be at least 6 characters".to_string(),
        }
        .into();
        assert_eq!(rejected.status, StatusCode::BAD_REQUEST);
        assert_eq!(rejected.code, Box::from("SIGN_UP_FAILED"));

        let disabled: ApiError = AuthError::NotConfigured.into();
        assert_eq!(disabled.status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_unauthorized_helper() {
        let auth_error = unauthorized(None);
        assert_eq!(auth_error.status, StatusCode::UNAUTHORIZED);
        assert_eq!(auth_error.message, Box::from("Authentication required"));

        let missing = unauthorized(Some("Missing Authorization header"));
        assert_eq!(missing.code, Box::from("UNAUTHORIZED"));
    }

    #[test]
    fn test_validation_error_with_details() {
        let field_errors = json!({ "name": "Name is required" });
        let error = validation_error("Validation failed", field_errors.clone());

        assert_eq!(error.status, StatusCode::BAD_REQUEST);
        assert_eq!(error.details, Some(Box::new(field_errors)));
    }
}
