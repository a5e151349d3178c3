//! # Readers API Handlers
//!
//! Reads without an organization return an empty list; writes require one.

use crate::error::ApiError;
use crate::repositories::{NewReader, ReaderRepository};
use crate::server::AppState;
use crate::tracker::{Reader, TenantScope};
use axum::{
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReadersResponse {
    pub readers: Vec<Reader>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateReaderRequest {
    #[schema(example = "Aisha")]
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    /// One of the ten palette colours; the next unused one when omitted
    #[serde(default)]
    #[schema(example = "#4ECDC4")]
    pub color: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RemoveReadersResponse {
    /// Number of readers deleted from the caller's organization
    pub removed: u64,
}

/// List readers of the caller's organization
#[utoipa::path(
    get,
    path = "/api/v1/readers",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Readers ordered by name; empty without an organization", body = ReadersResponse),
        (status = 401, description = "Missing or invalid session", body = ApiError)
    ),
    tag = "readers"
)]
pub async fn list_readers(
    State(state): State<AppState>,
    scope: TenantScope,
) -> Result<Json<ReadersResponse>, ApiError> {
    let readers = match scope.organization_id() {
        Some(organization_id) => {
            ReaderRepository::new(&state.db)
                .list(organization_id)
                .await?
        }
        None => Vec::new(),
    };

    Ok(Json(ReadersResponse { readers }))
}

/// Add a reader to the caller's organization
#[utoipa::path(
    post,
    path = "/api/v1/readers",
    security(("bearer_auth" = [])),
    request_body = CreateReaderRequest,
    responses(
        (status = 201, description = "Reader created", body = Reader),
        (status = 400, description = "Validation failed", body = ApiError),
        (status = 401, description = "Missing or invalid session", body = ApiError),
        (status = 403, description = "Caller has no organization", body = ApiError)
    ),
    tag = "readers"
)]
pub async fn create_reader(
    State(state): State<AppState>,
    scope: TenantScope,
    payload: Result<Json<CreateReaderRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Reader>), ApiError> {
    let organization_id = scope.require()?;
    let Json(request) = payload?;

    let reader = ReaderRepository::new(&state.db)
        .create(
            organization_id,
            NewReader {
                name: request.name,
                email: request.email,
                color: request.color,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(reader)))
}

/// Remove a reader and all of their assignments
#[utoipa::path(
    delete,
    path = "/api/v1/readers/{id}",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Reader UUID")
    ),
    responses(
        (status = 204, description = "Reader removed"),
        (status = 401, description = "Missing or invalid session", body = ApiError),
        (status = 403, description = "Caller has no organization", body = ApiError),
        (status = 404, description = "No such reader in the caller's organization", body = ApiError)
    ),
    tag = "readers"
)]
pub async fn delete_reader(
    State(state): State<AppState>,
    scope: TenantScope,
    Path(reader_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let organization_id = scope.require()?;
    ReaderRepository::new(&state.db)
        .delete(organization_id, reader_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Remove every reader of the caller's organization
#[utoipa::path(
    delete,
    path = "/api/v1/readers",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Readers removed", body = RemoveReadersResponse),
        (status = 401, description = "Missing or invalid session", body = ApiError),
        (status = 403, description = "Caller has no organization", body = ApiError)
    ),
    tag = "readers"
)]
pub async fn delete_all_readers(
    State(state): State<AppState>,
    scope: TenantScope,
) -> Result<Json<RemoveReadersResponse>, ApiError> {
    let organization_id = scope.require()?;
    let removed = ReaderRepository::new(&state.db)
        .delete_all(organization_id)
        .await?;
    Ok(Json(RemoveReadersResponse { removed }))
}
