//! # Assignments API Handlers

use crate::error::ApiError;
use crate::repositories::{AssignmentRepository, NewAssignment};
use crate::server::AppState;
use crate::tracker::{Assignment, TenantScope};
use axum::{
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AssignmentsResponse {
    pub assignments: Vec<Assignment>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateAssignmentRequest {
    #[schema(example = 5, minimum = 1, maximum = 30)]
    pub chapter_id: i32,
    #[schema(value_type = String)]
    pub reader_id: Uuid,
    #[serde(default)]
    pub notes: Option<String>,
}

/// List assignments of the caller's organization
#[utoipa::path(
    get,
    path = "/api/v1/assignments",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Assignments ordered by chapter; empty without an organization", body = AssignmentsResponse),
        (status = 401, description = "Missing or invalid session", body = ApiError)
    ),
    tag = "assignments"
)]
pub async fn list_assignments(
    State(state): State<AppState>,
    scope: TenantScope,
) -> Result<Json<AssignmentsResponse>, ApiError> {
    let assignments = match scope.organization_id() {
        Some(organization_id) => {
            AssignmentRepository::new(&state.db)
                .list(organization_id)
                .await?
        }
        None => Vec::new(),
    };

    Ok(Json(AssignmentsResponse { assignments }))
}

/// Assign an unassigned chapter to a reader
#[utoipa::path(
    post,
    path = "/api/v1/assignments",
    security(("bearer_auth" = [])),
    request_body = CreateAssignmentRequest,
    responses(
        (status = 201, description = "Chapter assigned with status pending", body = Assignment),
        (status = 400, description = "Validation failed", body = ApiError),
        (status = 401, description = "Missing or invalid session", body = ApiError),
        (status = 403, description = "Caller has no organization", body = ApiError),
        (status = 404, description = "Reader not found in the caller's organization", body = ApiError),
        (status = 409, description = "Chapter already assigned", body = ApiError)
    ),
    tag = "assignments"
)]
pub async fn create_assignment(
    State(state): State<AppState>,
    scope: TenantScope,
    payload: Result<Json<CreateAssignmentRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Assignment>), ApiError> {
    let organization_id = scope.require()?;
    let Json(request) = payload?;

    let assignment = AssignmentRepository::new(&state.db)
        .assign(
            organization_id,
            NewAssignment {
                chapter_id: request.chapter_id,
                reader_id: request.reader_id,
                notes: request.notes,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(assignment)))
}

/// Advance an assignment to the next status
#[utoipa::path(
    post,
    path = "/api/v1/assignments/{id}/advance",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Assignment UUID")
    ),
    responses(
        (status = 200, description = "pending -> in_progress -> completed -> pending", body = Assignment),
        (status = 401, description = "Missing or invalid session", body = ApiError),
        (status = 403, description = "Caller has no organization", body = ApiError),
        (status = 404, description = "No such assignment in the caller's organization", body = ApiError),
        (status = 409, description = "Assignment changed concurrently", body = ApiError)
    ),
    tag = "assignments"
)]
pub async fn advance_assignment(
    State(state): State<AppState>,
    scope: TenantScope,
    Path(assignment_id): Path<Uuid>,
) -> Result<Json<Assignment>, ApiError> {
    let organization_id = scope.require()?;
    let assignment = AssignmentRepository::new(&state.db)
        .advance(organization_id, assignment_id, Utc::now())
        .await?;
    Ok(Json(assignment))
}

/// Unassign a chapter
#[utoipa::path(
    delete,
    path = "/api/v1/assignments/{id}",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Assignment UUID")
    ),
    responses(
        (status = 204, description = "Assignment removed"),
        (status = 401, description = "Missing or invalid session", body = ApiError),
        (status = 403, description = "Caller has no organization", body = ApiError),
        (status = 404, description = "No such assignment in the caller's organization", body = ApiError)
    ),
    tag = "assignments"
)]
pub async fn delete_assignment(
    State(state): State<AppState>,
    scope: TenantScope,
    Path(assignment_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let organization_id = scope.require()?;
    AssignmentRepository::new(&state.db)
        .unassign(organization_id, assignment_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
