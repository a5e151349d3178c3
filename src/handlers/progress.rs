//! # Progress API Handlers
//!
//! Both endpoints load a fresh snapshot per request; nothing is cached.

use crate::error::ApiError;
use crate::repositories::load_snapshot;
use crate::server::AppState;
use crate::tracker::{ProgressSummary, TenantScope, TrackerSnapshot};
use axum::{extract::State, response::Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SnapshotResponse {
    #[serde(flatten)]
    pub snapshot: TrackerSnapshot,
    pub progress: ProgressSummary,
}

/// Progress summary for the caller's organization
#[utoipa::path(
    get,
    path = "/api/v1/progress",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Counts by status, completion percentage and per-reader totals", body = ProgressSummary),
        (status = 401, description = "Missing or invalid session", body = ApiError)
    ),
    tag = "progress"
)]
pub async fn get_progress(
    State(state): State<AppState>,
    scope: TenantScope,
) -> Result<Json<ProgressSummary>, ApiError> {
    let snapshot = load_snapshot(&state.db, scope).await?;
    Ok(Json(snapshot.progress()))
}

/// Chapters, readers, assignments and progress in one response
#[utoipa::path(
    get,
    path = "/api/v1/snapshot",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Complete tracker state for the caller", body = SnapshotResponse),
        (status = 401, description = "Missing or invalid session", body = ApiError)
    ),
    tag = "progress"
)]
pub async fn get_snapshot(
    State(state): State<AppState>,
    scope: TenantScope,
) -> Result<Json<SnapshotResponse>, ApiError> {
    let snapshot = load_snapshot(&state.db, scope).await?;
    let progress = snapshot.progress();
    Ok(Json(SnapshotResponse { snapshot, progress }))
}
