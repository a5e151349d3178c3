use crate::auth::AuthenticatedUser;
use crate::error::ApiError;
use crate::repositories::ChapterRepository;
use crate::server::AppState;
use crate::tracker::Chapter;
use axum::{extract::State, response::Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ChaptersResponse {
    pub chapters: Vec<Chapter>,
}

/// List the chapter catalog
#[utoipa::path(
    get,
    path = "/api/v1/chapters",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All 30 chapters ordered by id", body = ChaptersResponse),
        (status = 401, description = "Missing or invalid session", body = ApiError)
    ),
    tag = "chapters"
)]
pub async fn list_chapters(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
) -> Result<Json<ChaptersResponse>, ApiError> {
    let chapters = ChapterRepository::new(&state.db).list().await?;
    Ok(Json(ChaptersResponse { chapters }))
}
