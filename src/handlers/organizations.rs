//! # Organizations API Handlers

use crate::auth::AuthenticatedUser;
use crate::error::ApiError;
use crate::repositories::OrganizationRepository;
use crate::server::AppState;
use axum::{
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateOrganizationRequest {
    /// Display name (required, max 255 characters)
    #[schema(example = "Thursday circle")]
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrganizationResponse {
    #[schema(value_type = String)]
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Create an organization and join it
#[utoipa::path(
    post,
    path = "/api/v1/organizations",
    security(("bearer_auth" = [])),
    request_body = CreateOrganizationRequest,
    responses(
        (status = 201, description = "Organization created; caller is now a member", body = OrganizationResponse),
        (status = 400, description = "Validation failed", body = ApiError),
        (status = 401, description = "Missing or invalid session", body = ApiError),
        (status = 409, description = "Caller already belongs to an organization", body = ApiError)
    ),
    tag = "organizations"
)]
pub async fn create_organization(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    payload: Result<Json<CreateOrganizationRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<OrganizationResponse>), ApiError> {
    let Json(request) = payload?;

    let organization = OrganizationRepository::new(&state.db)
        .create_for_user(&request.name, user.user_id)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(OrganizationResponse {
            id: organization.id,
            name: organization.name,
            created_at: organization.created_at.with_timezone(&Utc),
        }),
    ))
}
