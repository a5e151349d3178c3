//! # Auth API Handlers
//!
//! Thin proxies to the identity service plus the `me` endpoint, which reports
//! the caller's resolved organization.

use crate::auth::{AuthenticatedUser, BearerToken};
use crate::error::{ApiError, validation_error};
use crate::identity::{AuthSession, AuthUser, SignUpOutcome};
use crate::repositories::OrganizationRepository;
use crate::server::AppState;
use crate::tracker::TenantScope;
use axum::{
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SignUpRequest {
    #[schema(example = "reader@example.com")]
    pub email: String,
    pub password: String,
    /// Display name stored with the identity
    #[schema(example = "Aisha")]
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SignInRequest {
    #[schema(example = "reader@example.com")]
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SignUpResponse {
    pub user: AuthUser,
    /// Present when the provider signs the user in immediately
    pub session: Option<AuthSession>,
    /// True when the provider requires email confirmation first
    pub confirmation_required: bool,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MeResponse {
    #[schema(value_type = String)]
    pub user_id: Uuid,
    pub email: Option<String>,
    /// Null when the user belongs to no organization
    #[schema(value_type = Option<String>)]
    pub organization_id: Option<Uuid>,
    pub organization_name: Option<String>,
}

fn require_credentials(email: &str, password: &str) -> Result<(), ApiError> {
    let mut errors = serde_json::Map::new();
    if !email.trim().contains('@') {
        errors.insert("email".into(), json!("A valid email address is required"));
    }
    if password.is_empty() {
        errors.insert("password".into(), json!("Password is required"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(validation_error("Validation failed", errors.into()))
    }
}

/// Register a new user with the identity service
#[utoipa::path(
    post,
    path = "/api/v1/auth/sign-up",
    request_body = SignUpRequest,
    responses(
        (status = 201, description = "User registered", body = SignUpResponse),
        (status = 400, description = "Validation or sign-up failure", body = ApiError),
        (status = 502, description = "Identity provider unreachable", body = ApiError),
        (status = 503, description = "Identity provider not configured", body = ApiError)
    ),
    tag = "auth"
)]
pub async fn sign_up(
    State(state): State<AppState>,
    payload: Result<Json<SignUpRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<SignUpResponse>), ApiError> {
    let Json(request) = payload?;
    require_credentials(&request.email, &request.password)?;
    let name = request.name.trim();
    if name.is_empty() {
        return Err(validation_error(
            "Validation failed",
            json!({ "name": "Name is required" }),
        ));
    }

    let outcome = state
        .identity
        .sign_up(request.email.trim(), &request.password, name)
        .await?;

    let response = match outcome {
        SignUpOutcome::Session(session) => SignUpResponse {
            user: session.user.clone(),
            session: Some(session),
            confirmation_required: false,
        },
        SignUpOutcome::ConfirmationRequired(user) => SignUpResponse {
            user,
            session: None,
            confirmation_required: true,
        },
    };

    Ok((StatusCode::CREATED, Json(response)))
}

/// Exchange email and password for a session
#[utoipa::path(
    post,
    path = "/api/v1/auth/sign-in",
    request_body = SignInRequest,
    responses(
        (status = 200, description = "Signed in", body = AuthSession),
        (status = 400, description = "Validation failed", body = ApiError),
        (status = 401, description = "Invalid credentials", body = ApiError),
        (status = 502, description = "Identity provider unreachable", body = ApiError)
    ),
    tag = "auth"
)]
pub async fn sign_in(
    State(state): State<AppState>,
    payload: Result<Json<SignInRequest>, JsonRejection>,
) -> Result<Json<AuthSession>, ApiError> {
    let Json(request) = payload?;
    require_credentials(&request.email, &request.password)?;

    let session = state
        .identity
        .sign_in(request.email.trim(), &request.password)
        .await?;
    Ok(Json(session))
}

/// Revoke the caller's session
#[utoipa::path(
    post,
    path = "/api/v1/auth/sign-out",
    security(("bearer_auth" = [])),
    responses(
        (status = 204, description = "Signed out"),
        (status = 401, description = "Missing or invalid session", body = ApiError)
    ),
    tag = "auth"
)]
pub async fn sign_out(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    BearerToken(token): BearerToken,
) -> Result<StatusCode, ApiError> {
    state.identity.sign_out(&token).await?;
    tracing::info!(user_id = %user.user_id, "User signed out");
    Ok(StatusCode::NO_CONTENT)
}

/// Current user and resolved organization
#[utoipa::path(
    get,
    path = "/api/v1/me",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Caller identity", body = MeResponse),
        (status = 401, description = "Missing or invalid session", body = ApiError)
    ),
    tag = "auth"
)]
pub async fn me(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    scope: TenantScope,
) -> Result<Json<MeResponse>, ApiError> {
    let organization = match scope.organization_id() {
        Some(id) => OrganizationRepository::new(&state.db).get_by_id(id).await?,
        None => None,
    };

    Ok(Json(MeResponse {
        user_id: user.user_id,
        email: user.email,
        organization_id: organization.as_ref().map(|org| org.id),
        organization_name: organization.map(|org| org.name),
    }))
}
