//! # Authentication and Tenant Resolution
//!
//! Session tokens issued by the identity service are verified locally
//! (HS256, shared secret). The caller's organization is then looked up once per
//! request and attached as a [`TenantScope`], so handlers never re-derive it.

use std::time::Duration;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::AppConfig;
use crate::error::{ApiError, unauthorized};
use crate::repositories::OrganizationRepository;
use crate::server::AppState;
use crate::tracker::TenantScope;

/// Claims carried by a session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub aud: String,
    pub exp: u64,
    #[serde(default)]
    pub iat: u64,
}

/// The verified caller of a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub email: Option<String>,
}

/// Raw bearer token of the current request, kept for sign-out.
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

/// Verifies session tokens against the configured secret and audience.
#[derive(Clone)]
pub struct SessionVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl SessionVerifier {
    pub fn from_config(config: &AppConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[config.jwt_audience.as_str()]);
        validation.set_required_spec_claims(&["exp", "sub", "aud"]);
        validation.leeway = config.jwt_leeway_seconds;

        Self {
            key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
        }
    }

    pub fn verify(&self, token: &str) -> Result<AuthenticatedUser, ApiError> {
        let data = decode::<SessionClaims>(token, &self.key, &self.validation).map_err(|err| {
            tracing::debug!(error = %err, "Rejected session token");
            unauthorized(Some("Invalid or expired session token"))
        })?;

        Ok(AuthenticatedUser {
            user_id: data.claims.sub,
            email: data.claims.email,
        })
    }
}

/// Mint a session token the verifier accepts. Used by the admin CLI and tests.
pub fn issue_session_token(
    config: &AppConfig,
    user_id: Uuid,
    email: Option<&str>,
    ttl: Duration,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = jsonwebtoken::get_current_timestamp();
    let claims = SessionClaims {
        sub: user_id,
        email: email.map(str::to_string),
        aud: config.jwt_audience.clone(),
        exp: now + ttl.as_secs(),
        iat: now,
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
}

/// Authentication middleware: verify the bearer session and resolve the tenant.
///
/// A caller without an organization is let through as
/// [`TenantScope::Unaffiliated`]; handlers decide what that means.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer_token(request.headers())?.to_string();
    let user = state.sessions.verify(&token)?;

    let organization_id = OrganizationRepository::new(&state.db)
        .find_membership(user.user_id)
        .await?;
    let scope = TenantScope::from_membership(organization_id);

    match scope {
        TenantScope::Organization(org) => {
            tracing::debug!(user_id = %user.user_id, organization_id = %org, "Authenticated request")
        }
        TenantScope::Unaffiliated => {
            tracing::debug!(user_id = %user.user_id, "Authenticated request without organization")
        }
    }

    let extensions = request.extensions_mut();
    extensions.insert(user);
    extensions.insert(scope);
    extensions.insert(BearerToken(token));

    Ok(next.run(request).await)
}

fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, ApiError> {
    let header = headers
        .get(AUTHORIZATION)
        .ok_or_else(|| unauthorized(Some("Missing Authorization header")))?
        .to_str()
        .map_err(|_| unauthorized(Some("Invalid Authorization header")))?;

    header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| unauthorized(Some("Authorization header must use Bearer scheme")))
}

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or_else(|| unauthorized(None))
    }
}

impl<S> FromRequestParts<S> for TenantScope
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<TenantScope>()
            .copied()
            .ok_or_else(|| unauthorized(None))
    }
}

impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<BearerToken>()
            .cloned()
            .ok_or_else(|| unauthorized(None))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::run_migrations;
    use crate::identity::DisabledIdentityProvider;
    use crate::repositories::OrganizationRepository;
    use axum::{
        Router,
        body::Body,
        http::{Request, StatusCode},
        routing::get,
    };
    use sea_orm::Database;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn test_config() -> AppConfig {
        AppConfig {
            profile: "test".to_string(),
            jwt_secret: "test-secret-value".to_string(),
            ..AppConfig::default()
        }
    }

    async fn test_state() -> AppState {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        run_migrations(&db).await.unwrap();
        AppState::new(test_config(), db, Arc::new(DisabledIdentityProvider))
    }

    async fn run_middleware(state: AppState, request: Request<Body>) -> Response {
        async fn handler(scope: TenantScope) -> String {
            match scope.organization_id() {
                Some(org) => org.to_string(),
                None => "none".to_string(),
            }
        }

        Router::new()
            .route("/test", get(handler))
            .layer(axum::middleware::from_fn_with_state(
                state.clone(),
                auth_middleware,
            ))
            .with_state(state)
            .oneshot(request)
            .await
            .unwrap()
    }

    fn request_with(token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri("/test");
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {token}"));
        }
        builder.body(Body::empty()).unwrap()
    }

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn issued_token_round_trips_through_verifier() {
        let config = test_config();
        let user_id = Uuid::new_v4();
        let token =
            issue_session_token(&config, user_id, Some("a@example.com"), Duration::from_secs(60))
                .unwrap();

        let user = SessionVerifier::from_config(&config).verify(&token).unwrap();
        assert_eq!(user.user_id, user_id);
        assert_eq!(user.email.as_deref(), Some("a@example.com"));
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let other = AppConfig {
            jwt_secret: "another-secret".to_string(),
            ..test_config()
        };
        let token =
            issue_session_token(&other, Uuid::new_v4(), None, Duration::from_secs(60)).unwrap();

        let err = SessionVerifier::from_config(&test_config())
            .verify(&token)
            .unwrap_err();
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn token_for_other_audience_is_rejected() {
        let other = AppConfig {
            jwt_audience: "service_role".to_string(),
            ..test_config()
        };
        let token =
            issue_session_token(&other, Uuid::new_v4(), None, Duration::from_secs(60)).unwrap();

        assert!(SessionVerifier::from_config(&test_config()).verify(&token).is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let config = test_config();
        let now = jsonwebtoken::get_current_timestamp();
        let claims = SessionClaims {
            sub: Uuid::new_v4(),
            email: None,
            aud: config.jwt_audience.clone(),
            exp: now - 3600,
            iat: now - 7200,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
        )
        .unwrap();

        assert!(SessionVerifier::from_config(&config).verify(&token).is_err());
    }

    #[tokio::test]
    async fn missing_auth_header_returns_401() {
        let response = run_middleware(test_state().await, request_with(None)).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn invalid_auth_scheme_returns_401() {
        let request = Request::builder()
            .uri("/test")
            .header("Authorization", "Basic dGVzdDoxMjM=")
            .body(Body::empty())
            .unwrap();

        let response = run_middleware(test_state().await, request).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn garbage_token_returns_401() {
        let response = run_middleware(test_state().await, request_with(Some("not-a-jwt"))).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn user_without_membership_is_unaffiliated() {
        let state = test_state().await;
        let token =
            issue_session_token(&state.config, Uuid::new_v4(), None, Duration::from_secs(60))
                .unwrap();

        let response = run_middleware(state, request_with(Some(&token))).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "none");
    }

    #[tokio::test]
    async fn member_is_scoped_to_their_organization() {
        let state = test_state().await;
        let user_id = Uuid::new_v4();
        let organization = OrganizationRepository::new(&state.db)
            .create_for_user("Family circle", user_id)
            .await
            .unwrap();
        let token =
            issue_session_token(&state.config, user_id, None, Duration::from_secs(60)).unwrap();

        let response = run_middleware(state, request_with(Some(&token))).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, organization.id.to_string());
    }
}
