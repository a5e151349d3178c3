//! # Server Configuration
//!
//! Router, shared state and OpenAPI document for the Juz tracker API.

use std::sync::Arc;

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware,
    routing::{delete, get, post},
};
use sea_orm::DatabaseConnection;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use crate::auth::{SessionVerifier, auth_middleware};
use crate::config::AppConfig;
use crate::handlers;
use crate::identity::IdentityProvider;
use crate::telemetry::{TRACE_ID_HEADER, trace_id_middleware};

/// Application state containing shared resources
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db: DatabaseConnection,
    pub identity: Arc<dyn IdentityProvider>,
    pub sessions: Arc<SessionVerifier>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        db: DatabaseConnection,
        identity: Arc<dyn IdentityProvider>,
    ) -> Self {
        let sessions = Arc::new(SessionVerifier::from_config(&config));
        Self {
            config: Arc::new(config),
            db,
            identity,
            sessions,
        }
    }
}

/// Creates and configures the Axum application router
pub fn create_app(state: AppState) -> Router {
    let protected = Router::new()
        .route("/api/v1/auth/sign-out", post(handlers::auth::sign_out))
        .route("/api/v1/me", get(handlers::auth::me))
        .route(
            "/api/v1/organizations",
            post(handlers::organizations::create_organization),
        )
        .route("/api/v1/chapters", get(handlers::chapters::list_chapters))
        .route(
            "/api/v1/readers",
            get(handlers::readers::list_readers)
                .post(handlers::readers::create_reader)
                .delete(handlers::readers::delete_all_readers),
        )
        .route(
            "/api/v1/readers/{id}",
            delete(handlers::readers::delete_reader),
        )
        .route(
            "/api/v1/assignments",
            get(handlers::assignments::list_assignments)
                .post(handlers::assignments::create_assignment),
        )
        .route(
            "/api/v1/assignments/{id}",
            delete(handlers::assignments::delete_assignment),
        )
        .route(
            "/api/v1/assignments/{id}/advance",
            post(handlers::assignments::advance_assignment),
        )
        .route("/api/v1/progress", get(handlers::progress::get_progress))
        .route("/api/v1/snapshot", get(handlers::progress::get_snapshot))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let cors = cors_layer(&state.config);

    Router::new()
        .route("/", get(handlers::root))
        .route("/healthz", get(handlers::healthz))
        .route("/api/v1/auth/sign-up", post(handlers::auth::sign_up))
        .route("/api/v1/auth/sign-in", post(handlers::auth::sign_in))
        .merge(protected)
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id_middleware))
        .layer(cors)
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .cors_allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .expose_headers([TRACE_ID_HEADER.clone()])
}

/// Starts the server with the given configuration
pub async fn run_server(state: AppState) -> anyhow::Result<()> {
    let addr = state.config.bind_addr()?;
    let profile = state.config.profile.clone();
    let app = create_app(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, %profile, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::root,
        crate::handlers::healthz,
        crate::handlers::auth::sign_up,
        crate::handlers::auth::sign_in,
        crate::handlers::auth::sign_out,
        crate::handlers::auth::me,
        crate::handlers::organizations::create_organization,
        crate::handlers::chapters::list_chapters,
        crate::handlers::readers::list_readers,
        crate::handlers::readers::create_reader,
        crate::handlers::readers::delete_reader,
        crate::handlers::readers::delete_all_readers,
        crate::handlers::assignments::list_assignments,
        crate::handlers::assignments::create_assignment,
        crate::handlers::assignments::advance_assignment,
        crate::handlers::assignments::delete_assignment,
        crate::handlers::progress::get_progress,
        crate::handlers::progress::get_snapshot,
    ),
    components(
        schemas(
            crate::models::ServiceInfo,
            crate::error::ApiError,
            crate::handlers::HealthResponse,
            crate::handlers::auth::SignUpRequest,
            crate::handlers::auth::SignUpResponse,
            crate::handlers::auth::SignInRequest,
            crate::handlers::auth::MeResponse,
            crate::identity::AuthSession,
            crate::identity::AuthUser,
            crate::handlers::organizations::CreateOrganizationRequest,
            crate::handlers::organizations::OrganizationResponse,
            crate::handlers::chapters::ChaptersResponse,
            crate::handlers::readers::ReadersResponse,
            crate::handlers::readers::CreateReaderRequest,
            crate::handlers::readers::RemoveReadersResponse,
            crate::handlers::assignments::AssignmentsResponse,
            crate::handlers::assignments::CreateAssignmentRequest,
            crate::handlers::progress::SnapshotResponse,
            crate::tracker::Chapter,
            crate::tracker::Reader,
            crate::tracker::Assignment,
            crate::tracker::AssignmentStatus,
            crate::tracker::ProgressSummary,
            crate::tracker::ReaderProgress,
            crate::tracker::TrackerSnapshot,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "root", description = "Service metadata and health"),
        (name = "auth", description = "Sign-up, sign-in and session"),
        (name = "organizations", description = "Tenant creation"),
        (name = "chapters", description = "Global Juz catalog"),
        (name = "readers", description = "Readers of the caller's organization"),
        (name = "assignments", description = "Chapter assignments and status ring"),
        (name = "progress", description = "Aggregated progress"),
    ),
    info(
        title = "Juz Tracker API",
        description = "Distribute the 30 Juz among readers and track their progress",
        version = env!("CARGO_PKG_VERSION"),
    )
)]
pub struct ApiDoc;
