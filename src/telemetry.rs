//! Tracing setup for the tracker binaries and per-request trace ids.
//!
//! Every request handled by the API runs inside a trace id scope so error
//! bodies and log lines can be correlated with the `X-Trace-Id` header.

use std::sync::atomic::{AtomicBool, Ordering};

use axum::{
    extract::Request,
    http::{HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};
use log::LevelFilter;
use thiserror::Error;
use tokio::task_local;
use tracing::Instrument;
use tracing_log::LogTracer;
use tracing_subscriber::{
    EnvFilter, filter::ParseError, fmt, layer::Layer, layer::SubscriberExt,
    util::SubscriberInitExt,
};

use crate::config::AppConfig;

/// Correlation header read from and echoed to tracker clients.
pub static TRACE_ID_HEADER: HeaderName = HeaderName::from_static("x-trace-id");

const MAX_TRACE_ID_LEN: usize = 128;

/// Trace id owned by the request currently being served.
#[derive(Debug, Clone)]
pub struct TraceContext {
    pub trace_id: String,
}

task_local! {
    static REQUEST_TRACE: TraceContext;
}

/// Why the tracker could not set up its log output.
#[derive(Debug, Error)]
pub enum TracingSetupError {
    #[error("log level `{directives}` is not a valid filter: {source}")]
    InvalidLogLevel {
        directives: String,
        #[source]
        source: ParseError,
    },
}

static TRACING_READY: AtomicBool = AtomicBool::new(false);

/// Install the tracker's subscriber once per process.
///
/// `RUST_LOG` wins over the configured level. Later calls are no-ops, and a
/// subscriber installed by someone else is left in place.
pub fn init_tracing(config: &AppConfig) -> Result<(), TracingSetupError> {
    if TRACING_READY.swap(true, Ordering::SeqCst) {
        return Ok(());
    }

    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => level_filter(&config.log_level).inspect_err(|_| {
            TRACING_READY.store(false, Ordering::SeqCst);
        })?,
    };

    let output = if config.log_format == "pretty" {
        fmt::layer().pretty().boxed()
    } else {
        fmt::layer().json().boxed()
    };

    if tracing_subscriber::registry()
        .with(filter)
        .with(output)
        .try_init()
        .is_err()
    {
        TRACING_READY.store(false, Ordering::SeqCst);
        tracing::debug!("tracing subscriber already installed; keeping it");
    }

    bridge_log_records();
    Ok(())
}

fn level_filter(directives: &str) -> Result<EnvFilter, TracingSetupError> {
    EnvFilter::try_new(directives).map_err(|source| TracingSetupError::InvalidLogLevel {
        directives: directives.to_string(),
        source,
    })
}

/// Route `log` records from dependencies (sqlx, reqwest) into tracing.
fn bridge_log_records() {
    if let Err(err) = LogTracer::builder()
        .with_max_level(LevelFilter::Trace)
        .init()
    {
        let installed = std::any::type_name_of_val(log::logger());
        if !installed.contains("LogTracer") {
            tracing::warn!(
                error = %err,
                logger = installed,
                "log records from dependencies will bypass tracing"
            );
        }
    }
}

/// Run `future` with `context` as the current request's trace id.
pub async fn with_trace_context<Fut, R>(context: TraceContext, future: Fut) -> R
where
    Fut: std::future::Future<Output = R>,
{
    REQUEST_TRACE.scope(context, future).await
}

/// Trace id of the request being served, if any.
pub fn current_trace_id() -> Option<String> {
    REQUEST_TRACE.try_with(|ctx| ctx.trace_id.clone()).ok()
}

/// Middleware assigning every request a trace ID.
///
/// An inbound `X-Trace-Id` is reused when present; otherwise a fresh UUID is
/// generated. The ID is scoped to the handler task and echoed on the response.
pub async fn trace_id_middleware(req: Request, next: Next) -> Response {
    let trace_id = req
        .headers()
        .get(&TRACE_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty() && value.len() <= MAX_TRACE_ID_LEN)
        .map(str::to_string)
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    let span = tracing::info_span!("request", trace_id = %trace_id);
    let context = TraceContext {
        trace_id: trace_id.clone(),
    };

    let mut response = with_trace_context(context, next.run(req).instrument(span)).await;

    if let Ok(value) = HeaderValue::from_str(&trace_id) {
        response.headers_mut().insert(TRACE_ID_HEADER.clone(), value);
    }
    response
}

/// Counters for tracker domain events.
pub mod events {
    use metrics::counter;

    use crate::tracker::AssignmentStatus;

    pub fn assignment_created() {
        counter!("juz_assignments_created_total").increment(1);
    }

    pub fn assignment_advanced(to: AssignmentStatus) {
        counter!("juz_assignments_advanced_total", "status" => to.as_str()).increment(1);
    }

    pub fn assignment_conflict() {
        counter!("juz_assignment_conflicts_total").increment(1);
    }

    pub fn assignment_removed() {
        counter!("juz_assignments_removed_total").increment(1);
    }

    pub fn readers_removed(count: u64) {
        counter!("juz_readers_removed_total").increment(count);
    }
}
