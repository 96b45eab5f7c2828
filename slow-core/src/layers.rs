use std::sync::OnceLock;

use axum::body::Body;
use axum::http::Request;
use axum::response::{IntoResponse, Response};
use axum::Router;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::classify::{ServerErrorsAsFailures, SharedClassifier};
use tower_http::trace::{
    DefaultOnBodyChunk, DefaultOnEos, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse,
    TraceLayer,
};
use tower_http::LatencyUnit;
use tracing::{Level, Span};
use tracing_subscriber::EnvFilter;

use crate::config::{LogConfig, LogFormat};
use crate::envelope::Envelope;
use crate::request_id::{request_id_middleware, RequestId};

/// Filter used when `RUST_LOG` is not set.
pub const DEFAULT_FILTER: &str = "info,tower_http=debug,sqlx=warn";

static TRACING: OnceLock<()> = OnceLock::new();

/// Initialise the global `tracing` subscriber.
///
/// Respects `RUST_LOG`, falling back to [`DEFAULT_FILTER`]. Safe to call more
/// than once (tests do); only the first call installs a subscriber, and an
/// already-installed foreign subscriber is left alone.
pub fn init_tracing(config: &LogConfig) {
    TRACING.get_or_init(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
        let builder = tracing_subscriber::fmt().with_env_filter(filter);
        let installed = match config.format {
            LogFormat::Json => builder.json().with_current_span(true).try_init(),
            LogFormat::Text => builder.try_init(),
        };
        if installed.is_err() {
            tracing::debug!("tracing subscriber already installed");
        }
    });
}

type MakeSpan = fn(&Request<Body>) -> Span;

pub type HttpTraceLayer = TraceLayer<
    SharedClassifier<ServerErrorsAsFailures>,
    MakeSpan,
    DefaultOnRequest,
    DefaultOnResponse,
    DefaultOnBodyChunk,
    DefaultOnEos,
    DefaultOnFailure,
>;

/// Request span with method, uri and request id; responses logged at info
/// with latency in milliseconds, failures at error.
pub fn trace_layer() -> HttpTraceLayer {
    TraceLayer::new_for_http()
        .make_span_with(request_span as MakeSpan)
        .on_response(
            DefaultOnResponse::new()
                .level(Level::INFO)
                .latency_unit(LatencyUnit::Millis),
        )
        .on_failure(DefaultOnFailure::new().level(Level::ERROR))
}

fn request_span(req: &Request<Body>) -> Span {
    let request_id = req
        .extensions()
        .get::<RequestId>()
        .map(|id| id.to_string())
        .unwrap_or_default();
    tracing::info_span!(
        "request",
        method = %req.method(),
        uri = %req.uri(),
        request_id = %request_id,
    )
}

type PanicHandler = fn(Box<dyn std::any::Any + Send>) -> Response;

/// Converts panics into the generic failure envelope.
pub fn catch_panic_layer() -> CatchPanicLayer<PanicHandler> {
    CatchPanicLayer::custom(panic_handler as PanicHandler)
}

fn panic_handler(err: Box<dyn std::any::Any + Send>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s
    } else {
        "unknown panic payload"
    };
    tracing::error!(%detail, "handler panicked");
    Envelope::system_error().into_response()
}

/// Wrap `router` with the standard stack, outermost first:
/// request id, tracing, panic recovery.
pub fn with_default_layers<S>(router: Router<S>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router
        .layer(catch_panic_layer())
        .layer(trace_layer())
        .layer(axum::middleware::from_fn(request_id_middleware))
}
