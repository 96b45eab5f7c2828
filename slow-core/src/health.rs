//! Liveness route: `GET /` answers `"OK"` unconditionally.

use axum::routing::get;
use axum::{Json, Router};

pub async fn health() -> Json<&'static str> {
    Json("OK")
}

pub fn health_routes<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new().route("/", get(health))
}
