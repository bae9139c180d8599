//! HTTP API: OTLP log ingestion and health

mod encoding;
mod health;
mod logs;

pub use logs::LogsState;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};

use crate::core::constants::OTLP_BODY_LIMIT;

pub fn routes(state: LogsState) -> Router {
    Router::new()
        .route("/v1/logs", post(logs::export))
        .layer(DefaultBodyLimit::max(OTLP_BODY_LIMIT))
        .with_state(state)
        .route("/health", get(health::health))
}
