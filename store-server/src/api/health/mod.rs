//! Health check routes
//!
//! | Path | Method | |
//! |------|--------|---|
//! | /health | GET | liveness |
//! | /health/detailed | GET | uptime and store counters |

use std::time::SystemTime;

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;

use crate::core::ServerState;
use crate::orders::storage::StorageStats;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/health", get(health))
        .route("/health/detailed", get(detailed_health))
}

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

#[derive(Serialize)]
pub struct DetailedHealthResponse {
    status: &'static str,
    version: &'static str,
    uptime_seconds: u64,
    environment: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    store: Option<StorageStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    store_error: Option<String>,
}

static START_TIME: std::sync::OnceLock<SystemTime> = std::sync::OnceLock::new();

fn get_uptime_seconds() -> u64 {
    let start = START_TIME.get_or_init(SystemTime::now);
    SystemTime::now()
        .duration_since(*start)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

async fn health() -> Json<HealthResponse> {
    let _ = get_uptime_seconds();
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn detailed_health(State(state): State<ServerState>) -> Json<DetailedHealthResponse> {
    let (status, store, store_error) = match state.storage().get_stats() {
        Ok(stats) => ("ok", Some(stats), None),
        Err(e) => {
            tracing::error!(error = %e, "Store health check failed");
            ("error", None, Some(e.to_string()))
        }
    };

    Json(DetailedHealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        uptime_seconds: get_uptime_seconds(),
        environment: state.config.environment.clone(),
        store,
        store_error,
    })
}
