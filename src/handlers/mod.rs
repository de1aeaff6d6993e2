pub mod admin;
pub mod tapmoney;
pub mod transactions;
pub mod transfer;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use std::time::Instant;

use crate::AppState;

#[derive(Debug, Serialize)]
pub struct DependencyHealth {
    pub status: &'static str,
    pub latency_ms: u64,
}

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub version: &'static str,
    pub ledger: DependencyHealth,
    pub cbs: DependencyHealth,
}

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let start = Instant::now();
    let ledger_ok = state.ledger.ping().await.is_ok();
    let ledger = DependencyHealth {
        status: if ledger_ok { "connected" } else { "disconnected" },
        latency_ms: start.elapsed().as_millis() as u64,
    };

    let start = Instant::now();
    let cbs_ok = state.cbs_status.get_status().await.is_ok();
    let cbs = DependencyHealth {
        status: if cbs_ok { "reachable" } else { "unreachable" },
        latency_ms: start.elapsed().as_millis() as u64,
    };

    // The ledger is the critical dependency; a down CBS only degrades.
    let overall = if !ledger_ok {
        "unhealthy"
    } else if !cbs_ok {
        "degraded"
    } else {
        "healthy"
    };

    let status_code = if ledger_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status_code,
        Json(HealthStatus {
            status: overall,
            version: env!("CARGO_PKG_VERSION"),
            ledger,
            cbs,
        }),
    )
}
