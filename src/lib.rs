pub mod adapters;
pub mod cbs;
pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod gateway;
pub mod handlers;
pub mod middleware;
pub mod ports;
pub mod response;
pub mod services;
pub mod startup;
pub mod validation;

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::config::Config;
use crate::ports::{CbsStatusService, TransactionLedger};
use crate::services::{TapMoneyService, TransactionQueryService, TransferService};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub ledger: Arc<dyn TransactionLedger>,
    pub cbs_status: Arc<dyn CbsStatusService>,
    pub transfers: TransferService,
    pub tapmoney: TapMoneyService,
    pub transactions: TransactionQueryService,
}

pub fn create_app(state: AppState) -> Router {
    let api = Router::new()
        .route("/tapmoney/inquiry", post(handlers::tapmoney::inquiry))
        .route("/tapmoney/payment", post(handlers::tapmoney::payment))
        .route("/transfer/initiate", post(handlers::transfer::initiate))
        .route("/transfer/process", post(handlers::transfer::process))
        .route("/transactions", get(handlers::transactions::list))
        .route("/transactions/:id", get(handlers::transactions::detail))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::require_user,
        ));

    let admin = Router::new()
        .route("/admin/reconciliation", get(handlers::admin::reconciliation))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::require_admin,
        ));

    Router::new()
        .route("/health", get(handlers::health))
        .nest("/api/v1", api.merge(admin))
        .layer(axum_middleware::from_fn(
            middleware::request_logger::request_logger_middleware,
        ))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
