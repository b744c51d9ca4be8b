pub mod adapters;
pub mod cli;
pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod handlers;
pub mod ledger;
pub mod middleware;
pub mod ports;
pub mod scoring;
pub mod services;
pub mod validation;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;

use crate::ports::TransactionStore;
use crate::services::TransactionPipeline;

#[derive(Clone)]
pub struct AppState {
    pub db: sqlx::PgPool,
    pub store: Arc<dyn TransactionStore>,
    pub pipeline: Arc<TransactionPipeline>,
}

pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/transactions",
            post(handlers::transactions::create_transaction)
                .get(handlers::transactions::list_transactions),
        )
        .route(
            "/transactions/:id",
            get(handlers::transactions::get_transaction),
        )
        .route(
            "/dashboard/stats",
            get(handlers::transactions::dashboard_stats),
        )
        .layer(axum::middleware::from_fn(
            middleware::request_logger_middleware,
        ))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
