//! # API REST
//!
//! REST API implementation for the AgentDNA dashboard.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (JSON serialization, CORS, the allowed-hosts guard)
//!
//! Uses `api-shared` for wire types and `agentdna-core` for everything behind them.

#![warn(rust_2018_idioms)]

mod handlers;
mod hosts;

use agentdna_core::DashboardService;
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub use handlers::ApiDoc;

/// Application state shared across REST API handlers.
#[derive(Clone)]
pub struct AppState {
    dashboard: DashboardService,
    allowed_hosts: Arc<[String]>,
}

impl AppState {
    /// `allowed_hosts` lists accepted `Host` header values (lower-case, no port). An empty
    /// list accepts every host.
    pub fn new(dashboard: DashboardService, allowed_hosts: Vec<String>) -> Self {
        Self {
            dashboard,
            allowed_hosts: allowed_hosts.into(),
        }
    }
}

/// Build the dashboard router with all routes, documentation and middleware attached.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/agents", get(handlers::overview))
        .route("/agents/:id", get(handlers::agent_profile))
        .route("/search/:email", get(handlers::search_by_email))
        .route("/diff", post(handlers::diff))
        .route("/inspect", post(handlers::inspect))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            hosts::allowed_hosts_guard,
        ))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
mod tests;
