//! # botweaver-api
//!
//! HTTP layer for BotWeaver. Turns configurations into downloadable projects,
//! validates and transfers them, and drives the process supervisor for bots
//! hosted on this machine.

pub mod middleware;
pub mod package;
pub mod routes;

use axum::{Router, extract::DefaultBodyLimit};
use botweaver_supervisor::ProcessSupervisor;
use std::sync::Arc;
use std::time::Instant;

/// Shared application state available to all route handlers.
#[derive(Clone)]
pub struct AppState {
    /// Registry of bots hosted as child processes.
    pub supervisor: ProcessSupervisor,
    pub started_at: Instant,
    /// Largest accepted request body; configurations can embed long responses.
    pub body_limit_bytes: usize,
}

impl AppState {
    pub fn new(supervisor: ProcessSupervisor, body_limit_bytes: usize) -> Self {
        Self {
            supervisor,
            started_at: Instant::now(),
            body_limit_bytes,
        }
    }
}

/// Build the complete API router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let body_limit = state.body_limit_bytes;

    let bot_routes = Router::new()
        .merge(routes::bot::router())
        .merge(routes::hosting::router());

    let api_routes = Router::new()
        .nest("/bot", bot_routes)
        .merge(routes::health::router());

    Router::new()
        .nest("/api", api_routes)
        .fallback(routes::not_found)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(axum::middleware::from_fn(middleware::security_headers))
        .layer(
            tower_http::cors::CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any)
                .expose_headers([axum::http::header::CONTENT_DISPOSITION]),
        )
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .layer(tower_http::compression::CompressionLayer::new())
        .with_state(Arc::new(state))
}
