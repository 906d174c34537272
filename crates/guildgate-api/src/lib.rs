//! # guildgate-api
//!
//! REST API layer for Guildgate. Exposes the authorization core to the
//! dashboard: module access checks, guild listings, reaction-role draft
//! validation, and the liveness gauge.

pub mod middleware;
pub mod routes;

use axum::Router;
use guildgate_common::{guilds::GuildViewAggregator, sampler::RateSampler};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Largest JSON body accepted. A full 25-role menu is well under this.
const MAX_BODY_BYTES: usize = 256 * 1024;

/// Shared application state available to all route handlers.
#[derive(Clone)]
pub struct AppState {
    /// Process-wide liveness sampler; started by the server binary.
    pub liveness: RateSampler,
    /// Guild view builder configured with the icon CDN.
    pub guilds: GuildViewAggregator,
    pub started_at: Instant,
    pub request_timeout: Duration,
}

impl AppState {
    pub fn new(liveness: RateSampler, guilds: GuildViewAggregator, request_timeout: Duration) -> Self {
        Self {
            liveness,
            guilds,
            started_at: Instant::now(),
            request_timeout,
        }
    }
}

/// Build the complete API router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let request_timeout = state.request_timeout;

    let api_routes = Router::new()
        .merge(routes::health::router())
        .merge(routes::permissions::router())
        .merge(routes::modules::router())
        .merge(routes::guilds::router())
        .merge(routes::reaction_roles::router())
        .merge(routes::liveness::router());

    Router::new()
        .nest("/api/v1", api_routes)
        .layer(axum::middleware::from_fn(middleware::security_headers))
        .layer(
            tower_http::cors::CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any),
        )
        .layer(axum::extract::DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(tower_http::timeout::TimeoutLayer::with_status_code(
            axum::http::StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ))
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .layer(tower_http::compression::CompressionLayer::new())
        .with_state(Arc::new(state))
}
