//! AutoFollow HTTP and realtime surface.
//!
//! - REST API under `/api` with `{success, message, data}` envelopes
//! - Dashboard WebSocket at `/ws` with topic subscriptions
//! - Relay listener feeding driver events into the followup engine
//!
//! The binary in `main.rs` wires the production collaborators; tests build
//! the same router over an in-memory database and relay bus.

pub mod config;
pub mod error;
pub mod identity;
pub mod realtime;
pub mod response;
pub mod routes;
pub mod state;

pub use config::{ClerkConfig, Config, ConfigError, LogFormat};
pub use error::ApiError;
pub use identity::{ClerkIdentity, IdentityError, IdentityProvider, LocalIdentity};
pub use realtime::RealtimeHub;
pub use response::ApiResponse;
pub use state::AppState;

use axum::http::HeaderValue;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Build the application with CORS and request tracing.
pub fn app(state: AppState, cors_origins: Option<&str>) -> Router {
    routes::router()
        .layer(cors_layer(cors_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Restrict origins to the comma-separated list, or allow any when unset.
fn cors_layer(origins: Option<&str>) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .unwrap_or_default()
        .split(',')
        .filter_map(|s| s.trim().parse().ok())
        .collect();

    let cors = CorsLayer::new().allow_headers(Any).allow_methods(Any);
    if allowed.is_empty() {
        cors.allow_origin(Any)
    } else {
        cors.allow_origin(allowed)
    }
}
