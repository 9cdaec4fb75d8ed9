//! Loopcast Server Library
//!
//! Looping ICY audio streaming server: every `/stream` client gets its own
//! walk through the catalog, transcoded on the fly when needed.
//!
//! This library exposes the router and configuration for testing purposes.

pub mod api;
pub mod config;
pub mod error;
pub mod state;

// Re-export commonly used types for convenience
pub use config::ServerConfig;
pub use error::{Result, ServerError};
pub use state::AppState;

use axum::{routing::get, Router};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, TraceLayer},
};

/// Build the HTTP router
pub fn create_router(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(api::index::index))
        .route("/stream", get(api::stream::stream))
        .route("/status", get(api::status::status))
        .route("/playlist", get(api::playlist::playlist))
        .route("/health", get(api::health::health))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::default().include_headers(true)),
        )
        .layer(CorsLayer::permissive())
        .with_state(app_state)
}
