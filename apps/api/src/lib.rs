//! # Apotheca API
//!
//! REST front end for the pharmacy POS backend.
//!
//! ## Request Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  HTTP ──► TraceLayer ──► CorsLayer ──► Router ──► handler               │
//! │                                                     │                   │
//! │                                                     ▼                   │
//! │                                          apotheca-db repository         │
//! │                                          (one transaction per write)    │
//! │                                                     │                   │
//! │  JSON ◄── ApiError / body ◄─────────────────────────┘                   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The binary in `main.rs` only loads configuration, opens the database
//! and serves [`router`]. Integration tests drive the same router.

pub mod config;
pub mod error;
pub mod routes;

use axum::http::Request;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use apotheca_db::Database;

/// Shared application state. `Database` is a pool handle and cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
}

impl AppState {
    pub fn new(db: Database) -> Self {
        AppState { db }
    }
}

/// Build the full application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(routes::health_routes())
        .nest("/api", routes::api_routes())
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<_>| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                )
            }),
        )
        .with_state(state)
}
