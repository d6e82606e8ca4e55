//! API routes
//!
//! # Structure
//!
//! - [`health`] - liveness check
//! - [`catalog`] - catalog item management
//! - [`orders`] - checkout, listing, transitions, deletion
//! - [`events`] - realtime change feeds over SSE
//!
//! The actor behind every request is materialized from headers by
//! [`actor::CurrentActor`]; real session issuance is an external
//! collaborator.

pub mod actor;
pub mod catalog;
pub mod events;
pub mod health;
pub mod orders;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::core::ServerState;

/// Assemble the full application router
pub fn router(state: ServerState) -> Router {
    Router::new()
        .merge(health::router())
        .merge(catalog::router())
        .merge(orders::router())
        .merge(events::router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
