//! Realtime event feed module

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/events/catalog", get(handler::catalog_stream))
        .route("/api/events/orders", get(handler::orders_stream))
}
