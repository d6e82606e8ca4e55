//! Unified error taxonomy for the storefront core
//!
//! Every mutation entry point validates and fails fast before touching the
//! stock ledger or the order map, so a returned error implies no partial
//! state change.
//!
//! # Recovery semantics
//!
//! - [`StoreError::OutOfStock`] / [`StoreError::CheckoutRejected`]: the
//!   caller may retry with a reduced quantity
//! - [`StoreError::InvalidTransition`]: not retried, surfaced to the actor
//! - [`StoreError::Validation`]: rejected before any state mutation
//! - [`StoreError::Transport`]: the subscriber is dropped and must
//!   resubscribe; other subscribers are unaffected

use crate::models::OrderStatus;
use axum::Json;
use axum::response::{IntoResponse, Response};
use http::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single line item that could not be reserved at checkout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shortage {
    pub item_id: String,
    pub name: String,
    pub requested: u32,
    pub available: u32,
}

/// Application error for the storefront core
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// Reservation shortfall on a single item
    #[error("insufficient stock for {item_id}: requested {requested}, available {available}")]
    OutOfStock {
        item_id: String,
        requested: u32,
        available: u32,
    },

    /// Checkout aborted; names every item lacking stock
    #[error("checkout rejected: {} item(s) lack sufficient stock", .shortages.len())]
    CheckoutRejected { shortages: Vec<Shortage> },

    /// Attempted status change not permitted from the current state
    #[error("invalid transition: {from} -> {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    /// Input rejected before any state mutation
    #[error("{0}")]
    Validation(String),

    /// Entity lookup failure
    #[error("{0} not found")]
    NotFound(String),

    /// Actor lacks permission for the operation
    #[error("{0}")]
    Forbidden(String),

    /// Subscriber delivery failure; the subscription is terminated
    #[error("transport failure: {0}")]
    Transport(String),

    /// Unexpected internal failure
    #[error("{0}")]
    Internal(String),
}

impl StoreError {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a not found error
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound(resource.into())
    }

    /// Create a permission denied error
    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Stable machine-readable code for API clients
    pub fn code(&self) -> &'static str {
        match self {
            Self::OutOfStock { .. } => "OUT_OF_STOCK",
            Self::CheckoutRejected { .. } => "CHECKOUT_REJECTED",
            Self::InvalidTransition { .. } => "INVALID_TRANSITION",
            Self::Validation(_) => "VALIDATION_FAILED",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::Transport(_) => "TRANSPORT_FAILURE",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Get the HTTP status code for this error
    pub fn http_status(&self) -> StatusCode {
        match self {
            Self::OutOfStock { .. } | Self::CheckoutRejected { .. } => StatusCode::CONFLICT,
            Self::InvalidTransition { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Transport(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// JSON error body returned by the HTTP API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
    /// Present only for checkout rejections: the items lacking stock
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shortages: Option<Vec<Shortage>>,
}

impl IntoResponse for StoreError {
    fn into_response(self) -> Response {
        let shortages = match &self {
            Self::CheckoutRejected { shortages } => Some(shortages.clone()),
            _ => None,
        };
        let body = ErrorBody {
            code: self.code().to_string(),
            message: self.to_string(),
            shortages,
        };
        (self.http_status(), Json(body)).into_response()
    }
}

/// Result alias for the storefront core
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_status_mapping() {
        assert_eq!(
            StoreError::validation("bad").http_status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            StoreError::not_found("order x").http_status(),
            StatusCode::NOT_FOUND
        );
        let err = StoreError::OutOfStock {
            item_id: "item-1".into(),
            requested: 3,
            available: 1,
        };
        assert_eq!(err.http_status(), StatusCode::CONFLICT);
        assert_eq!(err.code(), "OUT_OF_STOCK");
    }

    #[test]
    fn invalid_transition_message_names_both_states() {
        let err = StoreError::InvalidTransition {
            from: OrderStatus::Fulfilled,
            to: OrderStatus::Paid,
        };
        assert_eq!(err.to_string(), "invalid transition: FULFILLED -> PAID");
    }
}
