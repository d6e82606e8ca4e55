//! Offer pricing
//!
//! Pure resolution of the effective unit price for a catalog item at a
//! point in time. No side effects; stock is never consulted here.

mod resolver;

pub use resolver::{resolve_price, window_contains};
