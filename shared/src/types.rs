//! Common types for the shared crate

/// Timestamp type (Unix milliseconds)
pub type Timestamp = i64;

/// Money type (currency minor units, e.g. cents)
pub type Cents = i64;
