//! Server configuration
//!
//! All configuration items can be overridden through environment variables:
//!
//! | Env var               | Default | Description                           |
//! |-----------------------|---------|---------------------------------------|
//! | HTTP_PORT             | 3000    | HTTP API port                         |
//! | ENVIRONMENT           | development | Runtime environment               |
//! | DELIVERY_FEE_CENTS    | 200     | Fixed delivery surcharge (cents)      |
//! | BUS_CHANNEL_CAPACITY  | 1024    | Per-topic broadcast ring capacity     |
//! | RESERVE_TIMEOUT_MS    | 5000    | Bound on a single stock reservation   |
//!
//! # Example
//!
//! ```ignore
//! HTTP_PORT=8080 DELIVERY_FEE_CENTS=300 cargo run
//! ```

/// Server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP API port
    pub http_port: u16,
    /// Runtime environment: development | staging | production
    pub environment: String,
    /// Fixed delivery surcharge in cents, applied when an order's delivery
    /// mode is `DELIVERY`
    pub delivery_fee_cents: i64,
    /// Capacity of each bus topic's broadcast ring
    pub bus_channel_capacity: usize,
    /// Bound on each stock reservation call, in milliseconds
    pub reserve_timeout_ms: u64,
}

impl Config {
    /// Load configuration from environment variables, falling back to the
    /// defaults above
    pub fn from_env() -> Self {
        Self {
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            delivery_fee_cents: std::env::var("DELIVERY_FEE_CENTS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(200),
            bus_channel_capacity: std::env::var("BUS_CHANNEL_CAPACITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1024),
            reserve_timeout_ms: std::env::var("RESERVE_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5000),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            http_port: 3000,
            environment: "development".into(),
            delivery_fee_cents: 200,
            bus_channel_capacity: 1024,
            reserve_timeout_ms: 5000,
        }
    }
}
