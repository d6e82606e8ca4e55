//! Stock Ledger
//!
//! Arbitrates concurrent reservation requests so total reservations never
//! exceed available quantity. This is the only place in the system that
//! needs true mutual exclusion.

mod ledger;

pub use ledger::StockLedger;
