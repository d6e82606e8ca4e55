//! Catalog management
//!
//! CRUD over the shared item map, with every accepted mutation fanned out
//! on the `catalog` topic. Quantity is also mutated concurrently by the
//! stock ledger; both surfaces go through the same `DashMap` entry locks.

mod service;

pub use service::{CatalogService, ItemMap, LOW_STOCK_THRESHOLD};
