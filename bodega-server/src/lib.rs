//! Bodega Server - storefront order and realtime sync core
//!
//! # Module structure
//!
//! ```text
//! bodega-server/src/
//! ├── core/      # Config, state, HTTP server
//! ├── pricing/   # Offer pricing resolver
//! ├── catalog/   # Catalog CRUD over the shared item map
//! ├── stock/     # Stock ledger (atomic reservations)
//! ├── cart/      # Session-scoped cart aggregator
//! ├── orders/    # Order state machine and manager
//! ├── bus/       # Change propagator (realtime fan-out)
//! ├── notify/    # Outbound notification seam
//! ├── api/       # HTTP routes and handlers
//! └── utils/     # Logging, validation helpers
//! ```
//!
//! The only cross-session mutual exclusion lives in the stock ledger's
//! guarded quantity update; everything else is session-local state or
//! last-writer-wins.

pub mod api;
pub mod bus;
pub mod cart;
pub mod catalog;
pub mod core;
pub mod notify;
pub mod orders;
pub mod pricing;
pub mod stock;
pub mod utils;

pub use bus::{ChangeBus, OverflowPolicy, Subscription};
pub use cart::Cart;
pub use catalog::CatalogService;
pub use core::{Config, Server, ServerState};
pub use notify::{LogNotifier, Notifier};
pub use orders::OrdersManager;
pub use stock::StockLedger;
pub use utils::logger::init_logger;
