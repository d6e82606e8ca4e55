//! Shared types for the bodega storefront
//!
//! These types are shared between the server and its clients (admin console,
//! customer sessions, tests):
//!
//! - **Models** (`models`): catalog items, orders, actors
//! - **Change events** (`event`): the closed set of mutation events carried
//!   by the realtime bus
//! - **Sync** (`sync`): sequence-numbered idempotent merge for subscriber
//!   local views
//! - **Errors** (`error`): the unified error taxonomy

pub mod error;
pub mod event;
pub mod models;
pub mod sync;
pub mod types;

pub use error::{StoreError, StoreResult};
pub use event::{ChangeEvent, ChangePayload, Topic};
pub use models::{
    Actor, CatalogItem, CatalogItemCreate, CatalogItemUpdate, DeliveryMode, LineItem,
    LineItemInput, OfferWindow, Order, OrderCreate, OrderStatus, PaymentMethod, Role,
};
pub use sync::{StoreView, VersionedMap};
pub use types::Timestamp;

/// Current timestamp in Unix milliseconds
pub fn now_millis() -> Timestamp {
    chrono::Utc::now().timestamp_millis()
}
