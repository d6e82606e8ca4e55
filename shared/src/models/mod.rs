//! Domain models shared between server and clients

mod actor;
mod catalog_item;
mod order;

pub use actor::{Actor, Role};
pub use catalog_item::{CatalogItem, CatalogItemCreate, CatalogItemUpdate, OfferWindow};
pub use order::{
    DeliveryMode, LineItem, LineItemInput, Order, OrderCreate, OrderStatus, PaymentMethod,
};
