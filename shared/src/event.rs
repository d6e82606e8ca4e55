//! Change events carried by the realtime bus
//!
//! Mutations are represented as a small closed set of tagged variants
//! (insert/update/delete per entity type) rather than open-ended dynamic
//! payloads. Every event carries a bus-assigned monotonic `sequence`;
//! subscribers merge idempotently and discard events whose sequence is not
//! newer than the locally held one (see [`crate::sync`]).

use crate::models::{CatalogItem, Order};
use serde::{Deserialize, Serialize};

/// Bus topic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Topic {
    /// All mutations to catalog items
    Catalog,
    /// All mutations to orders
    Orders,
}

impl std::fmt::Display for Topic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Topic::Catalog => write!(f, "catalog"),
            Topic::Orders => write!(f, "orders"),
        }
    }
}

/// Event payload variants
///
/// Delete variants carry the ids needed for subscriber-side filtering and
/// merging; full entities travel on insert/update so subscribers never need
/// a read-back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChangePayload {
    CatalogInserted { item: CatalogItem },
    CatalogUpdated { item: CatalogItem },
    CatalogDeleted { item_id: String },
    OrderInserted { order: Order },
    OrderUpdated { order: Order },
    OrderDeleted { order_id: String, customer_id: String },
}

impl ChangePayload {
    /// The topic this payload belongs to
    pub fn topic(&self) -> Topic {
        match self {
            ChangePayload::CatalogInserted { .. }
            | ChangePayload::CatalogUpdated { .. }
            | ChangePayload::CatalogDeleted { .. } => Topic::Catalog,
            ChangePayload::OrderInserted { .. }
            | ChangePayload::OrderUpdated { .. }
            | ChangePayload::OrderDeleted { .. } => Topic::Orders,
        }
    }

    /// Identity of the mutated entity
    pub fn entity_id(&self) -> &str {
        match self {
            ChangePayload::CatalogInserted { item } | ChangePayload::CatalogUpdated { item } => {
                &item.id
            }
            ChangePayload::CatalogDeleted { item_id } => item_id,
            ChangePayload::OrderInserted { order } | ChangePayload::OrderUpdated { order } => {
                &order.id
            }
            ChangePayload::OrderDeleted { order_id, .. } => order_id,
        }
    }

    /// The owning customer, for order events; catalog events have no owner
    pub fn customer_id(&self) -> Option<&str> {
        match self {
            ChangePayload::OrderInserted { order } | ChangePayload::OrderUpdated { order } => {
                Some(&order.customer_id)
            }
            ChangePayload::OrderDeleted { customer_id, .. } => Some(customer_id),
            _ => None,
        }
    }
}

/// A single mutation event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeEvent {
    /// Event unique ID
    pub event_id: String,
    /// Bus-assigned monotonic sequence number; the authoritative ordering
    /// mechanism for subscriber merges
    pub sequence: u64,
    /// Server timestamp (Unix millis)
    pub timestamp: i64,
    pub payload: ChangePayload,
}

impl ChangeEvent {
    pub fn new(sequence: u64, payload: ChangePayload) -> Self {
        Self {
            event_id: uuid::Uuid::new_v4().to_string(),
            sequence,
            timestamp: crate::now_millis(),
            payload,
        }
    }

    pub fn topic(&self) -> Topic {
        self.payload.topic()
    }
}
