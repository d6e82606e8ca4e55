//! Change bus core

use std::sync::Arc;

use parking_lot::Mutex;
use shared::event::{ChangeEvent, ChangePayload, Topic};
use tokio::sync::broadcast;

use super::{OverflowPolicy, Subscription, SubscriptionFilter};

/// Default capacity of each topic's broadcast ring
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1024;

#[derive(Debug)]
struct BusInner {
    catalog_tx: broadcast::Sender<ChangeEvent>,
    orders_tx: broadcast::Sender<ChangeEvent>,
    /// Guards sequence assignment *and* send, so publication order equals
    /// commit order and per-entity delivery matches the invariant in the
    /// module docs.
    commit: Mutex<u64>,
}

/// Fan-out bus for catalog and order mutations
#[derive(Debug, Clone)]
pub struct ChangeBus {
    inner: Arc<BusInner>,
}

impl ChangeBus {
    /// Create a bus with the default ring capacity
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Create a bus with the given per-topic ring capacity
    pub fn with_capacity(capacity: usize) -> Self {
        let (catalog_tx, _) = broadcast::channel(capacity);
        let (orders_tx, _) = broadcast::channel(capacity);
        Self {
            inner: Arc::new(BusInner {
                catalog_tx,
                orders_tx,
                commit: Mutex::new(0),
            }),
        }
    }

    /// Publish a mutation. Assigns the next sequence number and fans the
    /// event out to the payload's topic. Never fails: a topic with no
    /// subscribers simply drops the event, and slow subscribers are handled
    /// on their own receiving side.
    pub fn publish(&self, payload: ChangePayload) -> ChangeEvent {
        let mut sequence = self.inner.commit.lock();
        *sequence += 1;
        let event = ChangeEvent::new(*sequence, payload);
        let tx = match event.topic() {
            Topic::Catalog => &self.inner.catalog_tx,
            Topic::Orders => &self.inner.orders_tx,
        };
        if let Err(err) = tx.send(event.clone()) {
            // No receivers on the topic; nothing to deliver.
            tracing::trace!(topic = %event.topic(), "no subscribers: {err}");
        }
        event
    }

    /// Subscribe to the full catalog feed
    pub fn subscribe_catalog(&self, policy: OverflowPolicy) -> Subscription {
        Subscription::new(
            self.inner.catalog_tx.subscribe(),
            SubscriptionFilter::All,
            policy,
        )
    }

    /// Subscribe to every order's feed (admin sessions)
    pub fn subscribe_orders_all(&self, policy: OverflowPolicy) -> Subscription {
        Subscription::new(
            self.inner.orders_tx.subscribe(),
            SubscriptionFilter::All,
            policy,
        )
    }

    /// Subscribe to a single customer's own order feed. Events owned by any
    /// other customer are filtered out before delivery.
    pub fn subscribe_orders(&self, customer_id: &str, policy: OverflowPolicy) -> Subscription {
        Subscription::new(
            self.inner.orders_tx.subscribe(),
            SubscriptionFilter::Customer(customer_id.to_string()),
            policy,
        )
    }

    /// Last committed sequence number
    pub fn last_sequence(&self) -> u64 {
        *self.inner.commit.lock()
    }
}

impl Default for ChangeBus {
    fn default() -> Self {
        Self::new()
    }
}
