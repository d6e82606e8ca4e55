//! Subscriber side of the change bus
//!
//! Each subscription owns an independent position in its topic's broadcast
//! ring. Delivery is at-least-once; when a subscriber falls further behind
//! than the ring holds, the configured [`OverflowPolicy`] decides between
//! skipping the lost prefix (drop-oldest) and terminating the subscription
//! (disconnect-on-overflow, surfaced as a transport error).

use shared::error::{StoreError, StoreResult};
use shared::event::ChangeEvent;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;

/// What to do when a subscriber overflows its ring position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverflowPolicy {
    /// Skip the lost events and continue from the oldest retained one.
    /// Safe because subscribers merge idempotently by sequence number and
    /// full entities travel on every event.
    #[default]
    DropOldest,
    /// End the subscription with [`StoreError::Transport`]; the session
    /// must resubscribe and rebuild its view.
    Disconnect,
}

/// Which events a subscription delivers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubscriptionFilter {
    /// Everything on the topic (admin sessions)
    All,
    /// Only events owned by this customer (customer order feeds)
    Customer(String),
}

impl SubscriptionFilter {
    fn matches(&self, event: &ChangeEvent) -> bool {
        match self {
            SubscriptionFilter::All => true,
            SubscriptionFilter::Customer(customer_id) => {
                event.payload.customer_id() == Some(customer_id.as_str())
            }
        }
    }
}

/// A session's live position in one topic's event stream
#[derive(Debug)]
pub struct Subscription {
    rx: broadcast::Receiver<ChangeEvent>,
    filter: SubscriptionFilter,
    policy: OverflowPolicy,
}

impl Subscription {
    pub(super) fn new(
        rx: broadcast::Receiver<ChangeEvent>,
        filter: SubscriptionFilter,
        policy: OverflowPolicy,
    ) -> Self {
        Self { rx, filter, policy }
    }

    /// Receive the next matching event.
    ///
    /// Returns [`StoreError::Transport`] when the subscription ends: the
    /// bus was dropped, or this subscriber overflowed under the
    /// [`OverflowPolicy::Disconnect`] policy. Other subscribers are
    /// unaffected either way.
    pub async fn recv(&mut self) -> StoreResult<ChangeEvent> {
        loop {
            match self.rx.recv().await {
                Ok(event) => {
                    if self.filter.matches(&event) {
                        return Ok(event);
                    }
                }
                Err(RecvError::Lagged(missed)) => match self.policy {
                    OverflowPolicy::DropOldest => {
                        tracing::warn!(missed, "slow subscriber skipped events");
                    }
                    OverflowPolicy::Disconnect => {
                        return Err(StoreError::Transport(format!(
                            "subscriber overflowed, {missed} event(s) lost"
                        )));
                    }
                },
                Err(RecvError::Closed) => {
                    return Err(StoreError::Transport("bus closed".into()));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::ChangeBus;
    use shared::event::ChangePayload;

    fn publish_n(bus: &ChangeBus, n: usize) {
        for i in 0..n {
            bus.publish(ChangePayload::CatalogDeleted {
                item_id: format!("item-{i}"),
            });
        }
    }

    #[tokio::test]
    async fn drop_oldest_skips_and_continues() {
        let bus = ChangeBus::with_capacity(4);
        let mut sub = bus.subscribe_catalog(OverflowPolicy::DropOldest);

        // Overflow the ring while the subscriber is idle.
        publish_n(&bus, 16);

        // The subscriber recovers on the retained suffix and keeps going.
        let event = sub.recv().await.unwrap();
        assert!(event.sequence > 1);
        while let Ok(next) =
            tokio::time::timeout(std::time::Duration::from_millis(20), sub.recv()).await
        {
            next.unwrap();
        }
    }

    #[tokio::test]
    async fn disconnect_policy_surfaces_transport_error() {
        let bus = ChangeBus::with_capacity(4);
        let mut sub = bus.subscribe_catalog(OverflowPolicy::Disconnect);

        publish_n(&bus, 16);

        let err = sub.recv().await.unwrap_err();
        assert!(matches!(err, StoreError::Transport(_)));
    }

    #[tokio::test]
    async fn bus_drop_closes_subscription() {
        let bus = ChangeBus::new();
        let mut sub = bus.subscribe_catalog(OverflowPolicy::DropOldest);
        drop(bus);
        let err = sub.recv().await.unwrap_err();
        assert!(matches!(err, StoreError::Transport(_)));
    }
}
