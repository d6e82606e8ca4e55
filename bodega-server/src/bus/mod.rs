//! Change Propagator - realtime fan-out of catalog and order mutations
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │                  ChangeBus                   │
//! │  sequence counter (commit lock)              │
//! │  ┌────────────────────────────────────────┐  │
//! │  │ broadcast::Sender<ChangeEvent> catalog │  │
//! │  │ broadcast::Sender<ChangeEvent> orders  │  │
//! │  └────────────────────────────────────────┘  │
//! └───────────────┬──────────────────────────────┘
//!                 │
//!      ┌──────────┼──────────────┐
//!      ▼          ▼              ▼
//!  admin (all) admin (all)  customer (own orders)
//! ```
//!
//! Admin sessions subscribe to both topics unfiltered; customer sessions
//! subscribe to `orders` filtered to their own identity. Each subscriber
//! owns an independent position in the broadcast ring, so one slow client
//! never stalls the bus for others.

mod propagator;
mod subscription;

pub use propagator::ChangeBus;
pub use subscription::{OverflowPolicy, Subscription, SubscriptionFilter};
