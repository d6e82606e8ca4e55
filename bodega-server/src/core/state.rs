//! Server state - shared service references
//!
//! `ServerState` holds shared references to every service. Cloning is an
//! `Arc` shallow copy, so it travels freely through axum handlers.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;

use crate::bus::ChangeBus;
use crate::catalog::{CatalogService, ItemMap};
use crate::core::Config;
use crate::notify::{LogNotifier, Notifier};
use crate::orders::OrdersManager;
use crate::stock::StockLedger;

/// Shared service state
#[derive(Debug, Clone)]
pub struct ServerState {
    pub config: Config,
    pub bus: ChangeBus,
    pub catalog: Arc<CatalogService>,
    pub ledger: Arc<StockLedger>,
    pub orders: Arc<OrdersManager>,
}

impl ServerState {
    /// Wire up the full service graph from configuration, using the
    /// log-backed notifier
    pub fn initialize(config: &Config) -> Self {
        Self::with_notifier(config, Arc::new(LogNotifier))
    }

    /// Wire up the service graph with a custom notification collaborator
    pub fn with_notifier(config: &Config, notifier: Arc<dyn Notifier>) -> Self {
        let items: ItemMap = Arc::new(DashMap::new());
        let bus = ChangeBus::with_capacity(config.bus_channel_capacity);
        let catalog = Arc::new(CatalogService::new(items.clone(), bus.clone()));
        let ledger = StockLedger::new(items.clone(), bus.clone());
        let orders = Arc::new(OrdersManager::new(
            items,
            ledger.clone(),
            bus.clone(),
            notifier,
            config.delivery_fee_cents,
            Duration::from_millis(config.reserve_timeout_ms),
        ));
        Self {
            config: config.clone(),
            bus,
            catalog,
            ledger: Arc::new(ledger),
            orders,
        }
    }
}
