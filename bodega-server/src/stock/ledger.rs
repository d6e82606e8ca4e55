//! Atomic stock reservation
//!
//! `reserve` performs a single guarded conditional decrement under the item
//! entry's lock: the availability check and the decrement happen inside one
//! critical section, so two simultaneous reservations of the last unit can
//! never both succeed. A plain read-then-write would admit exactly that
//! oversell race.
//!
//! `release` is the symmetric guarded increment; order cancellation calls
//! it for every line to restore stock.

use shared::error::{StoreError, StoreResult};
use shared::event::ChangePayload;

use crate::bus::ChangeBus;
use crate::catalog::ItemMap;

/// Stock reservation surface over the shared item map
#[derive(Debug, Clone)]
pub struct StockLedger {
    items: ItemMap,
    bus: ChangeBus,
}

impl StockLedger {
    pub fn new(items: ItemMap, bus: ChangeBus) -> Self {
        Self { items, bus }
    }

    /// Reserve `quantity` units of an item.
    ///
    /// On success the new available quantity is returned and broadcast as a
    /// catalog update. On shortfall nothing changes and the error names the
    /// quantity actually available, so the caller can offer a reduced
    /// quantity instead of failing outright.
    ///
    /// Once submitted the call runs to completion; it is not cancellable.
    pub async fn reserve(&self, item_id: &str, quantity: u32) -> StoreResult<u32> {
        if quantity == 0 {
            return Err(StoreError::validation("reservation quantity must be positive"));
        }
        let mut entry = self
            .items
            .get_mut(item_id)
            .ok_or_else(|| StoreError::not_found(format!("catalog item {item_id}")))?;

        if entry.quantity < quantity {
            let available = entry.quantity;
            return Err(StoreError::OutOfStock {
                item_id: item_id.to_string(),
                requested: quantity,
                available,
            });
        }

        entry.quantity -= quantity;
        let item = entry.value().clone();
        // Publish before releasing the entry lock so per-item event order
        // matches commit order.
        self.bus
            .publish(ChangePayload::CatalogUpdated { item: item.clone() });
        drop(entry);

        tracing::debug!(item_id, quantity, remaining = item.quantity, "stock reserved");
        Ok(item.quantity)
    }

    /// Release a previous reservation, restoring `quantity` units.
    ///
    /// Tolerates the item having been deleted since the reservation (the
    /// release is then a no-op); an order cancellation must not fail
    /// because an admin removed the product in the meantime.
    pub async fn release(&self, item_id: &str, quantity: u32) -> StoreResult<()> {
        if quantity == 0 {
            return Err(StoreError::validation("release quantity must be positive"));
        }
        let Some(mut entry) = self.items.get_mut(item_id) else {
            tracing::warn!(item_id, quantity, "release on deleted item, stock not restored");
            return Ok(());
        };

        entry.quantity = entry.quantity.saturating_add(quantity);
        let item = entry.value().clone();
        self.bus
            .publish(ChangePayload::CatalogUpdated { item: item.clone() });
        drop(entry);

        tracing::debug!(item_id, quantity, available = item.quantity, "stock released");
        Ok(())
    }
}
