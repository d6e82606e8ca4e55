//! Cart Aggregator
//!
//! A cart is session-scoped state owned exclusively by the session's task:
//! it is never persisted, never shared across sessions, and is discarded
//! after checkout or session end. Entries freeze their unit price at the
//! moment they are added (or re-added); the price is *not* refreshed when
//! an offer window later closes while the item sits in the cart. Stock is
//! only authoritative at reservation time, so `add` merely warns when the
//! requested quantity exceeds the last-known availability.

use chrono::NaiveTime;
use shared::error::{StoreError, StoreResult};
use shared::models::{CatalogItem, DeliveryMode, LineItemInput};

use crate::pricing::resolve_price;
use crate::utils::validation::validate_positive_quantity;

/// One selected item with its price frozen at selection time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartEntry {
    pub item_id: String,
    pub name: String,
    /// Unit price in cents, frozen when the entry was added or last re-added
    pub unit_price: i64,
    pub quantity: u32,
    /// Availability seen at add time; display-only, not authoritative
    pub last_known_stock: u32,
}

impl CartEntry {
    pub fn line_total(&self) -> i64 {
        self.unit_price * i64::from(self.quantity)
    }
}

/// Warning returned when a cart quantity exceeds last-known stock
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockWarning {
    pub item_id: String,
    pub requested: u32,
    pub available: u32,
}

/// Per-session cart
#[derive(Debug, Clone)]
pub struct Cart {
    customer_id: String,
    delivery_mode: DeliveryMode,
    /// Fixed surcharge in cents applied when mode is `DELIVERY`
    delivery_fee: i64,
    entries: Vec<CartEntry>,
}

impl Cart {
    pub fn new(customer_id: impl Into<String>, delivery_fee: i64) -> Self {
        Self {
            customer_id: customer_id.into(),
            delivery_mode: DeliveryMode::Delivery,
            delivery_fee,
            entries: Vec::new(),
        }
    }

    pub fn customer_id(&self) -> &str {
        &self.customer_id
    }

    pub fn delivery_mode(&self) -> DeliveryMode {
        self.delivery_mode
    }

    pub fn set_delivery_mode(&mut self, mode: DeliveryMode) {
        self.delivery_mode = mode;
    }

    pub fn entries(&self) -> &[CartEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Add `quantity` units of `item`, re-pricing the entry through the
    /// offer resolver at time-of-day `at`. Re-adding an item accumulates
    /// quantity and re-freezes the unit price at the current resolution.
    ///
    /// Returns a [`StockWarning`] when the accumulated quantity exceeds the
    /// item's last-known availability; the add still succeeds, since stock
    /// is only arbitrated at reservation time.
    pub fn add(
        &mut self,
        item: &CatalogItem,
        quantity: u32,
        at: NaiveTime,
    ) -> StoreResult<Option<StockWarning>> {
        validate_positive_quantity(quantity, "quantity")?;
        let unit_price = resolve_price(item, at);

        let total_quantity = match self.entries.iter_mut().find(|e| e.item_id == item.id) {
            Some(existing) => {
                existing.quantity += quantity;
                existing.unit_price = unit_price;
                existing.name = item.name.clone();
                existing.last_known_stock = item.quantity;
                existing.quantity
            }
            None => {
                self.entries.push(CartEntry {
                    item_id: item.id.clone(),
                    name: item.name.clone(),
                    unit_price,
                    quantity,
                    last_known_stock: item.quantity,
                });
                quantity
            }
        };

        if total_quantity > item.quantity {
            Ok(Some(StockWarning {
                item_id: item.id.clone(),
                requested: total_quantity,
                available: item.quantity,
            }))
        } else {
            Ok(None)
        }
    }

    /// Remove an item from the cart; removing an absent item is a no-op
    pub fn remove(&mut self, item_id: &str) {
        self.entries.retain(|entry| entry.item_id != item_id);
    }

    /// Set the quantity of an existing entry. The frozen unit price is kept;
    /// only re-adding re-prices.
    pub fn set_quantity(&mut self, item_id: &str, quantity: u32) -> StoreResult<()> {
        validate_positive_quantity(quantity, "quantity")?;
        let entry = self
            .entries
            .iter_mut()
            .find(|entry| entry.item_id == item_id)
            .ok_or_else(|| StoreError::not_found(format!("cart entry {item_id}")))?;
        entry.quantity = quantity;
        Ok(())
    }

    /// Sum of frozen line totals, in cents
    pub fn subtotal(&self) -> i64 {
        self.entries.iter().map(CartEntry::line_total).sum()
    }

    /// Delivery surcharge for the current mode, in cents
    pub fn surcharge(&self) -> i64 {
        match self.delivery_mode {
            DeliveryMode::Delivery => self.delivery_fee,
            DeliveryMode::Pickup => 0,
        }
    }

    /// Grand total: subtotal plus surcharge. Must equal the `grand_total`
    /// later recorded on the order when catalog prices have not moved in
    /// between.
    pub fn total(&self) -> i64 {
        self.subtotal() + self.surcharge()
    }

    /// The checkout line inputs for this cart
    pub fn line_inputs(&self) -> Vec<LineItemInput> {
        self.entries
            .iter()
            .map(|entry| LineItemInput {
                item_id: entry.item_id.clone(),
                quantity: entry.quantity,
            })
            .collect()
    }

    /// Discard all entries (after checkout or session end)
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
