//! OrdersManager - checkout orchestration and status transitions
//!
//! # Checkout flow
//!
//! ```text
//! checkout(customer, payload)
//!     ├─ 1. Validate payload (fail fast, no state touched)
//!     ├─ 2. Snapshot line items; resolve prices at submission time
//!     ├─ 3. Reserve every line in the stock ledger
//!     │      └─ any shortage → release taken reservations,
//!     │         reject naming every failing item
//!     ├─ 4. Create the order in `pending`
//!     └─ 5. Broadcast OrderInserted
//! ```
//!
//! Cancellation releases every line's reservation. Deletion is an
//! administrative purge: allowed from any state, removes the record, does
//! not restore stock.

use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use dashmap::DashMap;
use shared::error::{Shortage, StoreError, StoreResult};
use shared::event::ChangePayload;
use shared::models::{Actor, DeliveryMode, LineItem, Order, OrderCreate, OrderStatus, PaymentMethod};

use crate::bus::ChangeBus;
use crate::catalog::ItemMap;
use crate::notify::Notifier;
use crate::pricing::resolve_price;
use crate::stock::StockLedger;
use crate::utils::validation::{
    MAX_ADDRESS_LEN, MAX_NAME_LEN, MAX_SHORT_TEXT_LEN, MAX_URL_LEN, validate_optional_text,
    validate_positive_quantity, validate_required_text,
};

/// Order lifecycle manager
pub struct OrdersManager {
    orders: DashMap<String, Order>,
    items: ItemMap,
    ledger: StockLedger,
    bus: ChangeBus,
    notifier: Arc<dyn Notifier>,
    /// Fixed delivery surcharge in cents
    delivery_fee: i64,
    /// Bound on each reservation call; elapsed means failed, never retried
    reserve_timeout: Duration,
}

impl std::fmt::Debug for OrdersManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrdersManager")
            .field("orders", &self.orders.len())
            .field("delivery_fee", &self.delivery_fee)
            .finish()
    }
}

impl OrdersManager {
    pub fn new(
        items: ItemMap,
        ledger: StockLedger,
        bus: ChangeBus,
        notifier: Arc<dyn Notifier>,
        delivery_fee: i64,
        reserve_timeout: Duration,
    ) -> Self {
        Self {
            orders: DashMap::new(),
            items,
            ledger,
            bus,
            notifier,
            delivery_fee,
            reserve_timeout,
        }
    }

    /// Create an order for `customer_id` from the submitted lines.
    ///
    /// Prices are resolved at submission time (the cart's frozen prices are
    /// session display state). The order is created only when every line
    /// reserves successfully; otherwise nothing changes and the rejection
    /// names each item lacking stock together with what is available.
    pub async fn checkout(&self, customer_id: &str, payload: OrderCreate) -> StoreResult<Order> {
        self.validate_checkout(customer_id, &payload)?;

        // Snapshot names and prices before touching the ledger, so an
        // unknown item rejects the whole checkout with no side effects.
        let at = Local::now().time();
        let mut lines = Vec::with_capacity(payload.items.len());
        for input in &payload.items {
            let item = self
                .items
                .get(&input.item_id)
                .map(|entry| entry.value().clone())
                .ok_or_else(|| StoreError::not_found(format!("catalog item {}", input.item_id)))?;
            lines.push(LineItem {
                item_id: item.id.clone(),
                name: item.name.clone(),
                unit_price: resolve_price(&item, at),
                quantity: input.quantity,
            });
        }

        // Reserve every line, collecting shortages instead of stopping at
        // the first, so the session can adjust its whole cart in one round.
        let mut reserved: Vec<(String, u32)> = Vec::new();
        let mut shortages: Vec<Shortage> = Vec::new();
        for line in &lines {
            let outcome =
                tokio::time::timeout(self.reserve_timeout, self.ledger.reserve(&line.item_id, line.quantity))
                    .await;
            match outcome {
                Ok(Ok(_remaining)) => reserved.push((line.item_id.clone(), line.quantity)),
                Ok(Err(StoreError::OutOfStock {
                    requested,
                    available,
                    ..
                })) => shortages.push(Shortage {
                    item_id: line.item_id.clone(),
                    name: line.name.clone(),
                    requested,
                    available,
                }),
                Ok(Err(err)) => {
                    self.release_all(&reserved).await;
                    return Err(err);
                }
                Err(_elapsed) => {
                    self.release_all(&reserved).await;
                    return Err(StoreError::internal(format!(
                        "stock reservation for {} timed out",
                        line.item_id
                    )));
                }
            }
        }
        if !shortages.is_empty() {
            self.release_all(&reserved).await;
            return Err(StoreError::CheckoutRejected { shortages });
        }

        let grand_total: i64 = lines.iter().map(LineItem::line_total).sum::<i64>()
            + match payload.delivery_mode {
                DeliveryMode::Delivery => self.delivery_fee,
                DeliveryMode::Pickup => 0,
            };

        let order = Order {
            id: uuid::Uuid::new_v4().to_string(),
            created_at: shared::now_millis(),
            customer_id: customer_id.to_string(),
            customer_name: payload.customer_name,
            customer_phone: payload.customer_phone,
            delivery_mode: payload.delivery_mode,
            address: match payload.delivery_mode {
                DeliveryMode::Delivery => payload.address,
                DeliveryMode::Pickup => None,
            },
            items: lines,
            grand_total,
            status: OrderStatus::Pending,
            payment_method: payload.payment_method,
            payment_evidence_url: payload.payment_evidence_url,
        };

        self.orders.insert(order.id.clone(), order.clone());
        self.bus.publish(ChangePayload::OrderInserted {
            order: order.clone(),
        });
        tracing::info!(
            order_id = %order.id,
            customer_id,
            grand_total,
            line_count = order.items.len(),
            "order created"
        );
        Ok(order)
    }

    fn validate_checkout(&self, customer_id: &str, payload: &OrderCreate) -> StoreResult<()> {
        validate_required_text(customer_id, "customer_id", MAX_NAME_LEN)?;
        validate_required_text(&payload.customer_name, "customer_name", MAX_NAME_LEN)?;
        validate_optional_text(
            payload.customer_phone.as_deref(),
            "customer_phone",
            MAX_SHORT_TEXT_LEN,
        )?;
        if payload.items.is_empty() {
            return Err(StoreError::validation("order must contain at least one item"));
        }
        for (index, input) in payload.items.iter().enumerate() {
            validate_positive_quantity(input.quantity, "quantity")?;
            if payload.items[..index]
                .iter()
                .any(|other| other.item_id == input.item_id)
            {
                return Err(StoreError::validation(format!(
                    "duplicate line item {}",
                    input.item_id
                )));
            }
        }
        match payload.delivery_mode {
            DeliveryMode::Delivery => {
                let address = payload.address.as_deref().unwrap_or("");
                validate_required_text(address, "address", MAX_ADDRESS_LEN)?;
            }
            DeliveryMode::Pickup => {}
        }
        if payload.payment_method == PaymentMethod::Cash
            && payload.payment_evidence_url.is_some()
        {
            return Err(StoreError::validation(
                "payment evidence is only accepted for wallet transfers",
            ));
        }
        validate_optional_text(
            payload.payment_evidence_url.as_deref(),
            "payment_evidence_url",
            MAX_URL_LEN,
        )?;
        Ok(())
    }

    async fn release_all(&self, reserved: &[(String, u32)]) {
        for (item_id, quantity) in reserved {
            if let Err(err) = self.ledger.release(item_id, *quantity).await {
                tracing::error!(item_id, quantity, %err, "failed to roll back reservation");
            }
        }
    }

    /// Move an order to `target`, enforcing the state machine and the
    /// acting role. Cancellation restores every line's stock. The owning
    /// customer is notified of the new status.
    pub async fn transition(
        &self,
        order_id: &str,
        target: OrderStatus,
        actor: &Actor,
    ) -> StoreResult<Order> {
        let order = {
            let mut entry = self
                .orders
                .get_mut(order_id)
                .ok_or_else(|| StoreError::not_found(format!("order {order_id}")))?;
            crate::orders::validate_transition(entry.status, target, actor)?;
            entry.status = target;
            let order = entry.value().clone();
            // Publish while holding the entry lock: a racing transition on
            // the same order cannot interleave its event with ours.
            self.bus.publish(ChangePayload::OrderUpdated {
                order: order.clone(),
            });
            order
        };

        if target == OrderStatus::Cancelled {
            for line in &order.items {
                if let Err(err) = self.ledger.release(&line.item_id, line.quantity).await {
                    tracing::error!(
                        order_id,
                        item_id = %line.item_id,
                        %err,
                        "failed to restore stock on cancellation"
                    );
                }
            }
        }

        tracing::info!(order_id, status = %target, actor_id = %actor.id, "order transitioned");
        self.notifier
            .notify(
                &order.customer_id,
                "Order update",
                &format!("Order {} is now {}", short_id(order_id), target),
            )
            .await;
        Ok(order)
    }

    /// Administrative purge: removes the order from any state and
    /// broadcasts the deletion. Does not restore stock; only cancellation
    /// does.
    pub fn delete(&self, order_id: &str, actor: &Actor) -> StoreResult<()> {
        if !actor.is_admin() {
            return Err(StoreError::forbidden("order deletion requires an admin actor"));
        }
        let (_, order) = self
            .orders
            .remove(order_id)
            .ok_or_else(|| StoreError::not_found(format!("order {order_id}")))?;
        self.bus.publish(ChangePayload::OrderDeleted {
            order_id: order.id.clone(),
            customer_id: order.customer_id.clone(),
        });
        tracing::info!(order_id, actor_id = %actor.id, "order deleted");
        Ok(())
    }

    pub fn get(&self, order_id: &str) -> StoreResult<Order> {
        self.orders
            .get(order_id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| StoreError::not_found(format!("order {order_id}")))
    }

    /// All orders, newest first (admin dashboard listing)
    pub fn list(&self) -> Vec<Order> {
        let mut orders: Vec<Order> = self.orders.iter().map(|entry| entry.value().clone()).collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
        orders
    }

    /// One customer's orders, newest first
    pub fn list_for_customer(&self, customer_id: &str) -> Vec<Order> {
        let mut orders: Vec<Order> = self
            .orders
            .iter()
            .filter(|entry| entry.customer_id == customer_id)
            .map(|entry| entry.value().clone())
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
        orders
    }

    /// Total sales in cents over fulfilled orders (admin dashboard stat)
    pub fn sales_total(&self) -> i64 {
        self.orders
            .iter()
            .filter(|entry| entry.status == OrderStatus::Fulfilled)
            .map(|entry| entry.grand_total)
            .sum()
    }
}

/// First id segment, for human-facing notification text
fn short_id(order_id: &str) -> &str {
    order_id.split('-').next().unwrap_or(order_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use dashmap::DashMap;
    use parking_lot::Mutex;
    use shared::models::{CatalogItem, LineItemInput};

    const DELIVERY_FEE: i64 = 200;

    #[derive(Default)]
    struct RecordingNotifier {
        sent: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn notify(&self, recipient: &str, _title: &str, body: &str) {
            self.sent.lock().push((recipient.to_string(), body.to_string()));
        }
    }

    fn item(id: &str, price: i64, quantity: u32) -> CatalogItem {
        CatalogItem {
            id: id.into(),
            name: format!("Item {id}"),
            category: "Abarrotes".into(),
            image_url: None,
            price,
            quantity,
            offer_enabled: false,
            offer_price: None,
            offer_window: None,
        }
    }

    struct Fixture {
        manager: OrdersManager,
        items: ItemMap,
        bus: ChangeBus,
        notifier: Arc<RecordingNotifier>,
    }

    fn fixture(catalog: Vec<CatalogItem>) -> Fixture {
        let items: ItemMap = Arc::new(DashMap::new());
        for item in catalog {
            items.insert(item.id.clone(), item);
        }
        let bus = ChangeBus::new();
        let ledger = StockLedger::new(items.clone(), bus.clone());
        let notifier = Arc::new(RecordingNotifier::default());
        let manager = OrdersManager::new(
            items.clone(),
            ledger,
            bus.clone(),
            notifier.clone(),
            DELIVERY_FEE,
            Duration::from_secs(5),
        );
        Fixture {
            manager,
            items,
            bus,
            notifier,
        }
    }

    fn delivery_payload(lines: Vec<LineItemInput>) -> OrderCreate {
        OrderCreate {
            customer_name: "María Quispe".into(),
            customer_phone: Some("999888777".into()),
            delivery_mode: DeliveryMode::Delivery,
            address: Some("Av. Los Próceres 123".into()),
            items: lines,
            payment_method: PaymentMethod::Cash,
            payment_evidence_url: None,
        }
    }

    fn line(item_id: &str, quantity: u32) -> LineItemInput {
        LineItemInput {
            item_id: item_id.into(),
            quantity,
        }
    }

    #[tokio::test]
    async fn checkout_reserves_stock_and_freezes_totals() {
        let fx = fixture(vec![item("a", 1000, 10), item("b", 250, 4)]);
        let order = fx
            .manager
            .checkout("cust-1", delivery_payload(vec![line("a", 2), line("b", 4)]))
            .await
            .unwrap();

        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.grand_total, 2 * 1000 + 4 * 250 + DELIVERY_FEE);
        assert_eq!(fx.items.get("a").unwrap().quantity, 8);
        assert_eq!(fx.items.get("b").unwrap().quantity, 0);
        assert_eq!(order.customer_name, "María Quispe");

        // Later catalog price changes must not touch the frozen record.
        fx.items.get_mut("a").unwrap().price = 9999;
        assert_eq!(fx.manager.get(&order.id).unwrap().items[0].unit_price, 1000);
    }

    #[tokio::test]
    async fn checkout_uses_offer_price_at_submission_time() {
        let mut offered = item("a", 1250, 10);
        offered.offer_enabled = true;
        offered.offer_price = Some(500);
        let fx = fixture(vec![offered]);

        let mut payload = delivery_payload(vec![line("a", 2)]);
        payload.delivery_mode = DeliveryMode::Pickup;
        payload.address = None;
        let order = fx.manager.checkout("cust-1", payload).await.unwrap();
        assert_eq!(order.items[0].unit_price, 500);
        assert_eq!(order.grand_total, 1000);
    }

    #[tokio::test]
    async fn checkout_names_every_shortfall_and_rolls_back() {
        let fx = fixture(vec![item("a", 1000, 10), item("b", 500, 1), item("c", 300, 0)]);
        let err = fx
            .manager
            .checkout(
                "cust-1",
                delivery_payload(vec![line("a", 2), line("b", 3), line("c", 1)]),
            )
            .await
            .unwrap_err();

        match err {
            StoreError::CheckoutRejected { shortages } => {
                assert_eq!(shortages.len(), 2);
                assert_eq!(shortages[0].item_id, "b");
                assert_eq!(shortages[0].available, 1);
                assert_eq!(shortages[1].item_id, "c");
                assert_eq!(shortages[1].available, 0);
            }
            other => panic!("expected CheckoutRejected, got {other:?}"),
        }
        // The successful reservation on "a" was rolled back; no order exists.
        assert_eq!(fx.items.get("a").unwrap().quantity, 10);
        assert_eq!(fx.items.get("b").unwrap().quantity, 1);
        assert!(fx.manager.list().is_empty());
    }

    #[tokio::test]
    async fn checkout_validates_before_touching_stock() {
        let fx = fixture(vec![item("a", 1000, 10)]);

        let empty = delivery_payload(vec![]);
        assert!(fx.manager.checkout("cust-1", empty).await.is_err());

        let mut no_address = delivery_payload(vec![line("a", 1)]);
        no_address.address = None;
        assert!(fx.manager.checkout("cust-1", no_address).await.is_err());

        let mut cash_with_evidence = delivery_payload(vec![line("a", 1)]);
        cash_with_evidence.payment_evidence_url = Some("https://example.test/v.jpg".into());
        assert!(fx.manager.checkout("cust-1", cash_with_evidence).await.is_err());

        let unknown = delivery_payload(vec![line("a", 1), line("ghost", 1)]);
        assert!(matches!(
            fx.manager.checkout("cust-1", unknown).await,
            Err(StoreError::NotFound(_))
        ));

        let duplicate = delivery_payload(vec![line("a", 1), line("a", 2)]);
        assert!(matches!(
            fx.manager.checkout("cust-1", duplicate).await,
            Err(StoreError::Validation(_))
        ));

        assert_eq!(fx.items.get("a").unwrap().quantity, 10, "no stock touched");
    }

    #[tokio::test]
    async fn wallet_transfer_may_carry_evidence() {
        let fx = fixture(vec![item("a", 1000, 10)]);
        let mut payload = delivery_payload(vec![line("a", 1)]);
        payload.payment_method = PaymentMethod::WalletTransfer;
        payload.payment_evidence_url = Some("https://example.test/voucher.jpg".into());
        let order = fx.manager.checkout("cust-1", payload).await.unwrap();
        assert!(order.payment_evidence_url.is_some());
    }

    #[tokio::test]
    async fn cart_total_matches_order_grand_total() {
        let fx = fixture(vec![item("a", 1000, 10), item("b", 250, 8)]);
        let item_a = fx.items.get("a").unwrap().value().clone();
        let item_b = fx.items.get("b").unwrap().value().clone();

        let mut cart = crate::cart::Cart::new("cust-1", DELIVERY_FEE);
        let now = Local::now().time();
        cart.add(&item_a, 2, now).unwrap();
        cart.add(&item_b, 3, now).unwrap();

        let order = fx
            .manager
            .checkout(cart.customer_id(), delivery_payload(cart.line_inputs()))
            .await
            .unwrap();
        assert_eq!(order.grand_total, cart.total());
        cart.clear();
    }

    #[tokio::test]
    async fn transition_graph_is_enforced_end_to_end() {
        let fx = fixture(vec![item("a", 1000, 10)]);
        let order = fx
            .manager
            .checkout("cust-1", delivery_payload(vec![line("a", 1)]))
            .await
            .unwrap();
        let admin = Actor::admin("admin-1");

        let paid = fx
            .manager
            .transition(&order.id, OrderStatus::Paid, &admin)
            .await
            .unwrap();
        assert_eq!(paid.status, OrderStatus::Paid);

        // Going back to pending is not a defined edge.
        let err = fx
            .manager
            .transition(&order.id, OrderStatus::Pending, &admin)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidTransition { .. }));

        let fulfilled = fx
            .manager
            .transition(&order.id, OrderStatus::Fulfilled, &admin)
            .await
            .unwrap();
        assert_eq!(fulfilled.status, OrderStatus::Fulfilled);
        assert_eq!(fx.manager.sales_total(), fulfilled.grand_total);

        for target in [
            OrderStatus::Pending,
            OrderStatus::Paid,
            OrderStatus::Cancelled,
        ] {
            assert!(fx.manager.transition(&order.id, target, &admin).await.is_err());
        }
    }

    #[tokio::test]
    async fn cancellation_restores_stock_and_notifies_owner() {
        let fx = fixture(vec![item("a", 1000, 3)]);
        let order = fx
            .manager
            .checkout("cust-9", delivery_payload(vec![line("a", 3)]))
            .await
            .unwrap();
        assert_eq!(fx.items.get("a").unwrap().quantity, 0);

        fx.manager
            .transition(&order.id, OrderStatus::Cancelled, &Actor::admin("admin-1"))
            .await
            .unwrap();

        assert_eq!(fx.items.get("a").unwrap().quantity, 3);
        let sent = fx.notifier.sent.lock();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "cust-9");
        assert!(sent[0].1.contains("CANCELLED"));
    }

    #[tokio::test]
    async fn customers_cannot_transition_or_delete() {
        let fx = fixture(vec![item("a", 1000, 10)]);
        let order = fx
            .manager
            .checkout("cust-1", delivery_payload(vec![line("a", 1)]))
            .await
            .unwrap();
        let customer = Actor::customer("cust-1");

        assert!(matches!(
            fx.manager
                .transition(&order.id, OrderStatus::Paid, &customer)
                .await,
            Err(StoreError::Forbidden(_))
        ));
        assert!(matches!(
            fx.manager.delete(&order.id, &customer),
            Err(StoreError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn deletion_works_from_any_state_and_broadcasts() {
        let fx = fixture(vec![item("a", 1000, 10)]);
        let admin = Actor::admin("admin-1");
        let order = fx
            .manager
            .checkout("cust-1", delivery_payload(vec![line("a", 1)]))
            .await
            .unwrap();
        fx.manager
            .transition(&order.id, OrderStatus::Paid, &admin)
            .await
            .unwrap();

        let mut sub = fx.bus.subscribe_orders_all(crate::bus::OverflowPolicy::DropOldest);
        fx.manager.delete(&order.id, &admin).unwrap();
        let event = sub.recv().await.unwrap();
        assert!(matches!(
            event.payload,
            ChangePayload::OrderDeleted { .. }
        ));
        assert!(matches!(
            fx.manager.get(&order.id),
            Err(StoreError::NotFound(_))
        ));
        // Purge is bookkeeping removal, not cancellation: stock stays.
        assert_eq!(fx.items.get("a").unwrap().quantity, 9);
    }

    #[tokio::test]
    async fn listing_is_newest_first_and_scoped_per_customer() {
        let fx = fixture(vec![item("a", 1000, 100)]);
        let first = fx
            .manager
            .checkout("alice", delivery_payload(vec![line("a", 1)]))
            .await
            .unwrap();
        let second = fx
            .manager
            .checkout("bob", delivery_payload(vec![line("a", 1)]))
            .await
            .unwrap();

        let all = fx.manager.list();
        assert_eq!(all.len(), 2);
        assert!(all[0].created_at >= all[1].created_at);

        let alice = fx.manager.list_for_customer("alice");
        assert_eq!(alice.len(), 1);
        assert_eq!(alice[0].id, first.id);
        let bob = fx.manager.list_for_customer("bob");
        assert_eq!(bob[0].id, second.id);
    }
}
