//! Order Model
//!
//! An order is a frozen financial record: line-item prices never change
//! after creation, even if the catalog item's price or offer later changes.
//! Mutation happens only through status transitions; deletion is an explicit
//! administrative purge, not a status.

use serde::{Deserialize, Serialize};

/// Order status
///
/// `FULFILLED` and `CANCELLED` are terminal; see [`OrderStatus::can_transition_to`]
/// for the full graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// Initial state, awaiting manual payment verification
    Pending,
    /// Payment verified by an administrator
    Paid,
    /// Delivered or handed off (terminal)
    Fulfilled,
    /// Cancelled before payment (terminal)
    Cancelled,
}

impl OrderStatus {
    /// Whether any further transition is defined out of this state
    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Fulfilled | OrderStatus::Cancelled)
    }

    /// The transition graph:
    ///
    /// ```text
    /// pending -> paid -> fulfilled
    ///        \-> cancelled
    /// ```
    pub fn can_transition_to(self, target: OrderStatus) -> bool {
        matches!(
            (self, target),
            (OrderStatus::Pending, OrderStatus::Paid)
                | (OrderStatus::Pending, OrderStatus::Cancelled)
                | (OrderStatus::Paid, OrderStatus::Fulfilled)
        )
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatus::Pending => write!(f, "PENDING"),
            OrderStatus::Paid => write!(f, "PAID"),
            OrderStatus::Fulfilled => write!(f, "FULFILLED"),
            OrderStatus::Cancelled => write!(f, "CANCELLED"),
        }
    }
}

/// Delivery mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeliveryMode {
    Delivery,
    Pickup,
}

/// Payment method
///
/// Payment confirmation is a manual human decision recorded as the
/// `pending -> paid` transition, never computed here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    Cash,
    WalletTransfer,
}

/// Line-item snapshot: an item's name, price, and quantity frozen at
/// submission time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub item_id: String,
    /// Display name snapshot
    pub name: String,
    /// Unit price in cents as resolved at submission time
    pub unit_price: i64,
    pub quantity: u32,
}

impl LineItem {
    pub fn line_total(&self) -> i64 {
        self.unit_price * i64::from(self.quantity)
    }
}

/// Order entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    /// Creation timestamp (Unix millis)
    pub created_at: i64,
    /// Owning customer identity
    pub customer_id: String,
    /// Customer display name snapshot
    pub customer_name: String,
    /// Customer phone snapshot
    pub customer_phone: Option<String>,
    pub delivery_mode: DeliveryMode,
    /// Required iff delivery mode is `DELIVERY`
    pub address: Option<String>,
    /// Immutable line-item snapshots
    pub items: Vec<LineItem>,
    /// Sum of line totals plus the delivery surcharge, in cents
    pub grand_total: i64,
    pub status: OrderStatus,
    pub payment_method: PaymentMethod,
    /// Payment-evidence reference (wallet transfers only, may be absent)
    pub payment_evidence_url: Option<String>,
}

/// Line input submitted at checkout. Prices are resolved server-side at
/// submission time, so only the item reference and quantity travel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItemInput {
    pub item_id: String,
    pub quantity: u32,
}

/// Create order payload (the owning customer comes from the session actor)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCreate {
    /// Customer display name snapshot (from the session profile)
    pub customer_name: String,
    pub customer_phone: Option<String>,
    pub delivery_mode: DeliveryMode,
    pub address: Option<String>,
    pub items: Vec<LineItemInput>,
    pub payment_method: PaymentMethod,
    pub payment_evidence_url: Option<String>,
}
