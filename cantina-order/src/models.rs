use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use cantina_core::LineKind;

/// Order status in the lifecycle.
///
/// Kept open: statuses this build does not know about round-trip through
/// `Other`, so stored orders survive new states being introduced.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Ready,
    Delivered,
    Cancelled,
    #[serde(untagged)]
    Other(String),
}

impl OrderStatus {
    pub fn as_str(&self) -> &str {
        match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Confirmed => "CONFIRMED",
            OrderStatus::Ready => "READY",
            OrderStatus::Delivered => "DELIVERED",
            OrderStatus::Cancelled => "CANCELLED",
            OrderStatus::Other(value) => value,
        }
    }

    pub fn parse(value: &str) -> Self {
        match value {
            "PENDING" => OrderStatus::Pending,
            "CONFIRMED" => OrderStatus::Confirmed,
            "READY" => OrderStatus::Ready,
            "DELIVERED" => OrderStatus::Delivered,
            "CANCELLED" => OrderStatus::Cancelled,
            other => OrderStatus::Other(other.to_string()),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    /// Staff-driven transition guard: PENDING → CONFIRMED → READY →
    /// DELIVERED, with cancellation allowed from PENDING and CONFIRMED.
    /// Unknown statuses pass through freely so newer deployments can move
    /// orders this build cannot interpret.
    pub fn can_transition_to(&self, next: &OrderStatus) -> bool {
        if self == next || self.is_terminal() {
            return false;
        }
        match (self, next) {
            (OrderStatus::Other(_), _) | (_, OrderStatus::Other(_)) => true,
            (OrderStatus::Pending, OrderStatus::Confirmed)
            | (OrderStatus::Confirmed, OrderStatus::Ready)
            | (OrderStatus::Ready, OrderStatus::Delivered) => true,
            (OrderStatus::Pending | OrderStatus::Confirmed, OrderStatus::Cancelled) => true,
            _ => false,
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An immutable purchase record. `total_cents` is frozen at creation and
/// never re-derived from live prices; only `status` changes afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub user_id: String,
    pub status: OrderStatus,
    pub total_cents: i64,
    pub created_at: DateTime<Utc>,
    pub lines: Vec<OrderLine>,
}

/// Structural copy of a cart line at checkout time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLine {
    pub id: Uuid,
    pub order_id: Uuid,
    pub kind: LineKind,
    pub menu_id: Option<Uuid>,
    pub dish_id: Option<Uuid>,
    pub name: String,
    pub quantity: i32,
    pub unit_price_cents: i32,
}

impl OrderLine {
    pub fn subtotal_cents(&self) -> i64 {
        i64::from(self.quantity) * i64::from(self.unit_price_cents)
    }
}

/// Line contents for an order about to be created.
#[derive(Debug, Clone)]
pub struct NewOrderLine {
    pub kind: LineKind,
    pub menu_id: Option<Uuid>,
    pub dish_id: Option<Uuid>,
    pub name: String,
    pub quantity: i32,
    pub unit_price_cents: i32,
}

impl NewOrderLine {
    pub fn subtotal_cents(&self) -> i64 {
        i64::from(self.quantity) * i64::from(self.unit_price_cents)
    }
}

pub fn total_of(lines: &[NewOrderLine]) -> i64 {
    lines.iter().map(NewOrderLine::subtotal_cents).sum()
}
