use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

/// Identity of the user an order is created for, as supplied by the
/// session layer. Forwarded verbatim in outbound notifications.
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct Purchaser {
    pub id: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub role: Option<String>,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct OrderCreatedEvent {
    pub order: OrderPayload,
    pub user: Purchaser,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct OrderPayload {
    pub id: Uuid,
    pub status: String,
    pub total_cents: i64,
    pub created_at: DateTime<Utc>,
    pub lines: Vec<OrderLinePayload>,
}

/// One order line with the display name frozen at checkout time. Names are
/// captured on the line itself, never re-resolved from the live catalog.
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct OrderLinePayload {
    pub kind: String,
    pub menu_id: Option<Uuid>,
    pub dish_id: Option<Uuid>,
    pub name: String,
    pub quantity: i32,
    pub unit_price_cents: i32,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct MenuPublishedEvent {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price_cents: i32,
    pub available: bool,
    pub served_on: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub dishes: Vec<MenuDishPayload>,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct MenuDishPayload {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price_cents: i32,
    pub image_url: Option<String>,
}
