use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single dish. Orderable on its own; `menu_id` links it to the offering
/// it was published under, when any.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dish {
    pub id: Uuid,
    pub menu_id: Option<Uuid>,
    pub name: String,
    pub description: Option<String>,
    pub price_cents: i32,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewDish {
    pub name: String,
    pub description: Option<String>,
    pub price_cents: i32,
    pub image_url: Option<String>,
}
