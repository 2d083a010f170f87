use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::dish::{Dish, NewDish};

/// A daily menu users can buy as a whole. Order lines freeze its price and
/// name at purchase time; later catalog edits never rewrite history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuOffering {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price_cents: i32,
    pub available: bool,
    pub served_on: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Offering together with its dishes, for detail views and notifications.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuDetail {
    pub menu: MenuOffering,
    pub dishes: Vec<Dish>,
}

/// Input for publishing a new offering with its dishes.
#[derive(Debug, Clone, Deserialize)]
pub struct NewMenuOffering {
    pub name: String,
    pub description: Option<String>,
    pub price_cents: i32,
    pub served_on: NaiveDate,
    pub dishes: Vec<NewDish>,
}

impl MenuDetail {
    pub fn new(menu: MenuOffering, dishes: Vec<Dish>) -> Self {
        Self { menu, dishes }
    }
}
