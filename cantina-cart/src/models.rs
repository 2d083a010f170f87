use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use cantina_core::LineKind;

/// Per-user singleton cart. Created lazily on first add and kept (possibly
/// empty) after checkout; it never stores its own total.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cart {
    pub id: Uuid,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One purchasable unit inside a cart. `unit_price_cents` and `name` are
/// captured from the catalog when the line is added or merged, not looked
/// up on reads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartLine {
    pub id: Uuid,
    pub cart_id: Uuid,
    pub line_key: String,
    pub kind: LineKind,
    pub menu_id: Option<Uuid>,
    pub dish_id: Option<Uuid>,
    pub name: String,
    pub quantity: i32,
    pub unit_price_cents: i32,
    pub created_at: DateTime<Utc>,
}

impl CartLine {
    pub fn subtotal_cents(&self) -> i64 {
        i64::from(self.quantity) * i64::from(self.unit_price_cents)
    }
}

/// Line contents to merge into a cart. The repository increments quantity
/// and refreshes price and name when a line with the same key exists.
#[derive(Debug, Clone)]
pub struct NewCartLine {
    pub kind: LineKind,
    pub menu_id: Option<Uuid>,
    pub dish_id: Option<Uuid>,
    pub name: String,
    pub quantity: i32,
    pub unit_price_cents: i32,
}

impl NewCartLine {
    pub fn line_key(&self) -> String {
        let entity_id = match self.kind {
            LineKind::WholeMenu => self.menu_id,
            LineKind::Dish => self.dish_id,
        };
        // kind/reference consistency is enforced by the engine before a
        // NewCartLine is built
        self.kind.line_key(entity_id.unwrap_or_default())
    }
}

/// Full cart projection: the cart row (absent when the user never added
/// anything), its lines in insertion order, and the computed total.
#[derive(Debug, Clone, Serialize)]
pub struct CartView {
    pub cart: Option<Cart>,
    pub lines: Vec<CartLine>,
    pub total_cents: i64,
}

impl CartView {
    pub fn empty() -> Self {
        Self {
            cart: None,
            lines: Vec::new(),
            total_cents: 0,
        }
    }

    pub fn of(cart: Cart, lines: Vec<CartLine>) -> Self {
        let total_cents = total_of(&lines);
        Self {
            cart: Some(cart),
            lines,
            total_cents,
        }
    }
}

pub fn total_of(lines: &[CartLine]) -> i64 {
    lines.iter().map(CartLine::subtotal_cents).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(quantity: i32, unit_price_cents: i32) -> CartLine {
        CartLine {
            id: Uuid::new_v4(),
            cart_id: Uuid::new_v4(),
            line_key: String::new(),
            kind: LineKind::Dish,
            menu_id: None,
            dish_id: Some(Uuid::new_v4()),
            name: "Flan Casero".to_string(),
            quantity,
            unit_price_cents,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_total_sums_quantity_times_unit_price() {
        let lines = vec![line(2, 1250), line(2, 300)];
        assert_eq!(total_of(&lines), 3100);
    }

    #[test]
    fn test_subtotal_does_not_overflow_i32() {
        let big = line(i32::MAX, 2);
        assert_eq!(big.subtotal_cents(), i64::from(i32::MAX) * 2);
    }
}
