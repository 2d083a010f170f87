use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use cantina_cart::repository::CartRepository;
use cantina_cart::{Cart, CartLine, NewCartLine};
use cantina_core::LineKind;

pub struct PgCartRepository {
    pool: PgPool,
}

impl PgCartRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct CartRow {
    id: Uuid,
    user_id: String,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(sqlx::FromRow)]
pub(crate) struct CartLineRow {
    pub(crate) id: Uuid,
    pub(crate) cart_id: Uuid,
    pub(crate) line_key: String,
    pub(crate) kind: String,
    pub(crate) menu_id: Option<Uuid>,
    pub(crate) dish_id: Option<Uuid>,
    pub(crate) name: String,
    pub(crate) quantity: i32,
    pub(crate) unit_price_cents: i32,
    pub(crate) created_at: chrono::DateTime<chrono::Utc>,
}

impl From<CartRow> for Cart {
    fn from(row: CartRow) -> Self {
        Cart {
            id: row.id,
            user_id: row.user_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl TryFrom<CartLineRow> for CartLine {
    type Error = Box<dyn std::error::Error + Send + Sync>;

    fn try_from(row: CartLineRow) -> Result<Self, Self::Error> {
        let kind = LineKind::parse(&row.kind)
            .ok_or_else(|| format!("unknown cart line kind: {}", row.kind))?;
        Ok(CartLine {
            id: row.id,
            cart_id: row.cart_id,
            line_key: row.line_key,
            kind,
            menu_id: row.menu_id,
            dish_id: row.dish_id,
            name: row.name,
            quantity: row.quantity,
            unit_price_cents: row.unit_price_cents,
            created_at: row.created_at,
        })
    }
}

pub(crate) const CART_LINE_COLUMNS: &str =
    "id, cart_id, line_key, kind, menu_id, dish_id, name, quantity, unit_price_cents, created_at";
const CART_COLUMNS: &str = "id, user_id, created_at, updated_at";

#[async_trait]
impl CartRepository for PgCartRepository {
    async fn find_cart(
        &self,
        user_id: &str,
    ) -> Result<Option<Cart>, Box<dyn std::error::Error + Send + Sync>> {
        let row = sqlx::query_as::<_, CartRow>(&format!(
            "SELECT {CART_COLUMNS} FROM carts WHERE user_id = $1"
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Cart::from))
    }

    async fn find_or_create_cart(
        &self,
        user_id: &str,
    ) -> Result<Cart, Box<dyn std::error::Error + Send + Sync>> {
        // Upsert keyed by user_id; the no-op update makes RETURNING yield
        // the existing row on conflict.
        let row = sqlx::query_as::<_, CartRow>(&format!(
            "INSERT INTO carts (id, user_id) VALUES ($1, $2) \
             ON CONFLICT (user_id) DO UPDATE SET updated_at = NOW() \
             RETURNING {CART_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(Cart::from(row))
    }

    async fn list_lines(
        &self,
        cart_id: Uuid,
    ) -> Result<Vec<CartLine>, Box<dyn std::error::Error + Send + Sync>> {
        let rows = sqlx::query_as::<_, CartLineRow>(&format!(
            "SELECT {CART_LINE_COLUMNS} FROM cart_lines WHERE cart_id = $1 ORDER BY created_at"
        ))
        .bind(cart_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(CartLine::try_from).collect()
    }

    async fn merge_line(
        &self,
        cart_id: Uuid,
        line: &NewCartLine,
    ) -> Result<CartLine, Box<dyn std::error::Error + Send + Sync>> {
        // Merge-by-key: an existing line accumulates quantity and takes the
        // freshly captured price and name.
        let row = sqlx::query_as::<_, CartLineRow>(&format!(
            "INSERT INTO cart_lines \
                 (id, cart_id, line_key, kind, menu_id, dish_id, name, quantity, unit_price_cents) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             ON CONFLICT (cart_id, line_key) DO UPDATE SET \
                 quantity = cart_lines.quantity + EXCLUDED.quantity, \
                 unit_price_cents = EXCLUDED.unit_price_cents, \
                 name = EXCLUDED.name, \
                 menu_id = EXCLUDED.menu_id, \
                 dish_id = EXCLUDED.dish_id \
             RETURNING {CART_LINE_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(cart_id)
        .bind(line.line_key())
        .bind(line.kind.as_str())
        .bind(line.menu_id)
        .bind(line.dish_id)
        .bind(&line.name)
        .bind(line.quantity)
        .bind(line.unit_price_cents)
        .fetch_one(&self.pool)
        .await?;

        CartLine::try_from(row)
    }

    async fn set_line_quantity(
        &self,
        cart_id: Uuid,
        line_id: Uuid,
        quantity: i32,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        let result =
            sqlx::query("UPDATE cart_lines SET quantity = $1 WHERE id = $2 AND cart_id = $3")
                .bind(quantity)
                .bind(line_id)
                .bind(cart_id)
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn remove_line(
        &self,
        cart_id: Uuid,
        line_id: Uuid,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        sqlx::query("DELETE FROM cart_lines WHERE id = $1 AND cart_id = $2")
            .bind(line_id)
            .bind(cart_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn clear_lines(
        &self,
        cart_id: Uuid,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        sqlx::query("DELETE FROM cart_lines WHERE cart_id = $1")
            .bind(cart_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
