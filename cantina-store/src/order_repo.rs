use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use cantina_core::LineKind;
use cantina_order::repository::OrderRepository;
use cantina_order::{NewOrderLine, Order, OrderLine, OrderStatus};

use crate::cart_repo::{CartLineRow, CART_LINE_COLUMNS};

pub struct PgOrderRepository {
    pool: PgPool,
}

impl PgOrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: Uuid,
    user_id: String,
    status: String,
    total_cents: i64,
    created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(sqlx::FromRow)]
struct OrderLineRow {
    id: Uuid,
    order_id: Uuid,
    kind: String,
    menu_id: Option<Uuid>,
    dish_id: Option<Uuid>,
    name: String,
    quantity: i32,
    unit_price_cents: i32,
}

impl TryFrom<OrderLineRow> for OrderLine {
    type Error = Box<dyn std::error::Error + Send + Sync>;

    fn try_from(row: OrderLineRow) -> Result<Self, Self::Error> {
        let kind = LineKind::parse(&row.kind)
            .ok_or_else(|| format!("unknown order line kind: {}", row.kind))?;
        Ok(OrderLine {
            id: row.id,
            order_id: row.order_id,
            kind,
            menu_id: row.menu_id,
            dish_id: row.dish_id,
            name: row.name,
            quantity: row.quantity,
            unit_price_cents: row.unit_price_cents,
        })
    }
}

fn assemble(row: OrderRow, lines: Vec<OrderLine>) -> Order {
    Order {
        id: row.id,
        user_id: row.user_id,
        status: OrderStatus::parse(&row.status),
        total_cents: row.total_cents,
        created_at: row.created_at,
        lines,
    }
}

const ORDER_COLUMNS: &str = "id, user_id, status, total_cents, created_at";
const ORDER_LINE_COLUMNS: &str =
    "id, order_id, kind, menu_id, dish_id, name, quantity, unit_price_cents";

async fn insert_order_line(
    tx: &mut Transaction<'_, Postgres>,
    order_id: Uuid,
    kind: &str,
    menu_id: Option<Uuid>,
    dish_id: Option<Uuid>,
    name: &str,
    quantity: i32,
    unit_price_cents: i32,
) -> Result<OrderLineRow, sqlx::Error> {
    sqlx::query_as::<_, OrderLineRow>(&format!(
        "INSERT INTO order_lines \
             (id, order_id, kind, menu_id, dish_id, name, quantity, unit_price_cents) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
         RETURNING {ORDER_LINE_COLUMNS}"
    ))
    .bind(Uuid::new_v4())
    .bind(order_id)
    .bind(kind)
    .bind(menu_id)
    .bind(dish_id)
    .bind(name)
    .bind(quantity)
    .bind(unit_price_cents)
    .fetch_one(&mut **tx)
    .await
}

#[async_trait]
impl OrderRepository for PgOrderRepository {
    async fn checkout_cart(
        &self,
        user_id: &str,
    ) -> Result<Option<Order>, Box<dyn std::error::Error + Send + Sync>> {
        let mut tx = self.pool.begin().await?;

        // Row lock on the cart: concurrent checkouts for the same user
        // serialize here, so only the first sees a non-empty cart.
        let cart: Option<(Uuid,)> =
            sqlx::query_as("SELECT id FROM carts WHERE user_id = $1 FOR UPDATE")
                .bind(user_id)
                .fetch_optional(&mut *tx)
                .await?;

        let Some((cart_id,)) = cart else {
            return Ok(None);
        };

        let lines: Vec<CartLineRow> = sqlx::query_as(&format!(
            "SELECT {CART_LINE_COLUMNS} FROM cart_lines WHERE cart_id = $1 ORDER BY created_at"
        ))
        .bind(cart_id)
        .fetch_all(&mut *tx)
        .await?;

        if lines.is_empty() {
            // nothing written yet, dropping the transaction rolls back
            return Ok(None);
        }

        let total_cents: i64 = lines
            .iter()
            .map(|line| i64::from(line.quantity) * i64::from(line.unit_price_cents))
            .sum();

        let order_row = sqlx::query_as::<_, OrderRow>(&format!(
            "INSERT INTO orders (id, user_id, status, total_cents) \
             VALUES ($1, $2, 'PENDING', $3) \
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(total_cents)
        .fetch_one(&mut *tx)
        .await?;

        let mut order_lines = Vec::with_capacity(lines.len());
        for line in &lines {
            let row = insert_order_line(
                &mut tx,
                order_row.id,
                &line.kind,
                line.menu_id,
                line.dish_id,
                &line.name,
                line.quantity,
                line.unit_price_cents,
            )
            .await?;
            order_lines.push(OrderLine::try_from(row)?);
        }

        sqlx::query("DELETE FROM cart_lines WHERE cart_id = $1")
            .bind(cart_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(Some(assemble(order_row, order_lines)))
    }

    async fn create_order(
        &self,
        user_id: &str,
        lines: &[NewOrderLine],
    ) -> Result<Order, Box<dyn std::error::Error + Send + Sync>> {
        let total_cents = cantina_order::models::total_of(lines);

        let mut tx = self.pool.begin().await?;

        let order_row = sqlx::query_as::<_, OrderRow>(&format!(
            "INSERT INTO orders (id, user_id, status, total_cents) \
             VALUES ($1, $2, 'PENDING', $3) \
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(total_cents)
        .fetch_one(&mut *tx)
        .await?;

        let mut order_lines = Vec::with_capacity(lines.len());
        for line in lines {
            let row = insert_order_line(
                &mut tx,
                order_row.id,
                line.kind.as_str(),
                line.menu_id,
                line.dish_id,
                &line.name,
                line.quantity,
                line.unit_price_cents,
            )
            .await?;
            order_lines.push(OrderLine::try_from(row)?);
        }

        tx.commit().await?;

        Ok(assemble(order_row, order_lines))
    }

    async fn get_order(
        &self,
        id: Uuid,
    ) -> Result<Option<Order>, Box<dyn std::error::Error + Send + Sync>> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let line_rows: Vec<OrderLineRow> = sqlx::query_as(&format!(
            "SELECT {ORDER_LINE_COLUMNS} FROM order_lines WHERE order_id = $1"
        ))
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        let lines = line_rows
            .into_iter()
            .map(OrderLine::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Some(assemble(row, lines)))
    }

    async fn list_orders(
        &self,
        user_id: &str,
    ) -> Result<Vec<Order>, Box<dyn std::error::Error + Send + Sync>> {
        let ids: Vec<(Uuid,)> =
            sqlx::query_as("SELECT id FROM orders WHERE user_id = $1 ORDER BY created_at DESC")
                .bind(user_id)
                .fetch_all(&self.pool)
                .await?;

        let mut orders = Vec::with_capacity(ids.len());
        for (id,) in ids {
            if let Some(order) = self.get_order(id).await? {
                orders.push(order);
            }
        }
        Ok(orders)
    }

    async fn list_all_orders(
        &self,
    ) -> Result<Vec<Order>, Box<dyn std::error::Error + Send + Sync>> {
        let ids: Vec<(Uuid,)> = sqlx::query_as("SELECT id FROM orders ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await?;

        let mut orders = Vec::with_capacity(ids.len());
        for (id,) in ids {
            if let Some(order) = self.get_order(id).await? {
                orders.push(order);
            }
        }
        Ok(orders)
    }

    async fn update_order_status(
        &self,
        id: Uuid,
        status: &OrderStatus,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        let result = sqlx::query("UPDATE orders SET status = $1, updated_at = NOW() WHERE id = $2")
            .bind(status.as_str())
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
