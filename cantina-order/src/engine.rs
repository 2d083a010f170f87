use std::sync::Arc;

use serde::Deserialize;
use uuid::Uuid;

use cantina_catalog::CatalogRepository;
use cantina_core::{positive_quantity, CoreError, CoreResult, LineKind, NotificationSink};
use cantina_shared::models::events::{OrderCreatedEvent, OrderLinePayload, OrderPayload, Purchaser};

use crate::models::{NewOrderLine, Order, OrderStatus};
use crate::repository::OrderRepository;

/// Direct order request, bypassing the cart: a whole menu reserved as one
/// line, or an à-la-carte list of dishes.
#[derive(Debug, Clone, Deserialize)]
pub enum DirectOrder {
    WholeMenu { menu_id: Uuid },
    ALaCarte { dishes: Vec<DishOrder> },
}

#[derive(Debug, Clone, Deserialize)]
pub struct DishOrder {
    pub dish_id: Uuid,
    pub quantity: Option<f64>,
}

/// Converts carts into immutable orders and creates direct orders, firing
/// a best-effort `order.created` notification after each commit.
pub struct CheckoutEngine {
    orders: Arc<dyn OrderRepository>,
    catalog: Arc<dyn CatalogRepository>,
    sink: Arc<dyn NotificationSink>,
}

impl CheckoutEngine {
    pub fn new(
        orders: Arc<dyn OrderRepository>,
        catalog: Arc<dyn CatalogRepository>,
        sink: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            orders,
            catalog,
            sink,
        }
    }

    /// Atomically snapshots the purchaser's cart into a PENDING order and
    /// clears the cart. An absent or empty cart fails with `EmptyCart` and
    /// leaves persisted state untouched.
    pub async fn checkout(&self, purchaser: &Purchaser) -> CoreResult<Order> {
        let order = self
            .orders
            .checkout_cart(&purchaser.id)
            .await
            .map_err(CoreError::unexpected)?
            .ok_or(CoreError::EmptyCart)?;

        self.notify_order_created(&order, purchaser);
        Ok(order)
    }

    /// Creates an order without touching the cart. Every referenced entity
    /// is resolved before any write, so this path is atomic: a missing
    /// menu or dish aborts with `NotFound` and nothing is persisted.
    pub async fn create_order_direct(
        &self,
        purchaser: &Purchaser,
        request: DirectOrder,
    ) -> CoreResult<Order> {
        let lines = match request {
            DirectOrder::WholeMenu { menu_id } => {
                let menu = self
                    .catalog
                    .get_menu(menu_id)
                    .await
                    .map_err(CoreError::unexpected)?
                    .ok_or(CoreError::NotFound("menu"))?;

                vec![NewOrderLine {
                    kind: LineKind::WholeMenu,
                    menu_id: Some(menu.id),
                    dish_id: None,
                    name: menu.name,
                    quantity: 1,
                    unit_price_cents: menu.price_cents,
                }]
            }
            DirectOrder::ALaCarte { dishes } => {
                if dishes.is_empty() {
                    return Err(CoreError::InvalidInput(
                        "at least one dish is required".to_string(),
                    ));
                }

                let mut lines = Vec::with_capacity(dishes.len());
                for requested in &dishes {
                    let dish = self
                        .catalog
                        .get_dish(requested.dish_id)
                        .await
                        .map_err(CoreError::unexpected)?
                        .ok_or(CoreError::NotFound("dish"))?;

                    lines.push(NewOrderLine {
                        kind: LineKind::Dish,
                        menu_id: dish.menu_id,
                        dish_id: Some(dish.id),
                        name: dish.name,
                        quantity: positive_quantity(requested.quantity),
                        unit_price_cents: dish.price_cents,
                    });
                }
                lines
            }
        };

        let order = self
            .orders
            .create_order(&purchaser.id, &lines)
            .await
            .map_err(CoreError::unexpected)?;

        self.notify_order_created(&order, purchaser);
        Ok(order)
    }

    /// An order as seen by its owner. Other users' orders are absent, not
    /// forbidden.
    pub async fn get_order(&self, user_id: &str, id: Uuid) -> CoreResult<Order> {
        let order = self
            .orders
            .get_order(id)
            .await
            .map_err(CoreError::unexpected)?
            .filter(|order| order.user_id == user_id)
            .ok_or(CoreError::NotFound("order"))?;
        Ok(order)
    }

    pub async fn list_orders(&self, user_id: &str) -> CoreResult<Vec<Order>> {
        self.orders
            .list_orders(user_id)
            .await
            .map_err(CoreError::unexpected)
    }

    pub async fn list_all_orders(&self) -> CoreResult<Vec<Order>> {
        self.orders
            .list_all_orders()
            .await
            .map_err(CoreError::unexpected)
    }

    /// Staff-driven status transition, guarded by the lifecycle rules.
    pub async fn update_status(&self, id: Uuid, next: OrderStatus) -> CoreResult<Order> {
        let mut order = self
            .orders
            .get_order(id)
            .await
            .map_err(CoreError::unexpected)?
            .ok_or(CoreError::NotFound("order"))?;

        if !order.status.can_transition_to(&next) {
            return Err(CoreError::InvalidTransition {
                from: order.status.as_str().to_string(),
                to: next.as_str().to_string(),
            });
        }

        self.orders
            .update_order_status(id, &next)
            .await
            .map_err(CoreError::unexpected)?;

        order.status = next;
        Ok(order)
    }

    /// Fire-and-forget: delivery runs in a detached task with the sink's
    /// own timeout, and failures are logged, never retried or surfaced.
    fn notify_order_created(&self, order: &Order, purchaser: &Purchaser) {
        let sink = Arc::clone(&self.sink);
        let event = OrderCreatedEvent {
            order: OrderPayload {
                id: order.id,
                status: order.status.as_str().to_string(),
                total_cents: order.total_cents,
                created_at: order.created_at,
                lines: order
                    .lines
                    .iter()
                    .map(|line| OrderLinePayload {
                        kind: line.kind.as_str().to_string(),
                        menu_id: line.menu_id,
                        dish_id: line.dish_id,
                        name: line.name.clone(),
                        quantity: line.quantity,
                        unit_price_cents: line.unit_price_cents,
                    })
                    .collect(),
            },
            user: purchaser.clone(),
        };

        tokio::spawn(async move {
            let payload = match serde_json::to_value(&event) {
                Ok(payload) => payload,
                Err(err) => {
                    tracing::warn!("failed to serialize order.created payload: {err}");
                    return;
                }
            };
            if let Err(err) = sink.publish("order.created", payload).await {
                tracing::warn!(order_id = %event.order.id, "order.created notification failed: {err}");
            }
        });
    }
}
