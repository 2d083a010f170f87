use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{NewOrderLine, Order, OrderStatus};

/// Repository trait for order data access.
///
/// `checkout_cart` carries the transactional contract of the whole
/// checkout: read the user's cart and lines, total them, write the order
/// with its lines, delete the cart lines — all or nothing, isolated from
/// concurrent cart mutations on the same cart.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Returns `None` without writing anything when the cart is absent or
    /// empty. At most one of several concurrent calls for the same user
    /// observes a non-empty cart.
    async fn checkout_cart(
        &self,
        user_id: &str,
    ) -> Result<Option<Order>, Box<dyn std::error::Error + Send + Sync>>;

    /// Creates an order directly from prepared lines in one transaction.
    async fn create_order(
        &self,
        user_id: &str,
        lines: &[NewOrderLine],
    ) -> Result<Order, Box<dyn std::error::Error + Send + Sync>>;

    async fn get_order(
        &self,
        id: Uuid,
    ) -> Result<Option<Order>, Box<dyn std::error::Error + Send + Sync>>;

    /// A user's orders, newest first.
    async fn list_orders(
        &self,
        user_id: &str,
    ) -> Result<Vec<Order>, Box<dyn std::error::Error + Send + Sync>>;

    /// Every order, newest first (staff view).
    async fn list_all_orders(
        &self,
    ) -> Result<Vec<Order>, Box<dyn std::error::Error + Send + Sync>>;

    /// Returns false when the order does not exist.
    async fn update_order_status(
        &self,
        id: Uuid,
        status: &OrderStatus,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>>;
}
