use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{Cart, CartLine, NewCartLine};

/// Repository trait for cart data access.
///
/// The merge discipline lives behind `merge_line`: within one cart the
/// (kind, entity) key is unique, and merging an existing key increments
/// quantity while refreshing the captured unit price and name.
#[async_trait]
pub trait CartRepository: Send + Sync {
    async fn find_cart(
        &self,
        user_id: &str,
    ) -> Result<Option<Cart>, Box<dyn std::error::Error + Send + Sync>>;

    /// Store-level upsert keyed by user id (one cart per user).
    async fn find_or_create_cart(
        &self,
        user_id: &str,
    ) -> Result<Cart, Box<dyn std::error::Error + Send + Sync>>;

    /// Lines in insertion order.
    async fn list_lines(
        &self,
        cart_id: Uuid,
    ) -> Result<Vec<CartLine>, Box<dyn std::error::Error + Send + Sync>>;

    async fn merge_line(
        &self,
        cart_id: Uuid,
        line: &NewCartLine,
    ) -> Result<CartLine, Box<dyn std::error::Error + Send + Sync>>;

    /// Returns false when the line is not in this cart.
    async fn set_line_quantity(
        &self,
        cart_id: Uuid,
        line_id: Uuid,
        quantity: i32,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>>;

    /// Deleting an absent line is not an error.
    async fn remove_line(
        &self,
        cart_id: Uuid,
        line_id: Uuid,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    async fn clear_lines(
        &self,
        cart_id: Uuid,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}
