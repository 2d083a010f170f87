use async_trait::async_trait;
use uuid::Uuid;

use crate::dish::Dish;
use crate::menu::{MenuDetail, MenuOffering, NewMenuOffering};

/// Repository trait for catalog access.
///
/// The engines only need the two lookups; the remaining operations back the
/// staff-facing catalog administration surface.
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    async fn get_menu(
        &self,
        id: Uuid,
    ) -> Result<Option<MenuOffering>, Box<dyn std::error::Error + Send + Sync>>;

    async fn get_dish(
        &self,
        id: Uuid,
    ) -> Result<Option<Dish>, Box<dyn std::error::Error + Send + Sync>>;

    async fn create_menu(
        &self,
        menu: &NewMenuOffering,
    ) -> Result<MenuDetail, Box<dyn std::error::Error + Send + Sync>>;

    async fn get_menu_detail(
        &self,
        id: Uuid,
    ) -> Result<Option<MenuDetail>, Box<dyn std::error::Error + Send + Sync>>;

    /// Lists offerings, newest serving date first.
    async fn list_menus(
        &self,
        available_only: bool,
    ) -> Result<Vec<MenuDetail>, Box<dyn std::error::Error + Send + Sync>>;

    /// Returns false when the offering does not exist.
    async fn set_menu_availability(
        &self,
        id: Uuid,
        available: bool,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>>;

    /// Deletes an offering and its dishes. Returns false when absent.
    async fn delete_menu(
        &self,
        id: Uuid,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>>;
}
