use std::sync::Arc;

use serde::Deserialize;
use uuid::Uuid;

use cantina_catalog::CatalogRepository;
use cantina_core::{positive_quantity, CoreError, CoreResult, LineKind};

use crate::models::{CartView, NewCartLine};
use crate::repository::CartRepository;

/// One requested addition: a whole menu or a single dish, with an optional
/// raw quantity that is normalized before use.
#[derive(Debug, Clone, Deserialize)]
pub struct AddItem {
    pub kind: LineKind,
    pub menu_id: Option<Uuid>,
    pub dish_id: Option<Uuid>,
    pub quantity: Option<f64>,
}

/// Maintains the one active cart per user: merges additions into existing
/// lines by line key, recomputes totals, mutates quantities, removes lines.
pub struct CartEngine {
    carts: Arc<dyn CartRepository>,
    catalog: Arc<dyn CatalogRepository>,
}

impl CartEngine {
    pub fn new(carts: Arc<dyn CartRepository>, catalog: Arc<dyn CatalogRepository>) -> Self {
        Self { carts, catalog }
    }

    /// Adds a batch of items, creating the cart if absent.
    ///
    /// Items are applied in order. A reference that does not resolve aborts
    /// the batch with `NotFound`, but items already applied stay committed:
    /// batches are at-least-partially applied, not atomic. Prices and names
    /// are captured from the catalog at this moment, also when merging into
    /// an existing line.
    pub async fn add_items(&self, user_id: &str, items: &[AddItem]) -> CoreResult<CartView> {
        if items.is_empty() {
            return self.read_cart(user_id).await;
        }

        let cart = self
            .carts
            .find_or_create_cart(user_id)
            .await
            .map_err(CoreError::unexpected)?;

        for item in items {
            let line = self.resolve(item).await?;
            self.carts
                .merge_line(cart.id, &line)
                .await
                .map_err(CoreError::unexpected)?;
        }

        self.read_cart(user_id).await
    }

    /// Sets a line's quantity, with the same silent coercion as adds.
    pub async fn set_quantity(
        &self,
        user_id: &str,
        line_id: Uuid,
        quantity: Option<f64>,
    ) -> CoreResult<()> {
        let cart = self
            .carts
            .find_cart(user_id)
            .await
            .map_err(CoreError::unexpected)?
            .ok_or(CoreError::NotFound("cart line"))?;

        let updated = self
            .carts
            .set_line_quantity(cart.id, line_id, positive_quantity(quantity))
            .await
            .map_err(CoreError::unexpected)?;

        if !updated {
            return Err(CoreError::NotFound("cart line"));
        }
        Ok(())
    }

    /// Removes one line, or every line when `line_id` is `None`.
    /// Idempotent: a missing cart or line still reports success.
    pub async fn remove_line(&self, user_id: &str, line_id: Option<Uuid>) -> CoreResult<()> {
        let Some(cart) = self
            .carts
            .find_cart(user_id)
            .await
            .map_err(CoreError::unexpected)?
        else {
            return Ok(());
        };

        match line_id {
            Some(line_id) => self
                .carts
                .remove_line(cart.id, line_id)
                .await
                .map_err(CoreError::unexpected),
            None => self
                .carts
                .clear_lines(cart.id)
                .await
                .map_err(CoreError::unexpected),
        }
    }

    /// Pure projection; users who never added anything get the empty shape.
    pub async fn read_cart(&self, user_id: &str) -> CoreResult<CartView> {
        let Some(cart) = self
            .carts
            .find_cart(user_id)
            .await
            .map_err(CoreError::unexpected)?
        else {
            return Ok(CartView::empty());
        };

        let lines = self
            .carts
            .list_lines(cart.id)
            .await
            .map_err(CoreError::unexpected)?;

        Ok(CartView::of(cart, lines))
    }

    async fn resolve(&self, item: &AddItem) -> CoreResult<NewCartLine> {
        let quantity = positive_quantity(item.quantity);

        match item.kind {
            LineKind::WholeMenu => {
                let menu_id = item.menu_id.ok_or_else(|| {
                    CoreError::InvalidInput("menu_id is required for WHOLE_MENU items".to_string())
                })?;
                let menu = self
                    .catalog
                    .get_menu(menu_id)
                    .await
                    .map_err(CoreError::unexpected)?
                    .ok_or(CoreError::NotFound("menu"))?;

                Ok(NewCartLine {
                    kind: LineKind::WholeMenu,
                    menu_id: Some(menu.id),
                    dish_id: None,
                    name: menu.name,
                    quantity,
                    unit_price_cents: menu.price_cents,
                })
            }
            LineKind::Dish => {
                let dish_id = item.dish_id.ok_or_else(|| {
                    CoreError::InvalidInput("dish_id is required for DISH items".to_string())
                })?;
                let dish = self
                    .catalog
                    .get_dish(dish_id)
                    .await
                    .map_err(CoreError::unexpected)?
                    .ok_or(CoreError::NotFound("dish"))?;

                Ok(NewCartLine {
                    kind: LineKind::Dish,
                    menu_id: dish.menu_id,
                    dish_id: Some(dish.id),
                    name: dish.name,
                    quantity,
                    unit_price_cents: dish.price_cents,
                })
            }
        }
    }
}
