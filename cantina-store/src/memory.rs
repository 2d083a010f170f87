use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use cantina_cart::repository::CartRepository;
use cantina_cart::{Cart, CartLine, NewCartLine};
use cantina_catalog::repository::CatalogRepository;
use cantina_catalog::{Dish, MenuDetail, MenuOffering, NewMenuOffering};
use cantina_order::repository::OrderRepository;
use cantina_order::{NewOrderLine, Order, OrderLine, OrderStatus};

/// In-memory implementation of every repository trait, HashMap-backed.
///
/// Exists for tests and demos; the mutex makes each repository call
/// atomic, which also gives `checkout_cart` its all-or-nothing contract.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    menus: HashMap<Uuid, MenuOffering>,
    dishes: HashMap<Uuid, Dish>,
    carts: HashMap<String, Cart>,
    cart_lines: HashMap<Uuid, Vec<CartLine>>,
    orders: Vec<Order>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed_menu(&self, name: &str, price_cents: i32, served_on: NaiveDate) -> MenuOffering {
        let now = Utc::now();
        let menu = MenuOffering {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: None,
            price_cents,
            available: true,
            served_on,
            created_at: now,
            updated_at: now,
        };
        let mut inner = self.inner.lock().unwrap();
        inner.menus.insert(menu.id, menu.clone());
        menu
    }

    pub fn seed_dish(&self, menu_id: Option<Uuid>, name: &str, price_cents: i32) -> Dish {
        let dish = Dish {
            id: Uuid::new_v4(),
            menu_id,
            name: name.to_string(),
            description: None,
            price_cents,
            image_url: None,
        };
        let mut inner = self.inner.lock().unwrap();
        inner.dishes.insert(dish.id, dish.clone());
        dish
    }

    pub fn set_menu_price(&self, id: Uuid, price_cents: i32) {
        let mut inner = self.inner.lock().unwrap();
        if let Some(menu) = inner.menus.get_mut(&id) {
            menu.price_cents = price_cents;
        }
    }

    pub fn set_dish_price(&self, id: Uuid, price_cents: i32) {
        let mut inner = self.inner.lock().unwrap();
        if let Some(dish) = inner.dishes.get_mut(&id) {
            dish.price_cents = price_cents;
        }
    }

    /// Lines currently persisted for a user's cart, for assertions.
    pub fn persisted_lines(&self, user_id: &str) -> Vec<CartLine> {
        let inner = self.inner.lock().unwrap();
        inner
            .carts
            .get(user_id)
            .and_then(|cart| inner.cart_lines.get(&cart.id))
            .cloned()
            .unwrap_or_default()
    }

    pub fn order_count(&self) -> usize {
        self.inner.lock().unwrap().orders.len()
    }
}

impl Inner {
    fn dishes_of(&self, menu_id: Uuid) -> Vec<Dish> {
        let mut dishes: Vec<Dish> = self
            .dishes
            .values()
            .filter(|dish| dish.menu_id == Some(menu_id))
            .cloned()
            .collect();
        dishes.sort_by(|a, b| a.name.cmp(&b.name));
        dishes
    }
}

#[async_trait]
impl CatalogRepository for MemoryStore {
    async fn get_menu(
        &self,
        id: Uuid,
    ) -> Result<Option<MenuOffering>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.inner.lock().unwrap().menus.get(&id).cloned())
    }

    async fn get_dish(
        &self,
        id: Uuid,
    ) -> Result<Option<Dish>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.inner.lock().unwrap().dishes.get(&id).cloned())
    }

    async fn create_menu(
        &self,
        menu: &NewMenuOffering,
    ) -> Result<MenuDetail, Box<dyn std::error::Error + Send + Sync>> {
        let now = Utc::now();
        let offering = MenuOffering {
            id: Uuid::new_v4(),
            name: menu.name.clone(),
            description: menu.description.clone(),
            price_cents: menu.price_cents,
            available: true,
            served_on: menu.served_on,
            created_at: now,
            updated_at: now,
        };

        let mut inner = self.inner.lock().unwrap();
        inner.menus.insert(offering.id, offering.clone());

        let mut dishes = Vec::with_capacity(menu.dishes.len());
        for dish in &menu.dishes {
            let dish = Dish {
                id: Uuid::new_v4(),
                menu_id: Some(offering.id),
                name: dish.name.clone(),
                description: dish.description.clone(),
                price_cents: dish.price_cents,
                image_url: dish.image_url.clone(),
            };
            inner.dishes.insert(dish.id, dish.clone());
            dishes.push(dish);
        }

        Ok(MenuDetail::new(offering, dishes))
    }

    async fn get_menu_detail(
        &self,
        id: Uuid,
    ) -> Result<Option<MenuDetail>, Box<dyn std::error::Error + Send + Sync>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .menus
            .get(&id)
            .cloned()
            .map(|menu| MenuDetail::new(menu, inner.dishes_of(id))))
    }

    async fn list_menus(
        &self,
        available_only: bool,
    ) -> Result<Vec<MenuDetail>, Box<dyn std::error::Error + Send + Sync>> {
        let inner = self.inner.lock().unwrap();
        let mut menus: Vec<MenuOffering> = inner
            .menus
            .values()
            .filter(|menu| !available_only || menu.available)
            .cloned()
            .collect();
        menus.sort_by(|a, b| b.served_on.cmp(&a.served_on));

        Ok(menus
            .into_iter()
            .map(|menu| {
                let dishes = inner.dishes_of(menu.id);
                MenuDetail::new(menu, dishes)
            })
            .collect())
    }

    async fn set_menu_availability(
        &self,
        id: Uuid,
        available: bool,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        let mut inner = self.inner.lock().unwrap();
        match inner.menus.get_mut(&id) {
            Some(menu) => {
                menu.available = available;
                menu.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_menu(
        &self,
        id: Uuid,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        let mut inner = self.inner.lock().unwrap();
        let existed = inner.menus.remove(&id).is_some();
        inner.dishes.retain(|_, dish| dish.menu_id != Some(id));
        Ok(existed)
    }
}

#[async_trait]
impl CartRepository for MemoryStore {
    async fn find_cart(
        &self,
        user_id: &str,
    ) -> Result<Option<Cart>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.inner.lock().unwrap().carts.get(user_id).cloned())
    }

    async fn find_or_create_cart(
        &self,
        user_id: &str,
    ) -> Result<Cart, Box<dyn std::error::Error + Send + Sync>> {
        let mut inner = self.inner.lock().unwrap();
        let cart = inner
            .carts
            .entry(user_id.to_string())
            .or_insert_with(|| {
                let now = Utc::now();
                Cart {
                    id: Uuid::new_v4(),
                    user_id: user_id.to_string(),
                    created_at: now,
                    updated_at: now,
                }
            })
            .clone();
        Ok(cart)
    }

    async fn list_lines(
        &self,
        cart_id: Uuid,
    ) -> Result<Vec<CartLine>, Box<dyn std::error::Error + Send + Sync>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.cart_lines.get(&cart_id).cloned().unwrap_or_default())
    }

    async fn merge_line(
        &self,
        cart_id: Uuid,
        line: &NewCartLine,
    ) -> Result<CartLine, Box<dyn std::error::Error + Send + Sync>> {
        let key = line.line_key();
        let mut inner = self.inner.lock().unwrap();
        let lines = inner.cart_lines.entry(cart_id).or_default();

        if let Some(existing) = lines.iter_mut().find(|existing| existing.line_key == key) {
            existing.quantity += line.quantity;
            existing.unit_price_cents = line.unit_price_cents;
            existing.name = line.name.clone();
            existing.menu_id = line.menu_id;
            existing.dish_id = line.dish_id;
            return Ok(existing.clone());
        }

        let created = CartLine {
            id: Uuid::new_v4(),
            cart_id,
            line_key: key,
            kind: line.kind,
            menu_id: line.menu_id,
            dish_id: line.dish_id,
            name: line.name.clone(),
            quantity: line.quantity,
            unit_price_cents: line.unit_price_cents,
            created_at: Utc::now(),
        };
        lines.push(created.clone());
        Ok(created)
    }

    async fn set_line_quantity(
        &self,
        cart_id: Uuid,
        line_id: Uuid,
        quantity: i32,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        let mut inner = self.inner.lock().unwrap();
        let Some(lines) = inner.cart_lines.get_mut(&cart_id) else {
            return Ok(false);
        };
        match lines.iter_mut().find(|line| line.id == line_id) {
            Some(line) => {
                line.quantity = quantity;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn remove_line(
        &self,
        cart_id: Uuid,
        line_id: Uuid,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(lines) = inner.cart_lines.get_mut(&cart_id) {
            lines.retain(|line| line.id != line_id);
        }
        Ok(())
    }

    async fn clear_lines(
        &self,
        cart_id: Uuid,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let mut inner = self.inner.lock().unwrap();
        inner.cart_lines.remove(&cart_id);
        Ok(())
    }
}

#[async_trait]
impl OrderRepository for MemoryStore {
    async fn checkout_cart(
        &self,
        user_id: &str,
    ) -> Result<Option<Order>, Box<dyn std::error::Error + Send + Sync>> {
        let mut inner = self.inner.lock().unwrap();

        let Some(cart_id) = inner.carts.get(user_id).map(|cart| cart.id) else {
            return Ok(None);
        };
        let lines = inner.cart_lines.remove(&cart_id).unwrap_or_default();
        if lines.is_empty() {
            return Ok(None);
        }

        let order_id = Uuid::new_v4();
        let order_lines: Vec<OrderLine> = lines
            .iter()
            .map(|line| OrderLine {
                id: Uuid::new_v4(),
                order_id,
                kind: line.kind,
                menu_id: line.menu_id,
                dish_id: line.dish_id,
                name: line.name.clone(),
                quantity: line.quantity,
                unit_price_cents: line.unit_price_cents,
            })
            .collect();

        let order = Order {
            id: order_id,
            user_id: user_id.to_string(),
            status: OrderStatus::Pending,
            total_cents: lines.iter().map(CartLine::subtotal_cents).sum(),
            created_at: Utc::now(),
            lines: order_lines,
        };

        inner.orders.push(order.clone());
        Ok(Some(order))
    }

    async fn create_order(
        &self,
        user_id: &str,
        lines: &[NewOrderLine],
    ) -> Result<Order, Box<dyn std::error::Error + Send + Sync>> {
        let order_id = Uuid::new_v4();
        let order = Order {
            id: order_id,
            user_id: user_id.to_string(),
            status: OrderStatus::Pending,
            total_cents: cantina_order::models::total_of(lines),
            created_at: Utc::now(),
            lines: lines
                .iter()
                .map(|line| OrderLine {
                    id: Uuid::new_v4(),
                    order_id,
                    kind: line.kind,
                    menu_id: line.menu_id,
                    dish_id: line.dish_id,
                    name: line.name.clone(),
                    quantity: line.quantity,
                    unit_price_cents: line.unit_price_cents,
                })
                .collect(),
        };

        self.inner.lock().unwrap().orders.push(order.clone());
        Ok(order)
    }

    async fn get_order(
        &self,
        id: Uuid,
    ) -> Result<Option<Order>, Box<dyn std::error::Error + Send + Sync>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.orders.iter().find(|order| order.id == id).cloned())
    }

    async fn list_orders(
        &self,
        user_id: &str,
    ) -> Result<Vec<Order>, Box<dyn std::error::Error + Send + Sync>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .orders
            .iter()
            .rev()
            .filter(|order| order.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn list_all_orders(
        &self,
    ) -> Result<Vec<Order>, Box<dyn std::error::Error + Send + Sync>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.orders.iter().rev().cloned().collect())
    }

    async fn update_order_status(
        &self,
        id: Uuid,
        status: &OrderStatus,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        let mut inner = self.inner.lock().unwrap();
        match inner.orders.iter_mut().find(|order| order.id == id) {
            Some(order) => {
                order.status = status.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
