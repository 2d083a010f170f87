use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use cantina_catalog::repository::CatalogRepository;
use cantina_catalog::{Dish, MenuDetail, MenuOffering, NewMenuOffering};

pub struct PgCatalogRepository {
    pool: PgPool,
}

impl PgCatalogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Internal structs for type-safe querying
#[derive(sqlx::FromRow)]
struct MenuRow {
    id: Uuid,
    name: String,
    description: Option<String>,
    price_cents: i32,
    available: bool,
    served_on: chrono::NaiveDate,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(sqlx::FromRow)]
struct DishRow {
    id: Uuid,
    menu_id: Option<Uuid>,
    name: String,
    description: Option<String>,
    price_cents: i32,
    image_url: Option<String>,
}

impl From<MenuRow> for MenuOffering {
    fn from(row: MenuRow) -> Self {
        MenuOffering {
            id: row.id,
            name: row.name,
            description: row.description,
            price_cents: row.price_cents,
            available: row.available,
            served_on: row.served_on,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl From<DishRow> for Dish {
    fn from(row: DishRow) -> Self {
        Dish {
            id: row.id,
            menu_id: row.menu_id,
            name: row.name,
            description: row.description,
            price_cents: row.price_cents,
            image_url: row.image_url,
        }
    }
}

const MENU_COLUMNS: &str =
    "id, name, description, price_cents, available, served_on, created_at, updated_at";
const DISH_COLUMNS: &str = "id, menu_id, name, description, price_cents, image_url";

#[async_trait]
impl CatalogRepository for PgCatalogRepository {
    async fn get_menu(
        &self,
        id: Uuid,
    ) -> Result<Option<MenuOffering>, Box<dyn std::error::Error + Send + Sync>> {
        let row = sqlx::query_as::<_, MenuRow>(&format!(
            "SELECT {MENU_COLUMNS} FROM menus WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(MenuOffering::from))
    }

    async fn get_dish(
        &self,
        id: Uuid,
    ) -> Result<Option<Dish>, Box<dyn std::error::Error + Send + Sync>> {
        let row = sqlx::query_as::<_, DishRow>(&format!(
            "SELECT {DISH_COLUMNS} FROM dishes WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Dish::from))
    }

    async fn create_menu(
        &self,
        menu: &NewMenuOffering,
    ) -> Result<MenuDetail, Box<dyn std::error::Error + Send + Sync>> {
        let mut tx = self.pool.begin().await?;

        let menu_row = sqlx::query_as::<_, MenuRow>(&format!(
            "INSERT INTO menus (id, name, description, price_cents, available, served_on) \
             VALUES ($1, $2, $3, $4, TRUE, $5) \
             RETURNING {MENU_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(&menu.name)
        .bind(&menu.description)
        .bind(menu.price_cents)
        .bind(menu.served_on)
        .fetch_one(&mut *tx)
        .await?;

        let mut dishes = Vec::with_capacity(menu.dishes.len());
        for dish in &menu.dishes {
            let dish_row = sqlx::query_as::<_, DishRow>(&format!(
                "INSERT INTO dishes (id, menu_id, name, description, price_cents, image_url) \
                 VALUES ($1, $2, $3, $4, $5, $6) \
                 RETURNING {DISH_COLUMNS}"
            ))
            .bind(Uuid::new_v4())
            .bind(menu_row.id)
            .bind(&dish.name)
            .bind(&dish.description)
            .bind(dish.price_cents)
            .bind(&dish.image_url)
            .fetch_one(&mut *tx)
            .await?;
            dishes.push(Dish::from(dish_row));
        }

        tx.commit().await?;

        Ok(MenuDetail::new(MenuOffering::from(menu_row), dishes))
    }

    async fn get_menu_detail(
        &self,
        id: Uuid,
    ) -> Result<Option<MenuDetail>, Box<dyn std::error::Error + Send + Sync>> {
        let Some(menu) = self.get_menu(id).await? else {
            return Ok(None);
        };

        let dishes = sqlx::query_as::<_, DishRow>(&format!(
            "SELECT {DISH_COLUMNS} FROM dishes WHERE menu_id = $1 ORDER BY name"
        ))
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(MenuDetail::new(
            menu,
            dishes.into_iter().map(Dish::from).collect(),
        )))
    }

    async fn list_menus(
        &self,
        available_only: bool,
    ) -> Result<Vec<MenuDetail>, Box<dyn std::error::Error + Send + Sync>> {
        let rows = if available_only {
            sqlx::query_as::<_, MenuRow>(&format!(
                "SELECT {MENU_COLUMNS} FROM menus WHERE available ORDER BY served_on DESC"
            ))
            .fetch_all(&self.pool)
            .await?
        } else {
            sqlx::query_as::<_, MenuRow>(&format!(
                "SELECT {MENU_COLUMNS} FROM menus ORDER BY served_on DESC"
            ))
            .fetch_all(&self.pool)
            .await?
        };

        let mut details = Vec::with_capacity(rows.len());
        for row in rows {
            let dishes = sqlx::query_as::<_, DishRow>(&format!(
                "SELECT {DISH_COLUMNS} FROM dishes WHERE menu_id = $1 ORDER BY name"
            ))
            .bind(row.id)
            .fetch_all(&self.pool)
            .await?;

            details.push(MenuDetail::new(
                MenuOffering::from(row),
                dishes.into_iter().map(Dish::from).collect(),
            ));
        }

        Ok(details)
    }

    async fn set_menu_availability(
        &self,
        id: Uuid,
        available: bool,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        let result =
            sqlx::query("UPDATE menus SET available = $1, updated_at = NOW() WHERE id = $2")
                .bind(available)
                .bind(id)
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_menu(
        &self,
        id: Uuid,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        let result = sqlx::query("DELETE FROM menus WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
