use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use cantina_catalog::{MenuDetail, NewDish, NewMenuOffering};
use cantina_core::{CoreError, NotificationSink};
use cantina_shared::models::events::{MenuDishPayload, MenuPublishedEvent};

use crate::{cart::SuccessResponse, error::AppError, state::AppState};

// ============================================================================
// Request Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateMenuRequest {
    pub name: String,
    pub description: Option<String>,
    pub price_cents: i32,
    pub served_on: NaiveDate,
    #[serde(default)]
    pub dishes: Vec<CreateDishRequest>,
}

#[derive(Debug, Deserialize)]
pub struct CreateDishRequest {
    pub name: String,
    pub description: Option<String>,
    pub price_cents: i32,
    pub image_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateMenuRequest {
    pub available: bool,
}

// ============================================================================
// Browsing Handlers
// ============================================================================

/// GET /v1/menus
/// Offerings users can currently order from.
pub async fn list_menus(State(state): State<AppState>) -> Result<Json<Vec<MenuDetail>>, AppError> {
    let menus = state
        .catalog
        .list_menus(true)
        .await
        .map_err(CoreError::unexpected)?;
    Ok(Json(menus))
}

/// GET /v1/menus/{id}
pub async fn get_menu(
    State(state): State<AppState>,
    Path(menu_id): Path<Uuid>,
) -> Result<Json<MenuDetail>, AppError> {
    let menu = state
        .catalog
        .get_menu_detail(menu_id)
        .await
        .map_err(CoreError::unexpected)?
        .ok_or(CoreError::NotFound("menu"))?;
    Ok(Json(menu))
}

// ============================================================================
// Staff Handlers
// ============================================================================

/// GET /v1/admin/menus
/// Every offering, including unavailable ones.
pub async fn list_all_menus(
    State(state): State<AppState>,
) -> Result<Json<Vec<MenuDetail>>, AppError> {
    let menus = state
        .catalog
        .list_menus(false)
        .await
        .map_err(CoreError::unexpected)?;
    Ok(Json(menus))
}

/// POST /v1/admin/menus
pub async fn create_menu(
    State(state): State<AppState>,
    Json(req): Json<CreateMenuRequest>,
) -> Result<Json<MenuDetail>, AppError> {
    if req.name.trim().is_empty() {
        return Err(CoreError::InvalidInput("menu name is required".to_string()).into());
    }
    if req.price_cents < 0 || req.dishes.iter().any(|dish| dish.price_cents < 0) {
        return Err(CoreError::InvalidInput("prices must not be negative".to_string()).into());
    }

    let new_menu = NewMenuOffering {
        name: req.name,
        description: req.description,
        price_cents: req.price_cents,
        served_on: req.served_on,
        dishes: req
            .dishes
            .into_iter()
            .map(|dish| NewDish {
                name: dish.name,
                description: dish.description,
                price_cents: dish.price_cents,
                image_url: dish.image_url,
            })
            .collect(),
    };

    let detail = state
        .catalog
        .create_menu(&new_menu)
        .await
        .map_err(CoreError::unexpected)?;

    notify_menu_published(&state, &detail);
    Ok(Json(detail))
}

/// PATCH /v1/admin/menus/{id}
pub async fn update_menu(
    State(state): State<AppState>,
    Path(menu_id): Path<Uuid>,
    Json(req): Json<UpdateMenuRequest>,
) -> Result<Json<SuccessResponse>, AppError> {
    let found = state
        .catalog
        .set_menu_availability(menu_id, req.available)
        .await
        .map_err(CoreError::unexpected)?;

    if !found {
        return Err(CoreError::NotFound("menu").into());
    }
    Ok(Json(SuccessResponse { success: true }))
}

/// DELETE /v1/admin/menus/{id}
pub async fn delete_menu(
    State(state): State<AppState>,
    Path(menu_id): Path<Uuid>,
) -> Result<Json<SuccessResponse>, AppError> {
    let found = state
        .catalog
        .delete_menu(menu_id)
        .await
        .map_err(CoreError::unexpected)?;

    if !found {
        return Err(CoreError::NotFound("menu").into());
    }
    Ok(Json(SuccessResponse { success: true }))
}

/// Same best-effort contract as order notifications: detached, logged,
/// never surfaced.
fn notify_menu_published(state: &AppState, detail: &MenuDetail) {
    let sink = Arc::clone(&state.sink);
    let event = MenuPublishedEvent {
        id: detail.menu.id,
        name: detail.menu.name.clone(),
        description: detail.menu.description.clone(),
        price_cents: detail.menu.price_cents,
        available: detail.menu.available,
        served_on: detail.menu.served_on,
        created_at: detail.menu.created_at,
        dishes: detail
            .dishes
            .iter()
            .map(|dish| MenuDishPayload {
                id: dish.id,
                name: dish.name.clone(),
                description: dish.description.clone(),
                price_cents: dish.price_cents,
                image_url: dish.image_url.clone(),
            })
            .collect(),
    };

    tokio::spawn(async move {
        let payload = match serde_json::to_value(&event) {
            Ok(payload) => payload,
            Err(err) => {
                tracing::warn!("failed to serialize menu.published payload: {err}");
                return;
            }
        };
        if let Err(err) = sink.publish("menu.published", payload).await {
            tracing::warn!(menu_id = %event.id, "menu.published notification failed: {err}");
        }
    });
}
