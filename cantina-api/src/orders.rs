use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::Deserialize;
use uuid::Uuid;

use cantina_core::{CoreError, LineKind};
use cantina_order::{DirectOrder, DishOrder, Order, OrderStatus};

use crate::{error::AppError, middleware::auth::Claims, state::AppState};

// ============================================================================
// Request Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub kind: LineKind,
    pub menu_id: Option<Uuid>,
    pub dishes: Option<Vec<DishOrderRequest>>,
}

#[derive(Debug, Deserialize)]
pub struct DishOrderRequest {
    pub dish_id: Uuid,
    pub quantity: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: OrderStatus,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /v1/cart/checkout
pub async fn checkout(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Order>, AppError> {
    let order = state.orders.checkout(&claims.purchaser()).await?;
    Ok(Json(order))
}

/// POST /v1/orders
/// Direct order, bypassing the cart.
pub async fn create_order(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateOrderRequest>,
) -> Result<Json<Order>, AppError> {
    let request = match req.kind {
        LineKind::WholeMenu => {
            let menu_id = req.menu_id.ok_or_else(|| {
                CoreError::InvalidInput("menu_id is required for WHOLE_MENU orders".to_string())
            })?;
            DirectOrder::WholeMenu { menu_id }
        }
        LineKind::Dish => {
            let dishes = req.dishes.unwrap_or_default();
            DirectOrder::ALaCarte {
                dishes: dishes
                    .into_iter()
                    .map(|dish| DishOrder {
                        dish_id: dish.dish_id,
                        quantity: dish.quantity,
                    })
                    .collect(),
            }
        }
    };

    let order = state
        .orders
        .create_order_direct(&claims.purchaser(), request)
        .await?;
    Ok(Json(order))
}

/// GET /v1/orders
pub async fn list_orders(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<Order>>, AppError> {
    let orders = state.orders.list_orders(&claims.sub).await?;
    Ok(Json(orders))
}

/// GET /v1/orders/{id}
pub async fn get_order(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(order_id): Path<Uuid>,
) -> Result<Json<Order>, AppError> {
    let order = state.orders.get_order(&claims.sub, order_id).await?;
    Ok(Json(order))
}

/// GET /v1/admin/orders
pub async fn list_all_orders(
    State(state): State<AppState>,
) -> Result<Json<Vec<Order>>, AppError> {
    let orders = state.orders.list_all_orders().await?;
    Ok(Json(orders))
}

/// PATCH /v1/admin/orders/{id}/status
/// Staff-driven lifecycle transition, guarded by the state machine.
pub async fn update_status(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<Json<Order>, AppError> {
    let order = state.orders.update_status(order_id, req.status).await?;
    Ok(Json(order))
}
