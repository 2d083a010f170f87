use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::Deserialize;
use uuid::Uuid;

use cantina_cart::{AddItem, CartView};
use cantina_core::LineKind;

use crate::{error::AppError, middleware::auth::Claims, state::AppState};

// ============================================================================
// Request Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct AddItemsRequest {
    pub items: Vec<AddItemRequest>,
}

#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub kind: LineKind,
    pub menu_id: Option<Uuid>,
    pub dish_id: Option<Uuid>,
    pub quantity: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct SetQuantityRequest {
    pub quantity: Option<f64>,
}

#[derive(Debug, serde::Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /v1/cart
pub async fn read_cart(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<CartView>, AppError> {
    let view = state.cart.read_cart(&claims.sub).await?;
    Ok(Json(view))
}

/// POST /v1/cart/items
pub async fn add_items(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<AddItemsRequest>,
) -> Result<Json<CartView>, AppError> {
    let items: Vec<AddItem> = req
        .items
        .into_iter()
        .map(|item| AddItem {
            kind: item.kind,
            menu_id: item.menu_id,
            dish_id: item.dish_id,
            quantity: item.quantity,
        })
        .collect();

    let view = state.cart.add_items(&claims.sub, &items).await?;
    Ok(Json(view))
}

/// PATCH /v1/cart/lines/{line_id}
pub async fn set_quantity(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(line_id): Path<Uuid>,
    Json(req): Json<SetQuantityRequest>,
) -> Result<Json<SuccessResponse>, AppError> {
    state
        .cart
        .set_quantity(&claims.sub, line_id, req.quantity)
        .await?;
    Ok(Json(SuccessResponse { success: true }))
}

/// DELETE /v1/cart/lines/{line_id}
pub async fn remove_line(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(line_id): Path<Uuid>,
) -> Result<Json<SuccessResponse>, AppError> {
    state.cart.remove_line(&claims.sub, Some(line_id)).await?;
    Ok(Json(SuccessResponse { success: true }))
}

/// DELETE /v1/cart
pub async fn clear_cart(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<SuccessResponse>, AppError> {
    state.cart.remove_line(&claims.sub, None).await?;
    Ok(Json(SuccessResponse { success: true }))
}
