//! HTTP handlers for purchase order endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use shared::models::{PurchaseOrder, PurchaseOrderItem};

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::purchase_order::{
    CreatePurchaseOrderInput, PurchaseOrderService, ReceiveItemsInput,
};
use crate::AppState;

/// Create a purchase order
pub async fn create_purchase_order(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Json(input): Json<CreatePurchaseOrderInput>,
) -> AppResult<Json<PurchaseOrder>> {
    let service = PurchaseOrderService::new(state.db);
    let order = service.create(input).await?;
    Ok(Json(order))
}

/// List purchase orders
pub async fn list_purchase_orders(
    State(state): State<AppState>,
    _current_user: CurrentUser,
) -> AppResult<Json<Vec<PurchaseOrder>>> {
    let service = PurchaseOrderService::new(state.db);
    let orders = service.list().await?;
    Ok(Json(orders))
}

/// Get one purchase order
pub async fn get_purchase_order(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(order_id): Path<Uuid>,
) -> AppResult<Json<PurchaseOrder>> {
    let service = PurchaseOrderService::new(state.db);
    let order = service.get(order_id).await?;
    Ok(Json(order))
}

/// Get the lines of a purchase order
pub async fn get_purchase_order_items(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(order_id): Path<Uuid>,
) -> AppResult<Json<Vec<PurchaseOrderItem>>> {
    let service = PurchaseOrderService::new(state.db);
    let items = service.get_items(order_id).await?;
    Ok(Json(items))
}

/// Approve a pending purchase order
pub async fn approve_purchase_order(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(order_id): Path<Uuid>,
) -> AppResult<Json<PurchaseOrder>> {
    let service = PurchaseOrderService::new(state.db);
    let order = service.approve(order_id).await?;
    Ok(Json(order))
}

/// Record a partial delivery
pub async fn receive_purchase_order_items(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(order_id): Path<Uuid>,
    Json(input): Json<ReceiveItemsInput>,
) -> AppResult<Json<PurchaseOrder>> {
    let service = PurchaseOrderService::new(state.db);
    let order = service
        .receive_items(order_id, current_user.0.employee_id, input)
        .await?;
    Ok(Json(order))
}

/// Receive everything still outstanding on the order
pub async fn receive_purchase_order_all(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(order_id): Path<Uuid>,
) -> AppResult<Json<PurchaseOrder>> {
    let service = PurchaseOrderService::new(state.db);
    let order = service
        .receive_all(order_id, current_user.0.employee_id)
        .await?;
    Ok(Json(order))
}

/// Cancel a pending purchase order
pub async fn cancel_purchase_order(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(order_id): Path<Uuid>,
) -> AppResult<Json<PurchaseOrder>> {
    let service = PurchaseOrderService::new(state.db);
    let order = service.cancel(order_id).await?;
    Ok(Json(order))
}

/// Delete a purchase order, reversing any received stock
pub async fn delete_purchase_order(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(order_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    let service = PurchaseOrderService::new(state.db);
    service.delete(order_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
