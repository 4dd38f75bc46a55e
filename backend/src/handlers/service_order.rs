//! HTTP handlers for service order endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use shared::models::{ComponentUsage, ServiceOrder, ServiceOrderStatus};

use crate::error::{AppError, AppResult};
use crate::middleware::CurrentUser;
use crate::services::service_order::{
    CreateServiceOrderInput, ServiceOrderService, UpdateServiceOrderInput,
};
use crate::AppState;

/// Query parameters for listing service orders
#[derive(Debug, Deserialize)]
pub struct ListServiceOrdersQuery {
    pub status: Option<String>,
    pub customer_id: Option<Uuid>,
}

/// Create a service order
pub async fn create_service_order(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateServiceOrderInput>,
) -> AppResult<Json<ServiceOrder>> {
    let service = ServiceOrderService::new(state.db);
    let order = service.create(current_user.0.employee_id, input).await?;
    Ok(Json(order))
}

/// List service orders, optionally filtered by status or customer
pub async fn list_service_orders(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(query): Query<ListServiceOrdersQuery>,
) -> AppResult<Json<Vec<ServiceOrder>>> {
    let service = ServiceOrderService::new(state.db);

    let orders = if let Some(status) = query.status.as_deref() {
        let status = ServiceOrderStatus::parse(status).ok_or_else(|| AppError::Validation {
            field: "status".to_string(),
            message: format!("Unknown status: {}", status),
            message_pt: format!("Status desconhecido: {}", status),
        })?;
        service.list_by_status(status).await?
    } else if let Some(customer_id) = query.customer_id {
        service.list_by_customer(customer_id).await?
    } else {
        service.list().await?
    };

    Ok(Json(orders))
}

/// Get one service order
pub async fn get_service_order(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(order_id): Path<Uuid>,
) -> AppResult<Json<ServiceOrder>> {
    let service = ServiceOrderService::new(state.db);
    let order = service.get(order_id).await?;
    Ok(Json(order))
}

/// Get the component usage rows of a service order
pub async fn get_service_order_components(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(order_id): Path<Uuid>,
) -> AppResult<Json<Vec<ComponentUsage>>> {
    let service = ServiceOrderService::new(state.db);
    let usage = service.get_usage(order_id).await?;
    Ok(Json(usage))
}

/// Update a service order (components list replaces the stored set)
pub async fn update_service_order(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(order_id): Path<Uuid>,
    Json(input): Json<UpdateServiceOrderInput>,
) -> AppResult<Json<ServiceOrder>> {
    let service = ServiceOrderService::new(state.db);
    let order = service.update(order_id, input).await?;
    Ok(Json(order))
}

/// Delete a service order, crediting its component usage back
pub async fn delete_service_order(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(order_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    let service = ServiceOrderService::new(state.db);
    service.delete(order_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
