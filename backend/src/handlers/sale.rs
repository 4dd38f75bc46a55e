//! HTTP handlers for point-of-sale endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use shared::models::{Sale, SaleItem};

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::sale::{ChangeSaleStatusInput, CreateSaleInput, SaleService};
use crate::AppState;

/// Create a sale (debits product stock)
pub async fn create_sale(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Json(input): Json<CreateSaleInput>,
) -> AppResult<Json<Sale>> {
    let service = SaleService::new(state.db);
    let sale = service.create(input).await?;
    Ok(Json(sale))
}

/// List sales
pub async fn list_sales(
    State(state): State<AppState>,
    _current_user: CurrentUser,
) -> AppResult<Json<Vec<Sale>>> {
    let service = SaleService::new(state.db);
    let sales = service.list().await?;
    Ok(Json(sales))
}

/// Get one sale
pub async fn get_sale(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(sale_id): Path<Uuid>,
) -> AppResult<Json<Sale>> {
    let service = SaleService::new(state.db);
    let sale = service.get(sale_id).await?;
    Ok(Json(sale))
}

/// Get the lines of a sale
pub async fn get_sale_items(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(sale_id): Path<Uuid>,
) -> AppResult<Json<Vec<SaleItem>>> {
    let service = SaleService::new(state.db);
    let items = service.get_items(sale_id).await?;
    Ok(Json(items))
}

/// Change a sale's status, replaying its stock effect
pub async fn change_sale_status(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(sale_id): Path<Uuid>,
    Json(input): Json<ChangeSaleStatusInput>,
) -> AppResult<Json<Sale>> {
    let service = SaleService::new(state.db);
    let sale = service.change_status(sale_id, input).await?;
    Ok(Json(sale))
}

/// Delete a sale, restoring its stock debit if completed
pub async fn delete_sale(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(sale_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    let service = SaleService::new(state.db);
    service.delete(sale_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
