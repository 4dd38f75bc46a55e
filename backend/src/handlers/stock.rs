//! HTTP handlers for stock monitoring endpoints

use axum::{extract::State, Json};

use shared::models::LowStockItem;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::StockService;
use crate::AppState;

/// List every item at or below its reorder threshold
pub async fn list_low_stock(
    State(state): State<AppState>,
    _current_user: CurrentUser,
) -> AppResult<Json<Vec<LowStockItem>>> {
    let service = StockService::new(state.db);
    let items = service.list_low_stock().await?;
    Ok(Json(items))
}
