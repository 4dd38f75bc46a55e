//! HTTP handlers for the financial ledger

use axum::{
    extract::{Query, State},
    Json,
};

use shared::models::FinancialTransaction;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::transaction::{ListTransactionsFilter, TransactionService};
use crate::AppState;

/// List ledger entries, optionally filtered by direction and date range
pub async fn list_transactions(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(filter): Query<ListTransactionsFilter>,
) -> AppResult<Json<Vec<FinancialTransaction>>> {
    let service = TransactionService::new(state.db);
    let transactions = service.list(filter).await?;
    Ok(Json(transactions))
}
