//! HTTP handlers for commission endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shared::models::Commission;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::commission::{
    CalculateCommissionInput, CommissionService, ListCommissionsFilter,
};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct PendingCommissionsQuery {
    pub employee_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct CommissionTotalQuery {
    pub employee_id: Uuid,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct CommissionTotal {
    pub employee_id: Uuid,
    pub total: Decimal,
}

/// Calculate and record a commission
pub async fn calculate_commission(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Json(input): Json<CalculateCommissionInput>,
) -> AppResult<Json<Commission>> {
    let service = CommissionService::new(state.db);
    let commission = service.calculate(input).await?;
    Ok(Json(commission))
}

/// List commissions, optionally filtered by employee and date range
pub async fn list_commissions(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(filter): Query<ListCommissionsFilter>,
) -> AppResult<Json<Vec<Commission>>> {
    let service = CommissionService::new(state.db);
    let commissions = service.list(filter).await?;
    Ok(Json(commissions))
}

/// List unpaid commissions
pub async fn list_pending_commissions(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(query): Query<PendingCommissionsQuery>,
) -> AppResult<Json<Vec<Commission>>> {
    let service = CommissionService::new(state.db);
    let commissions = service.list_pending(query.employee_id).await?;
    Ok(Json(commissions))
}

/// Mark a commission as paid
pub async fn pay_commission(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(commission_id): Path<Uuid>,
) -> AppResult<Json<Commission>> {
    let service = CommissionService::new(state.db);
    let commission = service.pay(commission_id).await?;
    Ok(Json(commission))
}

/// Total commission earned by an employee over a date range
pub async fn commission_total(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(query): Query<CommissionTotalQuery>,
) -> AppResult<Json<CommissionTotal>> {
    let service = CommissionService::new(state.db);
    let total = service
        .total_for_employee(query.employee_id, query.from, query.to)
        .await?;
    Ok(Json(CommissionTotal {
        employee_id: query.employee_id,
        total,
    }))
}
