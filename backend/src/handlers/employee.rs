//! HTTP handlers for employee endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use shared::models::Employee;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::employee::{CreateEmployeeInput, EmployeeService, UpdateEmployeeInput};
use crate::AppState;

/// Query parameters for listing employees
#[derive(Debug, Deserialize)]
pub struct ListEmployeesQuery {
    #[serde(default)]
    pub include_inactive: bool,
}

/// Create an employee
pub async fn create_employee(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Json(input): Json<CreateEmployeeInput>,
) -> AppResult<Json<Employee>> {
    let service = EmployeeService::new(state.db);
    let employee = service.create(input).await?;
    Ok(Json(employee))
}

/// List employees
pub async fn list_employees(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(query): Query<ListEmployeesQuery>,
) -> AppResult<Json<Vec<Employee>>> {
    let service = EmployeeService::new(state.db);
    let employees = service.list(query.include_inactive).await?;
    Ok(Json(employees))
}

/// Get one employee
pub async fn get_employee(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(employee_id): Path<Uuid>,
) -> AppResult<Json<Employee>> {
    let service = EmployeeService::new(state.db);
    let employee = service.get(employee_id).await?;
    Ok(Json(employee))
}

/// Update an employee (deactivation happens here via `active`)
pub async fn update_employee(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(employee_id): Path<Uuid>,
    Json(input): Json<UpdateEmployeeInput>,
) -> AppResult<Json<Employee>> {
    let service = EmployeeService::new(state.db);
    let employee = service.update(employee_id, input).await?;
    Ok(Json(employee))
}
