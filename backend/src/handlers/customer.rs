//! HTTP handlers for customer endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use shared::models::Customer;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::customer::{CreateCustomerInput, CustomerService, UpdateCustomerInput};
use crate::AppState;

/// Query parameters for listing customers
#[derive(Debug, Deserialize)]
pub struct ListCustomersQuery {
    pub search: Option<String>,
}

/// Create a customer
pub async fn create_customer(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Json(input): Json<CreateCustomerInput>,
) -> AppResult<Json<Customer>> {
    let service = CustomerService::new(state.db);
    let customer = service.create(input).await?;
    Ok(Json(customer))
}

/// List customers
pub async fn list_customers(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(query): Query<ListCustomersQuery>,
) -> AppResult<Json<Vec<Customer>>> {
    let service = CustomerService::new(state.db);
    let customers = service.list(query.search.as_deref()).await?;
    Ok(Json(customers))
}

/// Get one customer
pub async fn get_customer(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(customer_id): Path<Uuid>,
) -> AppResult<Json<Customer>> {
    let service = CustomerService::new(state.db);
    let customer = service.get(customer_id).await?;
    Ok(Json(customer))
}

/// Update a customer
pub async fn update_customer(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(customer_id): Path<Uuid>,
    Json(input): Json<UpdateCustomerInput>,
) -> AppResult<Json<Customer>> {
    let service = CustomerService::new(state.db);
    let customer = service.update(customer_id, input).await?;
    Ok(Json(customer))
}

/// Delete a customer without orders on file
pub async fn delete_customer(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(customer_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    let service = CustomerService::new(state.db);
    service.delete(customer_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
