//! HTTP handlers for catalog endpoints (components and products)

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use shared::models::{Component, ComponentType, Product};

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::catalog::{
    CatalogService, CreateComponentInput, CreateProductInput, UpdateComponentInput,
    UpdateProductInput,
};
use crate::AppState;

/// Query parameters for listing components
#[derive(Debug, Deserialize)]
pub struct ListComponentsQuery {
    pub search: Option<String>,
    pub component_type: Option<ComponentType>,
}

/// Query parameters for listing products
#[derive(Debug, Deserialize)]
pub struct ListProductsQuery {
    #[serde(default)]
    pub include_inactive: bool,
}

/// Create a component
pub async fn create_component(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Json(input): Json<CreateComponentInput>,
) -> AppResult<Json<Component>> {
    let service = CatalogService::new(state.db);
    let component = service.create_component(input).await?;
    Ok(Json(component))
}

/// List components
pub async fn list_components(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(query): Query<ListComponentsQuery>,
) -> AppResult<Json<Vec<Component>>> {
    let service = CatalogService::new(state.db);
    let components = service
        .list_components(query.search.as_deref(), query.component_type)
        .await?;
    Ok(Json(components))
}

/// Get one component
pub async fn get_component(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(component_id): Path<Uuid>,
) -> AppResult<Json<Component>> {
    let service = CatalogService::new(state.db);
    let component = service.get_component(component_id).await?;
    Ok(Json(component))
}

/// Update a component's descriptive fields
pub async fn update_component(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(component_id): Path<Uuid>,
    Json(input): Json<UpdateComponentInput>,
) -> AppResult<Json<Component>> {
    let service = CatalogService::new(state.db);
    let component = service.update_component(component_id, input).await?;
    Ok(Json(component))
}

/// Delete a component
pub async fn delete_component(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(component_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    let service = CatalogService::new(state.db);
    service.delete_component(component_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Create a product
pub async fn create_product(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Json(input): Json<CreateProductInput>,
) -> AppResult<Json<Product>> {
    let service = CatalogService::new(state.db);
    let product = service.create_product(input).await?;
    Ok(Json(product))
}

/// List products
pub async fn list_products(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(query): Query<ListProductsQuery>,
) -> AppResult<Json<Vec<Product>>> {
    let service = CatalogService::new(state.db);
    let products = service.list_products(query.include_inactive).await?;
    Ok(Json(products))
}

/// Get one product
pub async fn get_product(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(product_id): Path<Uuid>,
) -> AppResult<Json<Product>> {
    let service = CatalogService::new(state.db);
    let product = service.get_product(product_id).await?;
    Ok(Json(product))
}

/// Update a product's descriptive fields
pub async fn update_product(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(product_id): Path<Uuid>,
    Json(input): Json<UpdateProductInput>,
) -> AppResult<Json<Product>> {
    let service = CatalogService::new(state.db);
    let product = service.update_product(product_id, input).await?;
    Ok(Json(product))
}

/// Deactivate a product (soft delete)
pub async fn deactivate_product(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(product_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    let service = CatalogService::new(state.db);
    service.deactivate_product(product_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
