//! Route definitions for the Repair Shop Operations Platform

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use crate::{handlers, middleware::auth_middleware, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Protected routes - catalog
        .nest("/components", component_routes())
        .nest("/products", product_routes())
        // Protected routes - people
        .nest("/customers", customer_routes())
        .nest("/employees", employee_routes())
        // Protected routes - order machines
        .nest("/purchase-orders", purchase_order_routes())
        .nest("/sales", sale_routes())
        .nest("/service-orders", service_order_routes())
        // Protected routes - stock monitoring
        .nest("/stock", stock_routes())
        // Protected routes - money
        .nest("/commissions", commission_routes())
        .nest("/transactions", transaction_routes())
}

/// Component catalog routes (protected)
fn component_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_components).post(handlers::create_component),
        )
        .route(
            "/:component_id",
            get(handlers::get_component)
                .put(handlers::update_component)
                .delete(handlers::delete_component),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Product catalog routes (protected)
fn product_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_products).post(handlers::create_product),
        )
        .route(
            "/:product_id",
            get(handlers::get_product)
                .put(handlers::update_product)
                .delete(handlers::deactivate_product),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Customer routes (protected)
fn customer_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_customers).post(handlers::create_customer),
        )
        .route(
            "/:customer_id",
            get(handlers::get_customer)
                .put(handlers::update_customer)
                .delete(handlers::delete_customer),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Employee routes (protected)
fn employee_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_employees).post(handlers::create_employee),
        )
        .route(
            "/:employee_id",
            get(handlers::get_employee).put(handlers::update_employee),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Purchase order routes (protected)
fn purchase_order_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_purchase_orders).post(handlers::create_purchase_order),
        )
        .route(
            "/:order_id",
            get(handlers::get_purchase_order).delete(handlers::delete_purchase_order),
        )
        .route("/:order_id/items", get(handlers::get_purchase_order_items))
        .route("/:order_id/approve", post(handlers::approve_purchase_order))
        .route(
            "/:order_id/receive",
            post(handlers::receive_purchase_order_items),
        )
        .route(
            "/:order_id/receive-all",
            post(handlers::receive_purchase_order_all),
        )
        .route("/:order_id/cancel", post(handlers::cancel_purchase_order))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Sale routes (protected)
fn sale_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_sales).post(handlers::create_sale))
        .route(
            "/:sale_id",
            get(handlers::get_sale).delete(handlers::delete_sale),
        )
        .route("/:sale_id/items", get(handlers::get_sale_items))
        .route("/:sale_id/status", put(handlers::change_sale_status))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Service order routes (protected)
fn service_order_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_service_orders).post(handlers::create_service_order),
        )
        .route(
            "/:order_id",
            get(handlers::get_service_order)
                .put(handlers::update_service_order)
                .delete(handlers::delete_service_order),
        )
        .route(
            "/:order_id/components",
            get(handlers::get_service_order_components),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Stock monitoring routes (protected)
fn stock_routes() -> Router<AppState> {
    Router::new()
        .route("/low", get(handlers::list_low_stock))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Commission routes (protected)
fn commission_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_commissions).post(handlers::calculate_commission),
        )
        .route("/pending", get(handlers::list_pending_commissions))
        .route("/total", get(handlers::commission_total))
        .route("/:commission_id/pay", post(handlers::pay_commission))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Financial ledger routes (protected)
fn transaction_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_transactions))
        .route_layer(middleware::from_fn(auth_middleware))
}
