//! Route definitions for the Inventory Back Office API

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};

use crate::{
    handlers,
    middleware::{auth_middleware, require_admin},
    AppState,
};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check (public)
        .route("/health", get(handlers::health_check))
        // Auth routes (public)
        .nest("/auth", auth_routes())
        // Protected routes - product catalog
        .nest("/products", product_routes())
        // Protected routes - supplier directory
        .nest("/suppliers", supplier_routes())
        // Protected routes - purchase transactions
        .nest("/purchases", purchase_routes())
        // Protected routes - sales transactions
        .nest("/sales", sales_routes())
        // Protected routes - finance reporting
        .nest("/reports", report_routes())
        // Admin-only routes
        .nest("/admin", admin_routes())
}

/// Authentication routes (public)
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(handlers::register))
        .route("/login", post(handlers::login))
}

/// Product catalog routes (protected)
fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_products).post(handlers::create_product))
        .route(
            "/:product_id",
            get(handlers::get_product).put(handlers::update_product),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Supplier directory routes (protected)
fn supplier_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_suppliers).post(handlers::create_supplier))
        .route(
            "/:supplier_id",
            get(handlers::get_supplier)
                .put(handlers::update_supplier)
                .delete(handlers::delete_supplier),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Purchase transaction routes (protected)
fn purchase_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_purchases).post(handlers::create_purchase))
        .route("/:purchase_id", get(handlers::get_purchase))
        .route("/:purchase_id/complete", post(handlers::complete_purchase))
        .route("/:purchase_id/cancel", post(handlers::cancel_purchase))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Sales transaction routes (protected)
fn sales_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_sales).post(handlers::create_sale))
        .route("/:invoice_id", get(handlers::get_sale))
        .route("/:invoice_id/complete", post(handlers::complete_sale))
        .route("/:invoice_id/cancel", post(handlers::cancel_sale))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Finance reporting routes (protected)
fn report_routes() -> Router<AppState> {
    Router::new()
        .route("/finance", get(handlers::finance_report))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Admin routes. Layered so auth runs first, then the role check.
fn admin_routes() -> Router<AppState> {
    Router::new()
        // User approval workflow
        .route("/users", get(handlers::list_users))
        .route("/users/pending", get(handlers::list_pending_users))
        .route("/users/counts", get(handlers::user_counts))
        .route("/users/approve-all", post(handlers::approve_all_users))
        .route("/users/:user_id/approve", post(handlers::approve_user))
        .route("/users/:user_id/reject", post(handlers::reject_user))
        .route("/users/:user_id/ban", post(handlers::ban_user))
        .route("/users/:user_id", delete(handlers::delete_user))
        // Product visibility
        .route("/products/hidden", get(handlers::list_hidden_products))
        .route("/products/:product_id/hide", put(handlers::hide_product))
        .route("/products/:product_id/unhide", put(handlers::unhide_product))
        .route_layer(middleware::from_fn(require_admin))
        .route_layer(middleware::from_fn(auth_middleware))
}
