//! HTTP handlers for the product catalog

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::product::{CreateProductInput, ProductService, UpdateProductInput};
use crate::AppState;
use shared::models::{Product, ProductStatus};
use shared::types::ProductSort;

#[derive(Debug, Deserialize)]
pub struct ProductListQuery {
    pub keyword: Option<String>,
    pub status: Option<ProductStatus>,
    #[serde(default)]
    pub sort: Option<String>,
}

/// List products with optional keyword, status filter, and sort
pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ProductListQuery>,
) -> AppResult<Json<Vec<Product>>> {
    let service = ProductService::new(state.db);
    let sort = ProductSort::from_param(query.sort.as_deref().unwrap_or(""));
    // Hidden products only appear when asked for explicitly (admin pages)
    let status = query.status.or(Some(ProductStatus::Active));
    let products = service
        .search_and_sort(query.keyword.as_deref(), status, sort)
        .await?;
    Ok(Json(products))
}

/// Create a product
pub async fn create_product(
    State(state): State<AppState>,
    Json(input): Json<CreateProductInput>,
) -> AppResult<Json<Product>> {
    let service = ProductService::new(state.db);
    let product = service.create(input).await?;
    Ok(Json(product))
}

/// Get a product by id
pub async fn get_product(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
) -> AppResult<Json<Product>> {
    let service = ProductService::new(state.db);
    let product = service.get(product_id).await?;
    Ok(Json(product))
}

/// Partially update product info
pub async fn update_product(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
    Json(input): Json<UpdateProductInput>,
) -> AppResult<Json<Product>> {
    let service = ProductService::new(state.db);
    let product = service.update_info(product_id, input).await?;
    Ok(Json(product))
}

/// List hidden products (admin only, gated at the route layer)
pub async fn list_hidden_products(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<Product>>> {
    let service = ProductService::new(state.db);
    let products = service.list_by_status(ProductStatus::Hidden).await?;
    Ok(Json(products))
}

/// Hide a product (admin only)
pub async fn hide_product(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
) -> AppResult<Json<Product>> {
    let service = ProductService::new(state.db);
    let product = service.hide(product_id).await?;
    Ok(Json(product))
}

/// Re-activate a hidden product (admin only)
pub async fn unhide_product(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
) -> AppResult<Json<Product>> {
    let service = ProductService::new(state.db);
    let product = service.unhide(product_id).await?;
    Ok(Json(product))
}
