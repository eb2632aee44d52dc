//! HTTP handlers for purchase transactions

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::purchase::{
    CreatePurchaseInput, PurchaseListEntry, PurchaseService, PurchaseWithLines,
};
use crate::AppState;
use shared::types::TransactionSort;

#[derive(Debug, Deserialize)]
pub struct TransactionListQuery {
    pub keyword: Option<String>,
    pub sort: Option<String>,
}

/// List purchases with optional keyword search and sort
pub async fn list_purchases(
    State(state): State<AppState>,
    Query(query): Query<TransactionListQuery>,
) -> AppResult<Json<Vec<PurchaseListEntry>>> {
    let service = PurchaseService::new(state.db);
    let sort = TransactionSort::from_param(query.sort.as_deref().unwrap_or(""));
    let purchases = service
        .search_and_sort(query.keyword.as_deref(), sort)
        .await?;
    Ok(Json(purchases))
}

/// Create a purchase order (status starts as created)
pub async fn create_purchase(
    State(state): State<AppState>,
    Json(input): Json<CreatePurchaseInput>,
) -> AppResult<Json<PurchaseWithLines>> {
    let service = PurchaseService::new(state.db);
    let purchase = service.create(input).await?;
    Ok(Json(purchase))
}

/// Get a purchase order with its lines
pub async fn get_purchase(
    State(state): State<AppState>,
    Path(purchase_id): Path<Uuid>,
) -> AppResult<Json<PurchaseWithLines>> {
    let service = PurchaseService::new(state.db);
    let purchase = service.get(purchase_id).await?;
    Ok(Json(purchase))
}

/// Complete a purchase, applying stock and price changes
pub async fn complete_purchase(
    State(state): State<AppState>,
    Path(purchase_id): Path<Uuid>,
) -> AppResult<Json<PurchaseWithLines>> {
    let service = PurchaseService::new(state.db);
    let purchase = service.complete(purchase_id).await?;
    Ok(Json(purchase))
}

/// Cancel a purchase, reversing its catalog effects if completed
pub async fn cancel_purchase(
    State(state): State<AppState>,
    Path(purchase_id): Path<Uuid>,
) -> AppResult<Json<PurchaseWithLines>> {
    let service = PurchaseService::new(state.db);
    let purchase = service.cancel(purchase_id).await?;
    Ok(Json(purchase))
}
