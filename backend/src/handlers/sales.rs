//! HTTP handlers for sales transactions

use axum::{
    extract::{Path, Query, State},
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::handlers::purchases::TransactionListQuery;
use crate::services::sales::{CreateSalesInput, SalesService, SalesWithLines};
use crate::AppState;
use shared::models::SalesInvoice;
use shared::types::TransactionSort;

/// List sales invoices with optional keyword search and sort
pub async fn list_sales(
    State(state): State<AppState>,
    Query(query): Query<TransactionListQuery>,
) -> AppResult<Json<Vec<SalesInvoice>>> {
    let service = SalesService::new(state.db);
    let sort = TransactionSort::from_param(query.sort.as_deref().unwrap_or(""));
    let invoices = service
        .search_and_sort(query.keyword.as_deref(), sort)
        .await?;
    Ok(Json(invoices))
}

/// Create a sales invoice (prices are server-assigned)
pub async fn create_sale(
    State(state): State<AppState>,
    Json(input): Json<CreateSalesInput>,
) -> AppResult<Json<SalesWithLines>> {
    let service = SalesService::new(state.db);
    let invoice = service.create(input).await?;
    Ok(Json(invoice))
}

/// Get a sales invoice with its lines
pub async fn get_sale(
    State(state): State<AppState>,
    Path(invoice_id): Path<Uuid>,
) -> AppResult<Json<SalesWithLines>> {
    let service = SalesService::new(state.db);
    let invoice = service.get(invoice_id).await?;
    Ok(Json(invoice))
}

/// Complete a sales invoice, decrementing stock all-or-nothing
pub async fn complete_sale(
    State(state): State<AppState>,
    Path(invoice_id): Path<Uuid>,
) -> AppResult<Json<SalesWithLines>> {
    let service = SalesService::new(state.db);
    let invoice = service.complete(invoice_id).await?;
    Ok(Json(invoice))
}

/// Cancel a sales invoice, restoring stock if it was completed
pub async fn cancel_sale(
    State(state): State<AppState>,
    Path(invoice_id): Path<Uuid>,
) -> AppResult<Json<SalesWithLines>> {
    let service = SalesService::new(state.db);
    let invoice = service.cancel(invoice_id).await?;
    Ok(Json(invoice))
}
