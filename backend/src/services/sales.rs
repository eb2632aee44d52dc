//! Sales transaction service: the outbound-stock state machine
//!
//! Unit prices are server-assigned from the catalog at creation time;
//! any price the caller supplies is ignored. Completion is all-or-nothing
//! against available stock. Unlike purchases, sales lines carry no price
//! snapshot: cancellation restores stock only.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::models::{SalesInvoice, SalesLine, TransactionStatus};
use shared::types::{apply_vat, line_subtotal, TransactionSort};

/// Sales service owning the sales invoice lifecycle
#[derive(Clone)]
pub struct SalesService {
    db: PgPool,
}

/// Input for creating a sales invoice
#[derive(Debug, Deserialize)]
pub struct CreateSalesInput {
    pub invoice_number: String,
    pub customer_name: String,
    pub vat_percentage: Option<Decimal>,
    pub lines: Vec<SalesLineInput>,
}

/// One draft invoice line. Only the product and quantity matter; the
/// unit price is read fresh from the catalog (server authority).
#[derive(Debug, Deserialize)]
pub struct SalesLineInput {
    pub product_id: Uuid,
    pub quantity: i32,
}

/// A sales invoice together with its lines
#[derive(Debug, Serialize)]
pub struct SalesWithLines {
    #[serde(flatten)]
    pub invoice: SalesInvoice,
    pub lines: Vec<SalesLine>,
}

/// Row used to check and update stock at completion time
#[derive(Debug, sqlx::FromRow)]
struct LockedStockRow {
    product_id: Uuid,
    product_name: String,
    current_stock: i32,
    quantity: i32,
}

impl SalesService {
    /// Create a new SalesService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create a sales invoice in Created state. Stock is untouched;
    /// prices and the total are computed server-side.
    pub async fn create(&self, input: CreateSalesInput) -> AppResult<SalesWithLines> {
        if input.lines.is_empty() {
            return Err(AppError::ValidationError(
                "Invoice must contain at least one product".to_string(),
            ));
        }

        if input.invoice_number.trim().is_empty() {
            return Err(AppError::Validation {
                field: "invoice_number".to_string(),
                message: "Invoice number is required".to_string(),
            });
        }

        if input.customer_name.trim().is_empty() {
            return Err(AppError::Validation {
                field: "customer_name".to_string(),
                message: "Customer name is required".to_string(),
            });
        }

        let vat_percentage = input.vat_percentage.unwrap_or(Decimal::ZERO);
        if vat_percentage < Decimal::ZERO {
            return Err(AppError::Validation {
                field: "vat_percentage".to_string(),
                message: "VAT percentage cannot be negative".to_string(),
            });
        }

        let number_taken = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM sales_invoices WHERE invoice_number = $1)",
        )
        .bind(input.invoice_number.trim())
        .fetch_one(&self.db)
        .await?;

        if number_taken {
            return Err(AppError::DuplicateEntry("invoice_number".to_string()));
        }

        // Batch-fetch the referenced products to avoid per-line lookups
        let product_ids: Vec<Uuid> = input.lines.iter().map(|l| l.product_id).collect();
        let products = sqlx::query_as::<_, (Uuid, String, Decimal)>(
            "SELECT id, name, standard_selling_price FROM products WHERE id = ANY($1)",
        )
        .bind(&product_ids)
        .fetch_all(&self.db)
        .await?;

        let product_map: HashMap<Uuid, (String, Decimal)> = products
            .into_iter()
            .map(|(id, name, price)| (id, (name, price)))
            .collect();

        let mut priced_lines: Vec<(Uuid, i32, Decimal, Decimal)> = Vec::new();
        let mut total = Decimal::ZERO;

        for line in &input.lines {
            let (name, unit_price) = product_map
                .get(&line.product_id)
                .ok_or_else(|| AppError::NotFound("Product".to_string()))?;

            if line.quantity <= 0 {
                return Err(AppError::Validation {
                    field: "quantity".to_string(),
                    message: "Quantity must be greater than zero".to_string(),
                });
            }

            // Server authority: the caller never supplies the price
            if *unit_price <= Decimal::ZERO {
                return Err(AppError::ValidationError(format!(
                    "No selling price set for product: {}",
                    name
                )));
            }

            let subtotal = line_subtotal(*unit_price, line.quantity);
            total += subtotal;
            priced_lines.push((line.product_id, line.quantity, *unit_price, subtotal));
        }

        let total_amount = apply_vat(total, vat_percentage);

        let mut tx = self.db.begin().await?;

        let invoice = sqlx::query_as::<_, SalesInvoice>(
            r#"
            INSERT INTO sales_invoices (invoice_number, customer_name, vat_percentage, total_amount, status)
            VALUES ($1, $2, $3, $4, 'created')
            RETURNING id, invoice_number, customer_name, vat_percentage, total_amount, status, created_at
            "#,
        )
        .bind(input.invoice_number.trim())
        .bind(input.customer_name.trim())
        .bind(vat_percentage)
        .bind(total_amount)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match &e {
            // A concurrent create can slip past the pre-check; the
            // unique constraint still holds, surface it as a conflict
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::DuplicateEntry("invoice_number".to_string())
            }
            _ => AppError::from(e),
        })?;

        let mut lines = Vec::with_capacity(priced_lines.len());
        for (line_no, (product_id, quantity, unit_price, subtotal)) in
            priced_lines.iter().enumerate()
        {
            let line = sqlx::query_as::<_, SalesLine>(
                r#"
                INSERT INTO sales_lines (invoice_id, line_no, product_id, quantity, unit_price, subtotal)
                VALUES ($1, $2, $3, $4, $5, $6)
                RETURNING id, invoice_id, product_id, quantity, unit_price, subtotal
                "#,
            )
            .bind(invoice.id)
            .bind(line_no as i32)
            .bind(product_id)
            .bind(quantity)
            .bind(unit_price)
            .bind(subtotal)
            .fetch_one(&mut *tx)
            .await?;
            lines.push(line);
        }

        tx.commit().await?;

        Ok(SalesWithLines { invoice, lines })
    }

    /// Complete a sales invoice, decrementing stock for every line.
    ///
    /// All lines are verified against current stock before any decrement
    /// is applied; if any product falls short, the whole call fails and
    /// no stock changes.
    pub async fn complete(&self, id: Uuid) -> AppResult<SalesWithLines> {
        let mut tx = self.db.begin().await?;

        let invoice = lock_invoice(&mut tx, id).await?;

        if !invoice.status.can_transition_to(TransactionStatus::Completed) {
            return Err(AppError::InvalidStateTransition(format!(
                "Invoice {} cannot be completed from status {}",
                invoice.invoice_number,
                invoice.status.as_str()
            )));
        }

        // Lock the involved products (ordered by id) and read stock
        let rows = sqlx::query_as::<_, LockedStockRow>(
            r#"
            SELECT p.id AS product_id, p.name AS product_name,
                   p.current_stock, l.quantity
            FROM sales_lines l
            JOIN products p ON p.id = l.product_id
            WHERE l.invoice_id = $1
            ORDER BY p.id
            FOR UPDATE OF p
            "#,
        )
        .bind(id)
        .fetch_all(&mut *tx)
        .await?;

        // Sum line quantities per product before checking: two lines for
        // the same product are one demand against its stock. Rows come
        // back ordered by product id, so a single pass folds them.
        let mut demands: Vec<LockedStockRow> = Vec::new();
        for row in rows {
            match demands.last_mut() {
                Some(demand) if demand.product_id == row.product_id => {
                    demand.quantity += row.quantity;
                }
                _ => demands.push(row),
            }
        }

        // Verify everything first so the completion is all-or-nothing
        for row in &demands {
            if row.current_stock < row.quantity {
                return Err(AppError::InsufficientStock(format!(
                    "Not enough stock for product: {}",
                    row.product_name
                )));
            }
        }

        for row in &demands {
            sqlx::query(
                "UPDATE products SET current_stock = current_stock - $1, updated_at = NOW() WHERE id = $2",
            )
            .bind(row.quantity)
            .bind(row.product_id)
            .execute(&mut *tx)
            .await?;
        }

        let invoice = set_invoice_status(&mut tx, id, TransactionStatus::Completed).await?;
        let lines = fetch_lines_ordered(&mut tx, id).await?;

        tx.commit().await?;

        tracing::info!(invoice_id = %id, "sales invoice completed");

        Ok(SalesWithLines { invoice, lines })
    }

    /// Cancel a sales invoice. A completed invoice has its stock fully
    /// restored; a created one never touched stock. No price restore:
    /// the selling price is catalog-wide, not per-transaction.
    pub async fn cancel(&self, id: Uuid) -> AppResult<SalesWithLines> {
        let mut tx = self.db.begin().await?;

        let invoice = lock_invoice(&mut tx, id).await?;

        match invoice.status {
            TransactionStatus::Cancelled => {
                return Err(AppError::InvalidStateTransition(format!(
                    "Invoice {} is already cancelled",
                    invoice.invoice_number
                )));
            }
            TransactionStatus::Created => {}
            TransactionStatus::Completed => {
                sqlx::query(
                    r#"
                    UPDATE products p
                    SET current_stock = p.current_stock + l.quantity,
                        updated_at = NOW()
                    FROM sales_lines l
                    WHERE l.invoice_id = $1 AND l.product_id = p.id
                    "#,
                )
                .bind(id)
                .execute(&mut *tx)
                .await?;
            }
        }

        let invoice = set_invoice_status(&mut tx, id, TransactionStatus::Cancelled).await?;
        let lines = fetch_lines_ordered(&mut tx, id).await?;

        tx.commit().await?;

        tracing::info!(invoice_id = %id, "sales invoice cancelled");

        Ok(SalesWithLines { invoice, lines })
    }

    /// Get a sales invoice with its lines
    pub async fn get(&self, id: Uuid) -> AppResult<SalesWithLines> {
        let invoice = sqlx::query_as::<_, SalesInvoice>(
            r#"
            SELECT id, invoice_number, customer_name, vat_percentage, total_amount, status, created_at
            FROM sales_invoices
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Invoice".to_string()))?;

        let lines = sqlx::query_as::<_, SalesLine>(
            r#"
            SELECT id, invoice_id, product_id, quantity, unit_price, subtotal
            FROM sales_lines
            WHERE invoice_id = $1
            ORDER BY line_no
            "#,
        )
        .bind(id)
        .fetch_all(&self.db)
        .await?;

        Ok(SalesWithLines { invoice, lines })
    }

    /// Search and sort the invoice list. The keyword matches the
    /// invoice number or customer name, case-insensitively.
    pub async fn search_and_sort(
        &self,
        keyword: Option<&str>,
        sort: TransactionSort,
    ) -> AppResult<Vec<SalesInvoice>> {
        let order_by = match sort {
            TransactionSort::DateAsc => "created_at ASC",
            TransactionSort::DateDesc => "created_at DESC",
            TransactionSort::TotalAsc => "total_amount ASC",
            TransactionSort::TotalDesc => "total_amount DESC",
        };

        let query = format!(
            r#"
            SELECT id, invoice_number, customer_name, vat_percentage, total_amount, status, created_at
            FROM sales_invoices
            WHERE ($1::text IS NULL
                   OR invoice_number ILIKE '%' || $1 || '%'
                   OR customer_name ILIKE '%' || $1 || '%')
            ORDER BY {}
            "#,
            order_by
        );

        let invoices = sqlx::query_as::<_, SalesInvoice>(&query)
            .bind(keyword.filter(|k| !k.trim().is_empty()))
            .fetch_all(&self.db)
            .await?;

        Ok(invoices)
    }
}

/// Lock the invoice header row so concurrent status changes serialize
async fn lock_invoice(tx: &mut Transaction<'_, Postgres>, id: Uuid) -> AppResult<SalesInvoice> {
    sqlx::query_as::<_, SalesInvoice>(
        r#"
        SELECT id, invoice_number, customer_name, vat_percentage, total_amount, status, created_at
        FROM sales_invoices
        WHERE id = $1
        FOR UPDATE
        "#,
    )
    .bind(id)
    .fetch_optional(&mut **tx)
    .await?
    .ok_or_else(|| AppError::NotFound("Invoice".to_string()))
}

async fn fetch_lines_ordered(
    tx: &mut Transaction<'_, Postgres>,
    invoice_id: Uuid,
) -> AppResult<Vec<SalesLine>> {
    let lines = sqlx::query_as::<_, SalesLine>(
        r#"
        SELECT id, invoice_id, product_id, quantity, unit_price, subtotal
        FROM sales_lines
        WHERE invoice_id = $1
        ORDER BY line_no
        "#,
    )
    .bind(invoice_id)
    .fetch_all(&mut **tx)
    .await?;

    Ok(lines)
}

async fn set_invoice_status(
    tx: &mut Transaction<'_, Postgres>,
    id: Uuid,
    status: TransactionStatus,
) -> AppResult<SalesInvoice> {
    let invoice = sqlx::query_as::<_, SalesInvoice>(
        r#"
        UPDATE sales_invoices
        SET status = $1
        WHERE id = $2
        RETURNING id, invoice_number, customer_name, vat_percentage, total_amount, status, created_at
        "#,
    )
    .bind(status)
    .bind(id)
    .fetch_one(&mut **tx)
    .await?;

    Ok(invoice)
}
