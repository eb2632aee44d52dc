//! Purchase transaction service: the inbound-stock state machine
//!
//! Stock and price mutation is deferred to completion so a created but
//! not yet approved purchase never pollutes inventory. Completion
//! snapshots the previous purchase price per line, which makes
//! Completed → Cancelled a true inverse without a full audit log.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::models::{PurchaseLine, PurchaseOrder, TransactionStatus};
use shared::types::{line_subtotal, TransactionSort};

/// Purchase service owning the purchase order lifecycle
#[derive(Clone)]
pub struct PurchaseService {
    db: PgPool,
}

/// Input for creating a purchase order
#[derive(Debug, Deserialize)]
pub struct CreatePurchaseInput {
    pub supplier_id: Uuid,
    pub reference_number: String,
    pub lines: Vec<PurchaseLineInput>,
}

/// One draft line. Product and quantity are optional on purpose: lines
/// with a missing product or non-positive quantity are discarded rather
/// than rejected, matching the draft-form semantics of the create flow.
#[derive(Debug, Deserialize)]
pub struct PurchaseLineInput {
    pub product_id: Option<Uuid>,
    pub quantity: Option<i32>,
    pub unit_price: Option<Decimal>,
}

/// A purchase order together with its lines
#[derive(Debug, Serialize)]
pub struct PurchaseWithLines {
    #[serde(flatten)]
    pub order: PurchaseOrder,
    pub lines: Vec<PurchaseLine>,
}

/// List entry with the supplier name joined in
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct PurchaseListEntry {
    pub id: Uuid,
    pub supplier_id: Uuid,
    pub supplier_name: String,
    pub reference_number: String,
    pub total_amount: Decimal,
    pub status: TransactionStatus,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl PurchaseService {
    /// Create a new PurchaseService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create a purchase order in Created state. No catalog effect:
    /// stock is untouched until completion.
    pub async fn create(&self, input: CreatePurchaseInput) -> AppResult<PurchaseWithLines> {
        if input.reference_number.trim().is_empty() {
            return Err(AppError::Validation {
                field: "reference_number".to_string(),
                message: "Reference number is required".to_string(),
            });
        }

        // Supplier must exist
        let supplier_exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM suppliers WHERE id = $1)")
                .bind(input.supplier_id)
                .fetch_one(&self.db)
                .await?;

        if !supplier_exists {
            return Err(AppError::NotFound("Supplier".to_string()));
        }

        // Reference numbers are unique across all purchases
        let reference_taken = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM purchases WHERE reference_number = $1)",
        )
        .bind(input.reference_number.trim())
        .fetch_one(&self.db)
        .await?;

        if reference_taken {
            return Err(AppError::Conflict {
                resource: "reference_number".to_string(),
                message: "Reference number is already in use".to_string(),
            });
        }

        // Discard lines with a missing product or non-positive quantity
        let mut valid_lines: Vec<(Uuid, i32, Decimal)> = Vec::new();
        for line in &input.lines {
            let (Some(product_id), Some(quantity)) = (line.product_id, line.quantity) else {
                continue;
            };
            if quantity <= 0 {
                continue;
            }
            let unit_price = line.unit_price.unwrap_or(Decimal::ZERO);
            if unit_price <= Decimal::ZERO {
                return Err(AppError::Validation {
                    field: "unit_price".to_string(),
                    message: "Purchase price must be greater than zero".to_string(),
                });
            }
            valid_lines.push((product_id, quantity, unit_price));
        }

        let total_amount: Decimal = valid_lines
            .iter()
            .map(|(_, qty, price)| line_subtotal(*price, *qty))
            .sum();

        let mut tx = self.db.begin().await?;

        let order = sqlx::query_as::<_, PurchaseOrder>(
            r#"
            INSERT INTO purchases (supplier_id, reference_number, total_amount, status)
            VALUES ($1, $2, $3, 'created')
            RETURNING id, supplier_id, reference_number, total_amount, status, created_at
            "#,
        )
        .bind(input.supplier_id)
        .bind(input.reference_number.trim())
        .bind(total_amount)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match &e {
            // A concurrent create can slip past the pre-check; the
            // unique constraint still holds, surface it as a conflict
            sqlx::Error::Database(db) if db.is_unique_violation() => AppError::Conflict {
                resource: "reference_number".to_string(),
                message: "Reference number is already in use".to_string(),
            },
            _ => AppError::from(e),
        })?;

        let mut lines = Vec::with_capacity(valid_lines.len());
        for (line_no, (product_id, quantity, unit_price)) in valid_lines.iter().enumerate() {
            let line = sqlx::query_as::<_, PurchaseLine>(
                r#"
                INSERT INTO purchase_lines (purchase_id, line_no, product_id, quantity, unit_price, subtotal)
                VALUES ($1, $2, $3, $4, $5, $6)
                RETURNING id, purchase_id, product_id, quantity, unit_price, subtotal, price_before_completion
                "#,
            )
            .bind(order.id)
            .bind(line_no as i32)
            .bind(product_id)
            .bind(quantity)
            .bind(unit_price)
            .bind(line_subtotal(*unit_price, *quantity))
            .fetch_one(&mut *tx)
            .await?;
            lines.push(line);
        }

        tx.commit().await?;

        Ok(PurchaseWithLines { order, lines })
    }

    /// Complete a purchase: the only point where stock increases.
    ///
    /// Per line, the product's previous purchase price is snapshotted
    /// into the line before stock and price are overwritten, all within
    /// one database transaction.
    pub async fn complete(&self, id: Uuid) -> AppResult<PurchaseWithLines> {
        let mut tx = self.db.begin().await?;

        let order = lock_purchase(&mut tx, id).await?;

        if !order.status.can_transition_to(TransactionStatus::Completed) {
            return Err(AppError::InvalidStateTransition(format!(
                "Purchase {} cannot be completed from status {}",
                order.reference_number,
                order.status.as_str()
            )));
        }

        // Lock products in id order to avoid deadlocks between
        // concurrent transactions touching the same products
        let lines = fetch_lines_by_product(&mut tx, id).await?;

        for line in &lines {
            let previous_price = lock_product_purchase_price(&mut tx, line.product_id).await?;

            sqlx::query(
                "UPDATE purchase_lines SET price_before_completion = $1 WHERE id = $2",
            )
            .bind(previous_price)
            .bind(line.id)
            .execute(&mut *tx)
            .await?;

            sqlx::query(
                r#"
                UPDATE products
                SET current_stock = current_stock + $1,
                    last_purchase_price = $2,
                    updated_at = NOW()
                WHERE id = $3
                "#,
            )
            .bind(line.quantity)
            .bind(line.unit_price)
            .bind(line.product_id)
            .execute(&mut *tx)
            .await?;
        }

        let order = set_purchase_status(&mut tx, id, TransactionStatus::Completed).await?;
        let lines = fetch_lines_ordered(&mut tx, id).await?;

        tx.commit().await?;

        tracing::info!(purchase_id = %id, "purchase completed");

        Ok(PurchaseWithLines { order, lines })
    }

    /// Cancel a purchase. Created orders never touched stock, so they
    /// transition directly. Completed orders are reversed line by line:
    /// stock is decremented and the snapshotted purchase price restored
    /// where present.
    pub async fn cancel(&self, id: Uuid) -> AppResult<PurchaseWithLines> {
        let mut tx = self.db.begin().await?;

        let order = lock_purchase(&mut tx, id).await?;

        match order.status {
            TransactionStatus::Cancelled => {
                return Err(AppError::InvalidStateTransition(format!(
                    "Purchase {} is already cancelled",
                    order.reference_number
                )));
            }
            TransactionStatus::Created => {
                // No stock was ever added; no catalog effect
            }
            TransactionStatus::Completed => {
                let lines = fetch_lines_by_product(&mut tx, id).await?;

                // Lock the involved products in id order, same as the
                // completion path
                let mut locked: Option<Uuid> = None;
                for line in &lines {
                    if locked != Some(line.product_id) {
                        lock_product_purchase_price(&mut tx, line.product_id).await?;
                        locked = Some(line.product_id);
                    }
                }

                // Undo in reverse line order: when one product appears
                // on several lines the snapshots chain, and reversing
                // resolves the price back to where it stood before the
                // first line completed
                for line in lines.iter().rev() {
                    // Restore stock; restore the price only when a
                    // snapshot exists, otherwise leave it untouched
                    sqlx::query(
                        r#"
                        UPDATE products
                        SET current_stock = current_stock - $1,
                            last_purchase_price = COALESCE($2, last_purchase_price),
                            updated_at = NOW()
                        WHERE id = $3
                        "#,
                    )
                    .bind(line.quantity)
                    .bind(line.price_before_completion)
                    .bind(line.product_id)
                    .execute(&mut *tx)
                    .await?;
                }
            }
        }

        let order = set_purchase_status(&mut tx, id, TransactionStatus::Cancelled).await?;
        let lines = fetch_lines_ordered(&mut tx, id).await?;

        tx.commit().await?;

        tracing::info!(purchase_id = %id, "purchase cancelled");

        Ok(PurchaseWithLines { order, lines })
    }

    /// Get a purchase order with its lines
    pub async fn get(&self, id: Uuid) -> AppResult<PurchaseWithLines> {
        let order = sqlx::query_as::<_, PurchaseOrder>(
            r#"
            SELECT id, supplier_id, reference_number, total_amount, status, created_at
            FROM purchases
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Purchase".to_string()))?;

        let lines = sqlx::query_as::<_, PurchaseLine>(
            r#"
            SELECT id, purchase_id, product_id, quantity, unit_price, subtotal, price_before_completion
            FROM purchase_lines
            WHERE purchase_id = $1
            ORDER BY line_no
            "#,
        )
        .bind(id)
        .fetch_all(&self.db)
        .await?;

        Ok(PurchaseWithLines { order, lines })
    }

    /// Search and sort the purchase list. The keyword matches the
    /// reference number or supplier name, case-insensitively.
    pub async fn search_and_sort(
        &self,
        keyword: Option<&str>,
        sort: TransactionSort,
    ) -> AppResult<Vec<PurchaseListEntry>> {
        let order_by = match sort {
            TransactionSort::DateAsc => "p.created_at ASC",
            TransactionSort::DateDesc => "p.created_at DESC",
            TransactionSort::TotalAsc => "p.total_amount ASC",
            TransactionSort::TotalDesc => "p.total_amount DESC",
        };

        let query = format!(
            r#"
            SELECT p.id, p.supplier_id, s.name AS supplier_name, p.reference_number,
                   p.total_amount, p.status, p.created_at
            FROM purchases p
            JOIN suppliers s ON s.id = p.supplier_id
            WHERE ($1::text IS NULL
                   OR p.reference_number ILIKE '%' || $1 || '%'
                   OR s.name ILIKE '%' || $1 || '%')
            ORDER BY {}
            "#,
            order_by
        );

        let entries = sqlx::query_as::<_, PurchaseListEntry>(&query)
            .bind(keyword.filter(|k| !k.trim().is_empty()))
            .fetch_all(&self.db)
            .await?;

        Ok(entries)
    }
}

/// Lock the purchase header row so concurrent status changes serialize
async fn lock_purchase(
    tx: &mut Transaction<'_, Postgres>,
    id: Uuid,
) -> AppResult<PurchaseOrder> {
    sqlx::query_as::<_, PurchaseOrder>(
        r#"
        SELECT id, supplier_id, reference_number, total_amount, status, created_at
        FROM purchases
        WHERE id = $1
        FOR UPDATE
        "#,
    )
    .bind(id)
    .fetch_optional(&mut **tx)
    .await?
    .ok_or_else(|| AppError::NotFound("Purchase".to_string()))
}

/// Fetch lines ordered by product id for deterministic lock ordering
async fn fetch_lines_by_product(
    tx: &mut Transaction<'_, Postgres>,
    purchase_id: Uuid,
) -> AppResult<Vec<PurchaseLine>> {
    let lines = sqlx::query_as::<_, PurchaseLine>(
        r#"
        SELECT id, purchase_id, product_id, quantity, unit_price, subtotal, price_before_completion
        FROM purchase_lines
        WHERE purchase_id = $1
        ORDER BY product_id, line_no
        "#,
    )
    .bind(purchase_id)
    .fetch_all(&mut **tx)
    .await?;

    Ok(lines)
}

/// Fetch lines in display order
async fn fetch_lines_ordered(
    tx: &mut Transaction<'_, Postgres>,
    purchase_id: Uuid,
) -> AppResult<Vec<PurchaseLine>> {
    let lines = sqlx::query_as::<_, PurchaseLine>(
        r#"
        SELECT id, purchase_id, product_id, quantity, unit_price, subtotal, price_before_completion
        FROM purchase_lines
        WHERE purchase_id = $1
        ORDER BY line_no
        "#,
    )
    .bind(purchase_id)
    .fetch_all(&mut **tx)
    .await?;

    Ok(lines)
}

/// Lock a product row and return its current last purchase price
async fn lock_product_purchase_price(
    tx: &mut Transaction<'_, Postgres>,
    product_id: Uuid,
) -> AppResult<Decimal> {
    sqlx::query_scalar::<_, Decimal>(
        "SELECT last_purchase_price FROM products WHERE id = $1 FOR UPDATE",
    )
    .bind(product_id)
    .fetch_optional(&mut **tx)
    .await?
    .ok_or_else(|| AppError::NotFound("Product".to_string()))
}

async fn set_purchase_status(
    tx: &mut Transaction<'_, Postgres>,
    id: Uuid,
    status: TransactionStatus,
) -> AppResult<PurchaseOrder> {
    let order = sqlx::query_as::<_, PurchaseOrder>(
        r#"
        UPDATE purchases
        SET status = $1
        WHERE id = $2
        RETURNING id, supplier_id, reference_number, total_amount, status, created_at
        "#,
    )
    .bind(status)
    .bind(id)
    .fetch_one(&mut **tx)
    .await?;

    Ok(order)
}
