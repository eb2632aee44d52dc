//! Finance reporting service
//!
//! Read-only rollup over completed purchases and sales invoices for a
//! date range, plus a CSV export of the same report.

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgPool;

use crate::error::{AppError, AppResult};
use shared::models::FinanceSummary;

/// Finance service
#[derive(Clone)]
pub struct FinanceService {
    db: PgPool,
}

/// One income row (a completed sales invoice)
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct IncomeEntry {
    pub invoice_number: String,
    pub customer_name: String,
    pub total_amount: Decimal,
    pub created_at: DateTime<Utc>,
}

/// One expense row (a completed purchase)
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct ExpenseEntry {
    pub reference_number: String,
    pub supplier_name: String,
    pub total_amount: Decimal,
    pub created_at: DateTime<Utc>,
}

/// Full report: summary plus the underlying rows
#[derive(Debug, Serialize)]
pub struct FinanceReport {
    pub summary: FinanceSummary,
    pub incomes: Vec<IncomeEntry>,
    pub expenses: Vec<ExpenseEntry>,
}

impl FinanceService {
    /// Create a new FinanceService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Build the finance report for an inclusive date range
    pub async fn report(&self, start: NaiveDate, end: NaiveDate) -> AppResult<FinanceReport> {
        if start > end {
            return Err(AppError::ValidationError(
                "Start date must be before end date".to_string(),
            ));
        }

        // Full-day inclusive range
        let start_dt = Utc.from_utc_datetime(&start.and_time(NaiveTime::MIN));
        let end_dt = Utc.from_utc_datetime(
            &end.and_time(NaiveTime::from_hms_opt(23, 59, 59).expect("valid time")),
        );

        let incomes = sqlx::query_as::<_, IncomeEntry>(
            r#"
            SELECT invoice_number, customer_name, total_amount, created_at
            FROM sales_invoices
            WHERE status = 'completed' AND created_at BETWEEN $1 AND $2
            ORDER BY created_at
            "#,
        )
        .bind(start_dt)
        .bind(end_dt)
        .fetch_all(&self.db)
        .await?;

        let expenses = sqlx::query_as::<_, ExpenseEntry>(
            r#"
            SELECT p.reference_number, s.name AS supplier_name, p.total_amount, p.created_at
            FROM purchases p
            JOIN suppliers s ON s.id = p.supplier_id
            WHERE p.status = 'completed' AND p.created_at BETWEEN $1 AND $2
            ORDER BY p.created_at
            "#,
        )
        .bind(start_dt)
        .bind(end_dt)
        .fetch_all(&self.db)
        .await?;

        let total_income: Decimal = incomes.iter().map(|i| i.total_amount).sum();
        let total_expense: Decimal = expenses.iter().map(|e| e.total_amount).sum();

        let summary = FinanceSummary {
            start_date: start,
            end_date: end,
            total_income,
            total_expense,
            net_balance: total_income - total_expense,
            income_count: incomes.len() as i64,
            expense_count: expenses.len() as i64,
        };

        Ok(FinanceReport {
            summary,
            incomes,
            expenses,
        })
    }

    /// Render the report as CSV for download
    pub async fn export_csv(&self, start: NaiveDate, end: NaiveDate) -> AppResult<String> {
        let report = self.report(start, end).await?;

        let mut writer = csv::Writer::from_writer(Vec::new());

        writer
            .write_record(["section", "date", "reference", "counterparty", "total"])
            .map_err(|e| AppError::Internal(format!("CSV write failed: {}", e)))?;

        for income in &report.incomes {
            writer
                .write_record([
                    "income",
                    &income.created_at.date_naive().to_string(),
                    &income.invoice_number,
                    &income.customer_name,
                    &income.total_amount.to_string(),
                ])
                .map_err(|e| AppError::Internal(format!("CSV write failed: {}", e)))?;
        }

        for expense in &report.expenses {
            writer
                .write_record([
                    "expense",
                    &expense.created_at.date_naive().to_string(),
                    &expense.reference_number,
                    &expense.supplier_name,
                    &expense.total_amount.to_string(),
                ])
                .map_err(|e| AppError::Internal(format!("CSV write failed: {}", e)))?;
        }

        writer
            .write_record([
                "summary",
                &format!("{}..{}", report.summary.start_date, report.summary.end_date),
                "net_balance",
                "",
                &report.summary.net_balance.to_string(),
            ])
            .map_err(|e| AppError::Internal(format!("CSV write failed: {}", e)))?;

        let bytes = writer
            .into_inner()
            .map_err(|e| AppError::Internal(format!("CSV flush failed: {}", e)))?;

        String::from_utf8(bytes).map_err(|e| AppError::Internal(format!("CSV encoding: {}", e)))
    }
}
