//! Finance reporting handlers

use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::finance::FinanceService;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ReportQuery {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// "json" (default) or "csv"
    pub format: Option<String>,
}

/// Finance report for an inclusive date range, as JSON or CSV
pub async fn finance_report(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<ReportQuery>,
) -> AppResult<Response> {
    let service = FinanceService::new(state.db);

    tracing::info!(
        user_id = %user.user_id,
        start = %query.start_date,
        end = %query.end_date,
        "finance report requested"
    );

    if query.format.as_deref() == Some("csv") {
        let csv = service.export_csv(query.start_date, query.end_date).await?;
        let filename = format!(
            "finance-report-{}-{}.csv",
            query.start_date, query.end_date
        );
        let headers = [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ];
        return Ok((headers, csv).into_response());
    }

    let report = service.report(query.start_date, query.end_date).await?;
    Ok(Json(report).into_response())
}
