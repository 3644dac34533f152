use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use chrono::Datelike;
use serde::Deserialize;

use crate::{
    adapters::http::{app_state::AppState, routes::today},
    app_error::AppResult,
    use_cases::report::IncomeSummary,
    validators::parse_month,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/income", get(monthly_income))
        .route("/income/monthly", get(income_by_month))
}

#[derive(Deserialize)]
struct IncomeQuery {
    month: Option<String>,
}

/// GET /api/reports/income?month=YYYY-MM
/// Defaults to the current month.
async fn monthly_income(
    State(app_state): State<AppState>,
    Query(query): Query<IncomeQuery>,
) -> AppResult<Json<IncomeSummary>> {
    let (year, month) = match query.month.as_deref() {
        Some(raw) => parse_month(raw)?,
        None => {
            let today = today();
            (today.year(), today.month())
        }
    };

    let summary = app_state
        .report_use_cases
        .monthly_income(year, month)
        .await?;
    Ok(Json(summary))
}

/// GET /api/reports/income/monthly
async fn income_by_month(State(app_state): State<AppState>) -> AppResult<Json<Vec<IncomeSummary>>> {
    Ok(Json(app_state.report_use_cases.income_by_month().await?))
}
