use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use serde::Deserialize;

use crate::{
    adapters::http::{app_state::AppState, extract::AppJson},
    app_error::AppResult,
    entities::plan::Plan,
    use_cases::billing::BillingPreview,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/plans", get(list_plans))
        .route("/billing/preview", post(preview))
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct PreviewPayload {
    payment_date: String,
    plan_id: String,
}

/// GET /api/plans
async fn list_plans(State(app_state): State<AppState>) -> Json<Vec<Plan>> {
    Json(app_state.billing_use_cases.list_plans())
}

/// POST /api/billing/preview
/// Shows how a payment on `paymentDate` would be billed, step by step.
async fn preview(
    State(app_state): State<AppState>,
    AppJson(payload): AppJson<PreviewPayload>,
) -> AppResult<Json<BillingPreview>> {
    let preview = app_state
        .billing_use_cases
        .preview(&payload.payment_date, &payload.plan_id)?;
    Ok(Json(preview))
}
