use std::sync::Arc;

use serde::Serialize;
use tracing::instrument;

use crate::{
    app_error::AppResult,
    billing::{BillingBreakdown, billing_breakdown},
    entities::plan::{Plan, PlanCatalog, PlanId},
    validators::parse_calendar_date,
};

/// Result of a "what if they paid on this date" calculation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BillingPreview {
    #[serde(flatten)]
    pub breakdown: BillingBreakdown,
    /// Plan code as received, before any fallback.
    pub requested_plan_id: String,
    /// True when the requested code was unknown and `once_a_week` was used.
    pub plan_fallback: bool,
    pub plan: Plan,
}

#[derive(Clone)]
pub struct BillingUseCases {
    catalog: Arc<PlanCatalog>,
}

impl BillingUseCases {
    pub fn new(catalog: Arc<PlanCatalog>) -> Self {
        Self { catalog }
    }

    pub fn list_plans(&self) -> Vec<Plan> {
        self.catalog.all().to_vec()
    }

    /// Unknown plan codes are billed as `once_a_week` and flagged on the
    /// result. Malformed dates are rejected.
    #[instrument(skip(self))]
    pub fn preview(&self, payment_date: &str, plan_code: &str) -> AppResult<BillingPreview> {
        let payment_date = parse_calendar_date(payment_date, "paymentDate")?;

        let (plan_id, plan_fallback) = PlanId::resolve_code(plan_code);
        if plan_fallback {
            tracing::warn!(plan = plan_code, "Unknown plan code, previewing as once_a_week");
        }

        Ok(BillingPreview {
            breakdown: billing_breakdown(payment_date, plan_id),
            requested_plan_id: plan_code.to_string(),
            plan_fallback,
            plan: self.catalog.get(plan_id).clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app_error::AppError;
    use chrono::NaiveDate;

    fn use_cases() -> BillingUseCases {
        BillingUseCases::new(Arc::new(PlanCatalog::default()))
    }

    #[test]
    fn list_plans_returns_all_tiers() {
        let plans = use_cases().list_plans();
        let ids: Vec<PlanId> = plans.iter().map(|p| p.id).collect();
        assert_eq!(ids, PlanId::ALL.to_vec());
    }

    #[test]
    fn preview_known_plan() {
        let preview = use_cases()
            .preview("2024-10-01", "four_times_a_week")
            .unwrap();

        assert!(!preview.plan_fallback);
        assert_eq!(preview.plan.id, PlanId::FourTimesAWeek);
        assert_eq!(preview.plan.price_cents, 23_000);
        assert_eq!(
            preview.breakdown.next_billing_date,
            NaiveDate::from_ymd_opt(2024, 10, 30).unwrap()
        );
    }

    #[test]
    fn preview_unknown_plan_falls_back() {
        let preview = use_cases().preview("2024-10-01", "diamond").unwrap();

        assert!(preview.plan_fallback);
        assert_eq!(preview.requested_plan_id, "diamond");
        assert_eq!(preview.plan.id, PlanId::OnceAWeek);
        assert_eq!(preview.breakdown.plan_id, PlanId::OnceAWeek);
    }

    #[test]
    fn preview_rejects_malformed_date() {
        let result = use_cases().preview("2024/10/01", "once_a_week");
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }

    #[test]
    fn preview_serializes_flat_camel_case() {
        let preview = use_cases().preview("2024-10-01", "twice_a_week").unwrap();
        let json = serde_json::to_value(&preview).unwrap();

        assert_eq!(json["paymentDate"], "2024-10-01");
        assert_eq!(json["planId"], "twice_a_week");
        assert_eq!(json["candidateDate"], "2024-10-29");
        assert_eq!(json["nextBillingDate"], "2024-10-30");
        assert_eq!(json["adjustmentDays"], 1);
        assert_eq!(json["planFallback"], false);
        assert_eq!(json["plan"]["priceCents"], 17_000);
    }
}
