//! Next billing date calculation.
//!
//! A payment covers one month of classes for the student's plan. The next
//! charge falls once those classes have been given, moved forward to the
//! first training weekday.

use chrono::{Datelike, Days, NaiveDate};
use serde::Serialize;

use crate::entities::{plan::PlanId, training_day::is_training_day};

/// Every intermediate value of a billing date calculation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BillingBreakdown {
    pub payment_date: NaiveDate,
    pub plan_id: PlanId,
    pub classes_per_week: u32,
    pub total_classes: u32,
    pub weeks_needed: u32,
    pub candidate_date: NaiveDate,
    pub next_billing_date: NaiveDate,
    pub adjustment_days: u32,
}

pub fn billing_breakdown(payment_date: NaiveDate, plan_id: PlanId) -> BillingBreakdown {
    let classes_per_week = plan_id.frequency();
    let total_classes = plan_id.monthly_classes();
    // Always 4 with the current class table.
    let weeks_needed = total_classes.div_ceil(classes_per_week);

    let candidate_date = add_days_saturating(payment_date, u64::from(weeks_needed) * 7);

    let mut next_billing_date = candidate_date;
    let mut adjustment_days = 0;
    while !is_training_day(next_billing_date.weekday()) {
        let Some(next) = next_billing_date.succ_opt() else {
            break;
        };
        next_billing_date = next;
        adjustment_days += 1;
    }

    BillingBreakdown {
        payment_date,
        plan_id,
        classes_per_week,
        total_classes,
        weeks_needed,
        candidate_date,
        next_billing_date,
        adjustment_days,
    }
}

/// Date on which the payment made on `payment_date` runs out.
pub fn calculate_next_billing_date(payment_date: NaiveDate, plan_id: PlanId) -> NaiveDate {
    billing_breakdown(payment_date, plan_id).next_billing_date
}

fn add_days_saturating(date: NaiveDate, days: u64) -> NaiveDate {
    date.checked_add_days(Days::new(days)).unwrap_or(NaiveDate::MAX)
}
