//! Test data factories for creating valid test fixtures.
//!
//! Each factory function creates a complete, valid object with sensible defaults.
//! Use the closure parameter to override specific fields as needed. Overrides are
//! applied as-is, so a test can build a record with an inconsistent billing date.

use chrono::{NaiveDate, NaiveDateTime};
use uuid::Uuid;

use crate::{
    billing::calculate_next_billing_date,
    entities::{plan::PlanId, student::Student},
};

/// Create a test student whose next billing date matches its payment date and plan.
pub fn create_test_student(overrides: impl FnOnce(&mut Student)) -> Student {
    let payment_date = test_date();
    let mut student = Student {
        id: Uuid::new_v4(),
        name: "Test Student".to_string(),
        email: Some("student@example.com".to_string()),
        phone: Some("987654321".to_string()),
        plan_id: PlanId::TwiceAWeek,
        payment_date,
        next_billing_date: calculate_next_billing_date(payment_date, PlanId::TwiceAWeek),
        avatar_url: None,
        is_active: true,
        notes: None,
        emergency_contact: None,
        created_at: test_datetime(),
        updated_at: test_datetime(),
    };
    overrides(&mut student);
    student
}

/// Fixed date for deterministic tests: Monday 2024-01-15.
pub fn test_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
}

/// Fixed timestamp for deterministic tests.
pub fn test_datetime() -> NaiveDateTime {
    test_date().and_hms_opt(12, 0, 0).unwrap()
}
