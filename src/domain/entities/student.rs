use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

use crate::{billing::calculate_next_billing_date, entities::plan::PlanId};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EmergencyContact {
    pub name: String,
    pub phone: String,
    pub relationship: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Student {
    pub id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub plan_id: PlanId,
    pub payment_date: NaiveDate,
    /// Derived from `payment_date` and `plan_id`; never set on its own.
    pub next_billing_date: NaiveDate,
    pub avatar_url: Option<String>,
    pub is_active: bool,
    pub notes: Option<String>,
    pub emergency_contact: Option<EmergencyContact>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Student {
    pub fn expected_next_billing_date(&self) -> NaiveDate {
        calculate_next_billing_date(self.payment_date, self.plan_id)
    }

    pub fn has_consistent_billing_date(&self) -> bool {
        self.next_billing_date == self.expected_next_billing_date()
    }

    pub fn refresh_next_billing_date(&mut self) {
        self.next_billing_date = self.expected_next_billing_date();
    }

    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.next_billing_date < today
    }

    /// Stored avatar, or a generated initials avatar when none was uploaded.
    pub fn display_avatar_url(&self, avatar_base_url: &Url) -> String {
        match self.avatar_url.as_deref().map(str::trim) {
            Some(url) if !url.is_empty() => url.to_string(),
            _ => {
                let mut url = avatar_base_url.clone();
                url.query_pairs_mut()
                    .append_pair("name", &self.name)
                    .append_pair("background", "0ea5e9")
                    .append_pair("color", "fff");
                url.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::create_test_student;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_refresh_restores_invariant() {
        let mut student = create_test_student(|s| {
            s.payment_date = date("2024-10-01");
            s.plan_id = PlanId::FourTimesAWeek;
            s.next_billing_date = date("2024-10-31");
        });
        assert!(!student.has_consistent_billing_date());

        student.refresh_next_billing_date();

        assert!(student.has_consistent_billing_date());
        assert_eq!(student.next_billing_date, date("2024-10-30"));
    }

    #[test]
    fn test_is_overdue() {
        let student = create_test_student(|s| s.next_billing_date = date("2024-03-01"));
        assert!(student.is_overdue(date("2024-03-02")));
        assert!(!student.is_overdue(date("2024-03-01")));
        assert!(!student.is_overdue(date("2024-02-28")));
    }

    #[test]
    fn test_display_avatar_uses_stored_url() {
        let base = Url::parse("https://ui-avatars.com/api/").unwrap();
        let student =
            create_test_student(|s| s.avatar_url = Some("https://cdn.test/a.png".to_string()));
        assert_eq!(student.display_avatar_url(&base), "https://cdn.test/a.png");
    }

    #[test]
    fn test_display_avatar_generates_from_name() {
        let base = Url::parse("https://ui-avatars.com/api/").unwrap();
        let student = create_test_student(|s| {
            s.name = "Ana María".to_string();
            s.avatar_url = Some("  ".to_string());
        });
        let url = student.display_avatar_url(&base);
        assert!(url.starts_with("https://ui-avatars.com/api/?name=Ana+Mar%C3%ADa"));
        assert!(url.ends_with("&background=0ea5e9&color=fff"));
    }
}
