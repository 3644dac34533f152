use std::{collections::BTreeMap, sync::Arc};

use chrono::Datelike;
use serde::Serialize;
use tracing::instrument;

use crate::{
    app_error::AppResult,
    entities::plan::PlanCatalog,
    use_cases::student::StudentRepo,
};

/// Income expected from active students whose last payment fell in `month`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomeSummary {
    /// `YYYY-MM`
    pub month: String,
    pub total_cents: i64,
    pub currency: String,
    pub student_count: usize,
}

#[derive(Clone)]
pub struct ReportUseCases {
    repo: Arc<dyn StudentRepo>,
    catalog: Arc<PlanCatalog>,
}

impl ReportUseCases {
    pub fn new(repo: Arc<dyn StudentRepo>, catalog: Arc<PlanCatalog>) -> Self {
        Self { repo, catalog }
    }

    #[instrument(skip(self))]
    pub async fn monthly_income(&self, year: i32, month: u32) -> AppResult<IncomeSummary> {
        let students = self.repo.list(false).await?;
        let (total_cents, student_count) = students
            .iter()
            .filter(|s| s.payment_date.year() == year && s.payment_date.month() == month)
            .fold((0_i64, 0_usize), |(total, count), s| {
                (total + self.catalog.price_cents(s.plan_id), count + 1)
            });

        Ok(self.summary(year, month, total_cents, student_count))
    }

    /// One entry per month that has at least one payment, oldest first.
    pub async fn income_by_month(&self) -> AppResult<Vec<IncomeSummary>> {
        let students = self.repo.list(false).await?;

        let mut months: BTreeMap<(i32, u32), (i64, usize)> = BTreeMap::new();
        for student in &students {
            let key = (student.payment_date.year(), student.payment_date.month());
            let entry = months.entry(key).or_default();
            entry.0 += self.catalog.price_cents(student.plan_id);
            entry.1 += 1;
        }

        Ok(months
            .into_iter()
            .map(|((year, month), (total, count))| self.summary(year, month, total, count))
            .collect())
    }

    fn summary(&self, year: i32, month: u32, total_cents: i64, student_count: usize) -> IncomeSummary {
        IncomeSummary {
            month: format!("{year:04}-{month:02}"),
            total_cents,
            currency: self.catalog.currency().to_string(),
            student_count,
        }
    }
}
