use std::sync::Arc;

use crate::{
    infra::config::AppConfig,
    use_cases::{billing::BillingUseCases, report::ReportUseCases, student::StudentUseCases},
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub student_use_cases: Arc<StudentUseCases>,
    pub billing_use_cases: Arc<BillingUseCases>,
    pub report_use_cases: Arc<ReportUseCases>,
}
