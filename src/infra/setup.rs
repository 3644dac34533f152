use std::{fs::File, path::Path, sync::Arc};

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    adapters::{http::app_state::AppState, persistence::InMemoryPersistence},
    entities::plan::PlanCatalog,
    infra::{config::AppConfig, error::InfraError, seed::seed_students},
    use_cases::{
        billing::BillingUseCases,
        report::ReportUseCases,
        student::{StudentRepo, StudentUseCases},
    },
};

pub async fn init_app_state(config: AppConfig) -> Result<AppState, InfraError> {
    let catalog = Arc::new(PlanCatalog::new(config.plan_prices, &config.currency));
    let store = Arc::new(InMemoryPersistence::new()) as Arc<dyn StudentRepo>;

    let student_use_cases = StudentUseCases::new(store.clone());
    let billing_use_cases = BillingUseCases::new(catalog.clone());
    let report_use_cases = ReportUseCases::new(store, catalog);

    if let Some(path) = config.students_seed_path.as_deref() {
        let report = seed_students(&student_use_cases, path).await?;
        tracing::info!(
            path = %path.display(),
            imported = report.imported,
            skipped = report.skipped,
            "Seeded students"
        );
    }

    Ok(AppState {
        config: Arc::new(config),
        student_use_cases: Arc::new(student_use_cases),
        billing_use_cases: Arc::new(billing_use_cases),
        report_use_cases: Arc::new(report_use_cases),
    })
}

pub fn init_tracing(log_file: Option<&Path>) -> Result<(), InfraError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "academia_billing=debug,tower_http=debug".into());

    // Console (pretty logs)
    let console_layer = fmt::layer().with_target(false).with_level(true).pretty();

    // File (structured JSON logs)
    let json_layer = match log_file {
        Some(path) => {
            let file = File::create(path).map_err(|source| InfraError::LogFile {
                path: path.to_path_buf(),
                source,
            })?;
            Some(
                fmt::layer()
                    .json()
                    .with_writer(file)
                    .with_current_span(true)
                    .with_span_list(true),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(json_layer)
        .try_init()
        .ok();
    Ok(())
}
