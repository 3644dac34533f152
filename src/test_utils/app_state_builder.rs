//! Test app state builder for HTTP-level integration testing.
//!
//! `TestAppStateBuilder` creates an `AppState` with in-memory storage and a
//! config that never touches the environment.

use std::{net::SocketAddr, path::PathBuf, sync::Arc};

use axum::http::HeaderValue;
use url::Url;

use crate::{
    adapters::{http::app_state::AppState, persistence::InMemoryPersistence},
    entities::{
        plan::{PlanCatalog, PlanPrices},
        student::Student,
    },
    infra::config::AppConfig,
    test_utils::FailingStudentRepo,
    use_cases::{
        billing::BillingUseCases, report::ReportUseCases,
        student::{StudentRepo, StudentUseCases},
    },
};

/// Config with local defaults for tests.
pub fn test_config() -> AppConfig {
    AppConfig {
        bind_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
        cors_origin: HeaderValue::from_static("http://localhost:5173"),
        log_file: Some(PathBuf::from("test.log")),
        students_seed_path: None,
        due_soon_days: 7,
        avatar_base_url: Url::parse("https://ui-avatars.com/api/").unwrap(),
        plan_prices: PlanPrices::default(),
        currency: "PEN".to_string(),
    }
}

/// Builder for creating `AppState` with in-memory storage.
///
/// # Example
///
/// ```ignore
/// let student = create_test_student(|s| s.name = "Ana".to_string());
///
/// let (app_state, store) = TestAppStateBuilder::new()
///     .with_student(student)
///     .build_with_store();
/// ```
#[derive(Default)]
pub struct TestAppStateBuilder {
    students: Vec<Student>,
    failing_storage: bool,
}

impl TestAppStateBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_student(mut self, student: Student) -> Self {
        self.students.push(student);
        self
    }

    /// Every repository call returns a storage error.
    pub fn with_failing_storage(mut self) -> Self {
        self.failing_storage = true;
        self
    }

    pub fn build(self) -> AppState {
        self.build_with_store().0
    }

    /// Also returns the backing store for assertions.
    pub fn build_with_store(self) -> (AppState, Arc<InMemoryPersistence>) {
        let config = test_config();
        let catalog = Arc::new(PlanCatalog::new(config.plan_prices, &config.currency));
        let store = Arc::new(InMemoryPersistence::with_students(self.students));

        let repo: Arc<dyn StudentRepo> = if self.failing_storage {
            Arc::new(FailingStudentRepo)
        } else {
            store.clone()
        };

        let app_state = AppState {
            config: Arc::new(config),
            student_use_cases: Arc::new(StudentUseCases::new(repo.clone())),
            billing_use_cases: Arc::new(BillingUseCases::new(catalog.clone())),
            report_use_cases: Arc::new(ReportUseCases::new(repo, catalog)),
        };
        (app_state, store)
    }
}
