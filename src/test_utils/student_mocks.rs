use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    app_error::{AppError, AppResult},
    entities::student::Student,
    use_cases::student::{StudentChange, StudentRepo},
};

/// Repo whose every call fails, for exercising storage error paths.
#[derive(Default)]
pub struct FailingStudentRepo;

fn unavailable() -> AppError {
    AppError::Storage("store unavailable".into())
}

#[async_trait]
impl StudentRepo for FailingStudentRepo {
    async fn insert(&self, _student: Student) -> AppResult<Student> {
        Err(unavailable())
    }

    async fn get_by_id(&self, _id: Uuid) -> AppResult<Option<Student>> {
        Err(unavailable())
    }

    async fn list(&self, _include_inactive: bool) -> AppResult<Vec<Student>> {
        Err(unavailable())
    }

    async fn modify(&self, _id: Uuid, _change: StudentChange) -> AppResult<Student> {
        Err(unavailable())
    }
}
