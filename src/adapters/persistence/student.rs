use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    adapters::persistence::InMemoryPersistence,
    app_error::{AppError, AppResult},
    entities::student::Student,
    use_cases::student::{StudentChange, StudentRepo},
};

#[async_trait]
impl StudentRepo for InMemoryPersistence {
    async fn insert(&self, student: Student) -> AppResult<Student> {
        let mut students = self.students.write().await;
        if students.contains_key(&student.id) {
            return Err(AppError::Storage(format!(
                "student {} already exists",
                student.id
            )));
        }
        students.insert(student.id, student.clone());
        Ok(student)
    }

    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<Student>> {
        Ok(self.students.read().await.get(&id).cloned())
    }

    async fn list(&self, include_inactive: bool) -> AppResult<Vec<Student>> {
        let mut students: Vec<Student> = self
            .students
            .read()
            .await
            .values()
            .filter(|s| include_inactive || s.is_active)
            .cloned()
            .collect();
        students.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.name.cmp(&b.name))
        });
        Ok(students)
    }

    async fn modify(&self, id: Uuid, change: StudentChange) -> AppResult<Student> {
        let mut students = self.students.write().await;
        let slot = students.get_mut(&id).ok_or(AppError::NotFound)?;

        let mut edited = slot.clone();
        change(&mut edited)?;
        *slot = edited.clone();
        Ok(edited)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{create_test_student, test_datetime};
    use chrono::Duration;

    #[tokio::test]
    async fn insert_then_get() {
        let repo = InMemoryPersistence::new();
        let student = create_test_student(|_| {});

        repo.insert(student.clone()).await.unwrap();

        assert_eq!(repo.get_by_id(student.id).await.unwrap(), Some(student));
        assert_eq!(repo.get_by_id(Uuid::new_v4()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn insert_duplicate_id_fails() {
        let student = create_test_student(|_| {});
        let repo = InMemoryPersistence::with_students(vec![student.clone()]);

        let result = repo.insert(student).await;

        assert!(matches!(result, Err(AppError::Storage(_))));
    }

    #[tokio::test]
    async fn list_is_newest_first_and_filters_inactive() {
        let oldest = create_test_student(|s| {
            s.name = "Oldest".to_string();
            s.created_at = test_datetime() - Duration::days(2);
        });
        let newest = create_test_student(|s| {
            s.name = "Newest".to_string();
            s.created_at = test_datetime();
        });
        let inactive = create_test_student(|s| {
            s.name = "Inactive".to_string();
            s.created_at = test_datetime() - Duration::days(1);
            s.is_active = false;
        });
        let repo = InMemoryPersistence::with_students(vec![oldest, inactive, newest]);

        let active: Vec<String> = repo
            .list(false)
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(active, vec!["Newest", "Oldest"]);

        let all: Vec<String> = repo
            .list(true)
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(all, vec!["Newest", "Inactive", "Oldest"]);
    }

    #[tokio::test]
    async fn modify_applies_change() {
        let student = create_test_student(|_| {});
        let repo = InMemoryPersistence::with_students(vec![student.clone()]);

        let returned = repo
            .modify(
                student.id,
                Box::new(|s: &mut Student| {
                    s.name = "Renamed".to_string();
                    Ok(())
                }),
            )
            .await
            .unwrap();

        assert_eq!(returned.name, "Renamed");
        let stored = repo.get_by_id(student.id).await.unwrap().unwrap();
        assert_eq!(stored.name, "Renamed");
    }

    #[tokio::test]
    async fn failed_modify_leaves_record_untouched() {
        let student = create_test_student(|s| s.name = "Original".to_string());
        let repo = InMemoryPersistence::with_students(vec![student.clone()]);

        let result = repo
            .modify(
                student.id,
                Box::new(|s: &mut Student| {
                    s.name = "Half edited".to_string();
                    Err(AppError::InvalidInput("rejected".into()))
                }),
            )
            .await;

        assert!(matches!(result, Err(AppError::InvalidInput(_))));
        assert_eq!(repo.get_by_id(student.id).await.unwrap(), Some(student));
    }

    #[tokio::test]
    async fn modify_unknown_is_not_found() {
        let repo = InMemoryPersistence::new();
        let result = repo
            .modify(Uuid::new_v4(), Box::new(|_: &mut Student| Ok(())))
            .await;
        assert!(matches!(result, Err(AppError::NotFound)));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_modifies_are_not_lost() {
        let student = create_test_student(|s| s.notes = Some(String::new()));
        let id = student.id;
        let repo = std::sync::Arc::new(InMemoryPersistence::with_students(vec![student]));

        let tasks: Vec<_> = (0..50)
            .map(|_| {
                let repo = repo.clone();
                tokio::spawn(async move {
                    repo.modify(
                        id,
                        Box::new(|s: &mut Student| {
                            s.notes.get_or_insert_with(String::new).push('x');
                            Ok(())
                        }),
                    )
                    .await
                    .unwrap();
                })
            })
            .collect();
        for task in tasks {
            task.await.unwrap();
        }

        let stored = repo.get_by_id(id).await.unwrap().unwrap();
        assert_eq!(stored.notes.map(|n| n.len()), Some(50));
    }
}
