use std::collections::HashMap;

use tokio::sync::RwLock;
use uuid::Uuid;

use crate::entities::student::Student;

pub mod student;

/// Process-local store. Contents are lost on restart; seed it from a
/// legacy export at startup when persistence across runs is needed.
#[derive(Default)]
pub struct InMemoryPersistence {
    students: RwLock<HashMap<Uuid, Student>>,
}

impl InMemoryPersistence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_students(students: Vec<Student>) -> Self {
        let map: HashMap<Uuid, Student> = students.into_iter().map(|s| (s.id, s)).collect();
        Self {
            students: RwLock::new(map),
        }
    }

    /// Snapshot of every stored record, in no particular order.
    pub async fn get_all(&self) -> Vec<Student> {
        self.students.read().await.values().cloned().collect()
    }
}
