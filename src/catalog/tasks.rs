//! Wellness tasks a participant can complete for points.

use crate::catalog::error::CatalogError;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;

/// Identifier of a wellness task.
pub type TaskId = u32;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WellnessTask {
    pub id: TaskId,
    pub name: String,
    pub description: String,
}

/// Id-ordered list of wellness tasks.
///
/// Deserialization applies the same duplicate-id check as `new`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TaskCatalog {
    tasks: Vec<WellnessTask>,
}

impl TaskCatalog {
    pub fn new(tasks: Vec<WellnessTask>) -> Result<Self, CatalogError> {
        let mut seen = BTreeSet::new();
        for task in &tasks {
            if !seen.insert(task.id) {
                return Err(CatalogError::DuplicateTask { id: task.id });
            }
        }
        let mut tasks = tasks;
        tasks.sort_by_key(|t| t.id);
        Ok(Self { tasks })
    }

    pub fn reference() -> Self {
        let task = |id, name: &str, description: &str| WellnessTask {
            id,
            name: name.to_string(),
            description: description.to_string(),
        };
        Self {
            tasks: vec![
                task(1, "Read a Book", "Take time to read and expand your mind"),
                task(2, "Meditate", "Practice mindfulness and inner peace"),
                task(3, "Take a Walk", "Get some fresh air and exercise"),
                task(4, "Drink Water", "Stay hydrated for better health"),
                task(5, "Deep Breathing", "Practice breathing exercises to reduce stress"),
            ],
        }
    }

    pub fn lookup(&self, id: TaskId) -> Option<&WellnessTask> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn tasks(&self) -> &[WellnessTask] {
        &self.tasks
    }
}

#[derive(Deserialize)]
struct RawTasks {
    tasks: Vec<WellnessTask>,
}

impl<'de> Deserialize<'de> for TaskCatalog {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawTasks::deserialize(deserializer)?;
        Self::new(raw.tasks).map_err(serde::de::Error::custom)
    }
}

impl Default for TaskCatalog {
    fn default() -> Self {
        Self::reference()
    }
}
