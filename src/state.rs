use std::sync::{Arc, Mutex};

use crate::models::{TaskError, TaskRecord};

/// In-memory task store. Insertion order is display order is persisted
/// order; the UI renders this list and never feeds state back from it.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<Mutex<Vec<TaskRecord>>>,
}

impl AppState {
    pub fn new(tasks: Vec<TaskRecord>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(tasks)),
        }
    }

    pub fn tasks(&self) -> Vec<TaskRecord> {
        let guard = self.inner.lock().expect("state poisoned");
        guard.clone()
    }

    /// Validates and appends a new record. Whitespace is trimmed first;
    /// an empty result is rejected without touching the store.
    pub fn add_task(&self, text: &str) -> Result<TaskRecord, TaskError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(TaskError::EmptyText);
        }
        let record = TaskRecord::new(text.to_string());
        let mut guard = self.inner.lock().expect("state poisoned");
        guard.push(record.clone());
        Ok(record)
    }

    /// Flips `done` on the addressed record and returns the new value.
    pub fn toggle_task(&self, task_id: &str) -> Result<TaskRecord, TaskError> {
        let mut guard = self.inner.lock().expect("state poisoned");
        let record = guard
            .iter_mut()
            .find(|r| r.id == task_id)
            .ok_or(TaskError::NotFound)?;
        record.done = !record.done;
        Ok(record.clone())
    }

    /// Removes the addressed record. Unknown ids are a no-op; returns
    /// whether anything was removed.
    pub fn remove_task(&self, task_id: &str) -> bool {
        let mut guard = self.inner.lock().expect("state poisoned");
        let before = guard.len();
        guard.retain(|r| r.id != task_id);
        guard.len() != before
    }

    pub fn clear_tasks(&self) {
        let mut guard = self.inner.lock().expect("state poisoned");
        guard.clear();
    }

    /// Restores a previous snapshot; used to roll a mutation back when the
    /// follow-up disk write fails.
    pub fn replace_tasks(&self, tasks: Vec<TaskRecord>) {
        let mut guard = self.inner.lock().expect("state poisoned");
        *guard = tasks;
    }
}
