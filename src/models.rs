use chrono::{DateTime, Local};
use serde::Serialize;
use uuid::Uuid;

/// Display format for task creation times, e.g. `07 Mar 2026 • 04:12 PM`.
/// This string is persisted verbatim and never re-parsed.
pub const CREATED_AT_FORMAT: &str = "%d %b %Y • %I:%M %p";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct TaskRecord {
    /// Synthetic identity, assigned at creation or load time. Not persisted;
    /// it exists so toggle/delete address a specific record even when two
    /// records carry identical text and timestamps.
    pub id: String,
    pub text: String,
    /// Immutable after creation.
    pub created_at: String,
    pub done: bool,
}

impl TaskRecord {
    /// Builds a fresh record with the current local time. The caller is
    /// responsible for trimming/validating `text` first (see `AppState::add_task`).
    pub fn new(text: String) -> Self {
        Self::with_created_at(text, format_created_at(Local::now()))
    }

    pub fn with_created_at(text: String, created_at: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            text,
            created_at,
            done: false,
        }
    }

    /// Restores a record from the persisted file. `created_at` is kept as-is,
    /// including an empty string when the stored object had no `time` field.
    pub fn restored(text: String, created_at: String, done: bool) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            text,
            created_at,
            done,
        }
    }
}

pub fn format_created_at(at: DateTime<Local>) -> String {
    at.format(CREATED_AT_FORMAT).to_string()
}

#[derive(Debug, Clone, PartialEq)]
pub enum TaskError {
    /// The task text was empty after trimming; surfaced to the user as a warning.
    EmptyText,
    /// The addressed record is not in the store.
    NotFound,
}

impl std::fmt::Display for TaskError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskError::EmptyText => write!(f, "please enter a task"),
            TaskError::NotFound => write!(f, "task not found"),
        }
    }
}

impl std::error::Error for TaskError {}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn new_records_start_not_done_with_distinct_ids() {
        let a = TaskRecord::new("buy milk".to_string());
        let b = TaskRecord::new("buy milk".to_string());
        assert!(!a.done);
        assert!(!b.done);
        assert_ne!(a.id, b.id);
        assert_eq!(a.text, "buy milk");
        assert!(!a.created_at.is_empty());
    }

    #[test]
    fn created_at_uses_display_format() {
        let at = Local
            .with_ymd_and_hms(2026, 3, 7, 16, 12, 0)
            .single()
            .unwrap();
        assert_eq!(format_created_at(at), "07 Mar 2026 • 04:12 PM");

        let morning = Local
            .with_ymd_and_hms(2026, 11, 23, 9, 5, 59)
            .single()
            .unwrap();
        assert_eq!(format_created_at(morning), "23 Nov 2026 • 09:05 AM");
    }

    #[test]
    fn restored_keeps_fields_and_assigns_an_id() {
        let r = TaskRecord::restored("call mom".to_string(), String::new(), true);
        assert_eq!(r.text, "call mom");
        assert_eq!(r.created_at, "");
        assert!(r.done);
        assert!(!r.id.is_empty());
    }

    #[test]
    fn task_error_messages_are_user_facing() {
        assert_eq!(TaskError::EmptyText.to_string(), "please enter a task");
        assert_eq!(TaskError::NotFound.to_string(), "task not found");
    }
}
