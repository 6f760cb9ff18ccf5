use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::PathBuf;

use chrono::Local;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::{format_created_at, TaskRecord};

const TASKS_FILE: &str = "tasks.json";

#[derive(Debug)]
pub enum StorageError {
    Io(std::io::Error),
    Json(serde_json::Error),
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageError::Io(err) => write!(f, "io error: {err}"),
            StorageError::Json(err) => write!(f, "json error: {err}"),
        }
    }
}

impl std::error::Error for StorageError {}

impl From<std::io::Error> for StorageError {
    fn from(value: std::io::Error) -> Self {
        StorageError::Io(value)
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(value: serde_json::Error) -> Self {
        StorageError::Json(value)
    }
}

/// One element of the persisted array, current format. The legacy format
/// (a plain string per task) is only ever read, never written back.
#[derive(Debug, Serialize, Deserialize)]
struct StoredTask {
    #[serde(default)]
    task: String,
    #[serde(default)]
    time: String,
    #[serde(default)]
    done: bool,
}

pub struct Storage {
    root: PathBuf,
}

impl Storage {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn ensure_dirs(&self) -> Result<(), StorageError> {
        fs::create_dir_all(&self.root)?;
        Ok(())
    }

    fn tasks_path(&self) -> PathBuf {
        self.root.join(TASKS_FILE)
    }

    /// Loads the task list. A missing, unreadable or malformed file is a
    /// normal outcome and yields an empty list; load never fails hard.
    pub fn load_tasks(&self) -> Vec<TaskRecord> {
        let path = self.tasks_path();
        if !path.exists() {
            return Vec::new();
        }
        let buf = match read_to_string(&path) {
            Ok(buf) => buf,
            Err(err) => {
                log::warn!("could not read {}: {err}, starting empty", path.display());
                return Vec::new();
            }
        };
        let root: Value = match serde_json::from_str(&buf) {
            Ok(root) => root,
            Err(err) => {
                log::warn!("malformed {}: {err}, starting empty", path.display());
                return Vec::new();
            }
        };
        let Value::Array(entries) = root else {
            log::warn!("{} root is not an array, starting empty", path.display());
            return Vec::new();
        };

        // Legacy entries carry no timestamp of their own; they get upgraded
        // with the load time. The upgrade reaches disk on the next mutation.
        let upgrade_time = format_created_at(Local::now());
        entries
            .into_iter()
            .filter_map(|entry| record_from_entry(entry, &upgrade_time))
            .collect()
    }

    /// Writes the complete list (never a diff) in the current format,
    /// replacing the file via a temp file and rename.
    pub fn save_tasks(&self, tasks: &[TaskRecord]) -> Result<(), StorageError> {
        let stored: Vec<StoredTask> = tasks
            .iter()
            .map(|record| StoredTask {
                task: record.text.clone(),
                time: record.created_at.clone(),
                done: record.done,
            })
            .collect();

        let path = self.tasks_path();
        let temp_path = path.with_extension("tmp");
        let json = serde_json::to_vec_pretty(&stored)?;
        {
            let mut file = File::create(&temp_path)?;
            file.write_all(&json)?;
            file.sync_all()?;
        }
        fs::rename(temp_path, path)?;
        Ok(())
    }
}

/// Dispatches one array element by its own shape: a string is a legacy
/// entry, an object is a current-format entry, anything else is skipped.
/// Mixed arrays are therefore handled element by element.
fn record_from_entry(entry: Value, upgrade_time: &str) -> Option<TaskRecord> {
    match entry {
        Value::String(text) => Some(TaskRecord::with_created_at(
            text,
            upgrade_time.to_string(),
        )),
        Value::Object(_) => {
            let stored: StoredTask = match serde_json::from_value(entry) {
                Ok(stored) => stored,
                Err(err) => {
                    log::warn!("skipping unrecognized task entry: {err}");
                    return None;
                }
            };
            Some(TaskRecord::restored(stored.task, stored.time, stored.done))
        }
        other => {
            log::warn!("skipping non-task entry: {other}");
            None
        }
    }
}

fn read_to_string(path: &std::path::Path) -> Result<String, StorageError> {
    let mut file = File::open(path)?;
    let mut buf = String::new();
    file.read_to_string(&mut buf)?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn storage() -> (tempfile::TempDir, Storage) {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::new(dir.path().to_path_buf());
        storage.ensure_dirs().unwrap();
        (dir, storage)
    }

    #[test]
    fn missing_file_loads_as_empty() {
        let (_dir, storage) = storage();
        assert!(storage.load_tasks().is_empty());
    }

    #[test]
    fn save_then_load_round_trips_order_and_fields() {
        let (_dir, storage) = storage();
        let mut second = TaskRecord::new("call mom".to_string());
        second.done = true;
        let tasks = vec![TaskRecord::new("buy milk".to_string()), second];

        storage.save_tasks(&tasks).unwrap();
        let loaded = storage.load_tasks();

        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].text, "buy milk");
        assert!(!loaded[0].done);
        assert_eq!(loaded[0].created_at, tasks[0].created_at);
        assert_eq!(loaded[1].text, "call mom");
        assert!(loaded[1].done);
        assert_eq!(loaded[1].created_at, tasks[1].created_at);
    }

    #[test]
    fn legacy_string_array_upgrades_in_order() {
        let (dir, storage) = storage();
        std::fs::write(
            dir.path().join(TASKS_FILE),
            r#"["buy milk", "call mom"]"#,
        )
        .unwrap();

        let loaded = storage.load_tasks();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].text, "buy milk");
        assert_eq!(loaded[1].text, "call mom");
        assert!(loaded.iter().all(|r| !r.done));
        assert!(loaded.iter().all(|r| !r.created_at.is_empty()));

        // A legacy load alone must not rewrite the file.
        let raw = std::fs::read_to_string(dir.path().join(TASKS_FILE)).unwrap();
        assert_eq!(raw, r#"["buy milk", "call mom"]"#);
    }

    #[test]
    fn malformed_file_loads_as_empty() {
        let (dir, storage) = storage();
        for content in ["not json", r#"{"not": "an array"}"#, "42"] {
            std::fs::write(dir.path().join(TASKS_FILE), content).unwrap();
            assert!(storage.load_tasks().is_empty(), "content: {content}");
        }
    }

    #[test]
    fn mixed_arrays_dispatch_each_element_by_shape() {
        let (dir, storage) = storage();
        std::fs::write(
            dir.path().join(TASKS_FILE),
            r#"["legacy entry", {"task": "current entry", "time": "01 Jan 2026 • 09:00 AM", "done": true}, 42, null]"#,
        )
        .unwrap();

        let loaded = storage.load_tasks();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].text, "legacy entry");
        assert!(!loaded[0].done);
        assert_eq!(loaded[1].text, "current entry");
        assert_eq!(loaded[1].created_at, "01 Jan 2026 • 09:00 AM");
        assert!(loaded[1].done);
    }

    #[test]
    fn object_entries_tolerate_missing_and_extra_fields() {
        let (dir, storage) = storage();
        std::fs::write(
            dir.path().join(TASKS_FILE),
            r#"[{}, {"task": "only text"}, {"task": "tagged", "done": true, "color": "red"}, {"task": 42}]"#,
        )
        .unwrap();

        let loaded = storage.load_tasks();
        // The wrong-typed `task` object is skipped, the rest default.
        assert_eq!(loaded.len(), 3);
        assert_eq!(loaded[0].text, "");
        assert_eq!(loaded[0].created_at, "");
        assert!(!loaded[0].done);
        assert_eq!(loaded[1].text, "only text");
        assert_eq!(loaded[2].text, "tagged");
        assert!(loaded[2].done);
    }

    #[test]
    fn save_overwrites_previous_content_completely() {
        let (dir, storage) = storage();
        storage
            .save_tasks(&[
                TaskRecord::new("one".to_string()),
                TaskRecord::new("two".to_string()),
            ])
            .unwrap();
        storage.save_tasks(&[]).unwrap();

        let raw = std::fs::read_to_string(dir.path().join(TASKS_FILE)).unwrap();
        assert_eq!(raw.trim(), "[]");
        assert!(storage.load_tasks().is_empty());
    }

    #[test]
    fn save_writes_current_format_keys() {
        let (dir, storage) = storage();
        let mut record = TaskRecord::new("inspect".to_string());
        record.done = true;
        storage.save_tasks(&[record.clone()]).unwrap();

        let raw = std::fs::read_to_string(dir.path().join(TASKS_FILE)).unwrap();
        let value: Value = serde_json::from_str(&raw).unwrap();
        let entries = value.as_array().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0]["task"], "inspect");
        assert_eq!(entries[0]["time"], record.created_at.as_str());
        assert_eq!(entries[0]["done"], true);
        // The synthetic id never reaches disk.
        assert!(entries[0].get("id").is_none());
    }

    #[test]
    fn save_fails_when_target_is_a_directory() {
        let (dir, storage) = storage();
        std::fs::create_dir_all(dir.path().join(TASKS_FILE)).unwrap();
        assert!(storage.save_tasks(&[]).is_err());
    }
}
