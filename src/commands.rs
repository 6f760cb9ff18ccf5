use std::path::PathBuf;

use crate::calc;
use crate::events::StatePayload;
#[cfg(all(feature = "app", not(test)))]
use crate::events::EVENT_STATE_UPDATED;
use crate::models::TaskRecord;
use crate::state::AppState;
use crate::storage::{Storage, StorageError};

#[cfg(all(feature = "app", not(test)))]
use tauri::{AppHandle, Emitter, Manager, Runtime, State};

#[derive(Debug, serde::Serialize)]
pub struct CommandResult<T> {
    pub ok: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

trait CommandCtx {
    fn app_data_dir(&self) -> Result<PathBuf, StorageError>;
    fn emit_state_updated(&self, payload: StatePayload);
}

fn ok<T>(data: T) -> CommandResult<T> {
    CommandResult {
        ok: true,
        data: Some(data),
        error: None,
    }
}

fn err<T>(message: &str) -> CommandResult<T> {
    CommandResult {
        ok: false,
        data: None,
        error: Some(message.to_string()),
    }
}

/// Writes the complete current task list to disk and pushes the new state
/// to the webview. Called synchronously after every mutation, before the
/// command returns.
fn persist(ctx: &impl CommandCtx, state: &AppState) -> Result<(), StorageError> {
    let root = ctx.app_data_dir()?;
    let storage = Storage::new(root);
    storage.ensure_dirs()?;
    storage.save_tasks(&state.tasks())?;
    ctx.emit_state_updated(StatePayload {
        tasks: state.tasks(),
    });
    Ok(())
}

/// Persist wrapper for mutating commands: on a write failure the in-memory
/// list is restored to `snapshot`, so memory never silently runs ahead of
/// the file.
fn persist_or_rollback(
    ctx: &impl CommandCtx,
    state: &AppState,
    snapshot: Vec<TaskRecord>,
) -> Result<(), StorageError> {
    if let Err(error) = persist(ctx, state) {
        log::error!("persist failed, rolling mutation back: {error}");
        state.replace_tasks(snapshot);
        return Err(error);
    }
    Ok(())
}

fn load_tasks_impl(ctx: &impl CommandCtx, state: &AppState) -> CommandResult<Vec<TaskRecord>> {
    let root = match ctx.app_data_dir() {
        Ok(path) => path,
        Err(e) => return err(&format!("app_data_dir error: {e}")),
    };
    let storage = Storage::new(root);
    let tasks = storage.load_tasks();
    log::info!("loaded {} task(s)", tasks.len());
    state.replace_tasks(tasks.clone());
    ok(tasks)
}

fn add_task_impl(ctx: &impl CommandCtx, state: &AppState, text: String) -> CommandResult<TaskRecord> {
    let snapshot = state.tasks();
    let record = match state.add_task(&text) {
        Ok(record) => record,
        Err(error) => return err(&error.to_string()),
    };
    if let Err(error) = persist_or_rollback(ctx, state, snapshot) {
        return err(&format!("storage error: {error}"));
    }
    ok(record)
}

fn toggle_task_impl(
    ctx: &impl CommandCtx,
    state: &AppState,
    task_id: String,
) -> CommandResult<TaskRecord> {
    let snapshot = state.tasks();
    let record = match state.toggle_task(&task_id) {
        Ok(record) => record,
        Err(error) => return err(&error.to_string()),
    };
    if let Err(error) = persist_or_rollback(ctx, state, snapshot) {
        return err(&format!("storage error: {error}"));
    }
    ok(record)
}

fn delete_task_impl(
    ctx: &impl CommandCtx,
    state: &AppState,
    task_id: String,
) -> CommandResult<bool> {
    let snapshot = state.tasks();
    // Deleting an id that is no longer present is a no-op, not an error.
    if !state.remove_task(&task_id) {
        return ok(false);
    }
    if let Err(error) = persist_or_rollback(ctx, state, snapshot) {
        return err(&format!("storage error: {error}"));
    }
    ok(true)
}

fn clear_all_impl(ctx: &impl CommandCtx, state: &AppState, confirmed: bool) -> CommandResult<bool> {
    // The yes/no prompt lives in the frontend (dialog plugin); an
    // unconfirmed request must leave both memory and disk untouched.
    if !confirmed {
        return ok(false);
    }
    let snapshot = state.tasks();
    state.clear_tasks();
    if let Err(error) = persist_or_rollback(ctx, state, snapshot) {
        return err(&format!("storage error: {error}"));
    }
    ok(true)
}

fn evaluate_expression_impl(expression: &str) -> CommandResult<String> {
    match calc::evaluate(expression) {
        Ok(total) => ok(total),
        Err(error) => err(&error.to_string()),
    }
}

#[cfg(all(feature = "app", not(test)))]
struct TauriCommandCtx<'a, R: Runtime> {
    app: &'a AppHandle<R>,
}

#[cfg(all(feature = "app", not(test)))]
impl<R: Runtime> CommandCtx for TauriCommandCtx<'_, R> {
    fn app_data_dir(&self) -> Result<PathBuf, StorageError> {
        self.app
            .path()
            .app_data_dir()
            .map_err(|err| StorageError::Io(std::io::Error::other(err.to_string())))
    }

    fn emit_state_updated(&self, payload: StatePayload) {
        let _ = self.app.emit(EVENT_STATE_UPDATED, payload);
    }
}

#[cfg(all(feature = "app", not(test)))]
#[tauri::command]
pub fn load_tasks(app: AppHandle, state: State<AppState>) -> CommandResult<Vec<TaskRecord>> {
    let ctx = TauriCommandCtx { app: &app };
    load_tasks_impl(&ctx, state.inner())
}

#[cfg(all(feature = "app", not(test)))]
#[tauri::command]
pub fn add_task(app: AppHandle, state: State<AppState>, text: String) -> CommandResult<TaskRecord> {
    let ctx = TauriCommandCtx { app: &app };
    add_task_impl(&ctx, state.inner(), text)
}

#[cfg(all(feature = "app", not(test)))]
#[tauri::command]
pub fn toggle_task(
    app: AppHandle,
    state: State<AppState>,
    task_id: String,
) -> CommandResult<TaskRecord> {
    let ctx = TauriCommandCtx { app: &app };
    toggle_task_impl(&ctx, state.inner(), task_id)
}

#[cfg(all(feature = "app", not(test)))]
#[tauri::command]
pub fn delete_task(app: AppHandle, state: State<AppState>, task_id: String) -> CommandResult<bool> {
    let ctx = TauriCommandCtx { app: &app };
    delete_task_impl(&ctx, state.inner(), task_id)
}

#[cfg(all(feature = "app", not(test)))]
#[tauri::command]
pub fn clear_all(app: AppHandle, state: State<AppState>, confirmed: bool) -> CommandResult<bool> {
    let ctx = TauriCommandCtx { app: &app };
    clear_all_impl(&ctx, state.inner(), confirmed)
}

#[cfg(all(feature = "app", not(test)))]
#[tauri::command]
pub fn evaluate_expression(expression: String) -> CommandResult<String> {
    evaluate_expression_impl(&expression)
}
