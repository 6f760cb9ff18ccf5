// Learn more about Tauri commands at https://tauri.app/develop/calling-rust/
mod calc;
mod commands;
mod events;
mod logging;
mod models;
mod state;
mod storage;

#[cfg(all(feature = "app", not(test)))]
use tauri::{Manager, WebviewWindowBuilder};

#[cfg(all(feature = "app", not(test)))]
use crate::commands::*;
#[cfg(all(feature = "app", not(test)))]
use crate::state::AppState;
#[cfg(all(feature = "app", not(test)))]
use crate::storage::Storage;

#[cfg_attr(mobile, tauri::mobile_entry_point)]
#[cfg(all(feature = "app", not(test)))]
pub fn run() {
    tauri::Builder::default()
        .plugin(tauri_plugin_opener::init())
        .plugin(tauri_plugin_dialog::init())
        .setup(|app| {
            let data_dir = app.path().app_data_dir()?;
            if let Err(error) = logging::init_logging(&data_dir) {
                eprintln!("logging init failed: {error}");
            }

            let storage = Storage::new(data_dir);
            storage.ensure_dirs()?;
            let tasks = storage.load_tasks();
            log::info!("starting with {} task(s)", tasks.len());

            app.manage(AppState::new(tasks));

            // The to-do list is the "main" window (tauri.conf.json); the
            // calculator gets its own small fixed-size window.
            WebviewWindowBuilder::new(app, "calc", tauri::WebviewUrl::App("/#/calc".into()))
                .title("Calculator")
                .inner_size(350.0, 500.0)
                .resizable(false)
                .visible(false)
                .build()?;

            if let Some(window) = app.get_webview_window("main") {
                let _ = window.set_maximizable(false);
            }

            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            load_tasks,
            add_task,
            toggle_task,
            delete_task,
            clear_all,
            evaluate_expression,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
