pub mod auth;
pub mod commands;
pub mod config;
pub mod database;
pub mod display;
pub mod errors;
pub mod logger;
pub mod models;
pub mod rate_limiter;
pub mod scan;
pub mod validation;

use auth::session::SessionStore;
use scan::session::ScanSession;
use std::sync::Mutex;
use tauri::Manager;

/// State global aplikasi — di-manage oleh Tauri.
pub struct AppState {
    pub db: sqlx::SqlitePool,
    pub sessions: Mutex<SessionStore>,
    /// Satu scan session per layar scan yang aktif; None selama layar
    /// scan tidak terbuka.
    pub scanner: Mutex<Option<ScanSession>>,
}

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    tauri::Builder::default()
        .plugin(tauri_plugin_opener::init())
        .setup(|app| {
            let app_handle = app.handle().clone();
            tauri::async_runtime::block_on(async move {
                // Dapatkan path AppData
                let app_data_dir = app_handle
                    .path()
                    .app_data_dir()
                    .expect("Failed to resolve AppData path");

                // Initialize configuration
                config::init_config();

                // Initialize logger
                if let Err(e) = logger::init_global_logger(&app_data_dir) {
                    eprintln!("Warning: Failed to initialize logger: {}", e);
                }

                // Log application startup
                log_info!("APP", "Application starting", serde_json::json!({
                    "version": env!("CARGO_PKG_VERSION"),
                    "environment": config::get_config().environment.as_str(),
                    "app_data_dir": app_data_dir.to_string_lossy()
                }));

                // Inisialisasi database
                let pool = database::connection::init_db(&app_data_dir)
                    .await
                    .expect("Failed to initialize database");

                if let Err(e) = database::connection::health_check(&pool).await {
                    log_error!("DATABASE", "Health check failed", e.to_string());
                }

                // Simpan state
                app_handle.manage(AppState {
                    db: pool,
                    sessions: Mutex::new(SessionStore::new()),
                    scanner: Mutex::new(None),
                });
            });
            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            // Auth
            commands::auth_cmd::register,
            commands::auth_cmd::login,
            commands::auth_cmd::logout,
            commands::auth_cmd::check_session,
            commands::auth_cmd::get_profile,
            // Cards
            commands::card_cmd::get_cards,
            commands::card_cmd::get_card_detail,
            commands::card_cmd::get_card_stats,
            // Scanner
            commands::scan_cmd::open_scanner,
            commands::scan_cmd::close_scanner,
            commands::scan_cmd::get_scanner_state,
            commands::scan_cmd::set_scanner_viewport,
            commands::scan_cmd::report_detection,
            commands::scan_cmd::toggle_camera_facing,
            commands::scan_cmd::toggle_flash,
            commands::scan_cmd::toggle_scan_mode,
            commands::scan_cmd::update_draft,
            commands::scan_cmd::discard_draft,
            commands::scan_cmd::submit_draft,
            // Activity
            commands::activity_cmd::get_activity_logs,
        ])
        .run(tauri::generate_context!())
        .expect("Failed to run application");
}
