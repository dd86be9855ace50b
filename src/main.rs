//! MotoConnect Desktop - Main Entry Point
//!
//! Desktop companion app for the MotoConnect fleet registration service.
//! The webview renders the screens; session, preference, validation, API,
//! and scan-simulation logic live in the Rust core behind IPC commands.

#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use tracing::info;
use std::sync::Mutex;

use motoconnect_lib::{
    api::ApiClient,
    auth::AuthManager,
    notifications::NotificationManager,
    prefs::PreferencesManager,
    storage::PreferenceStorage,
    logging,
    commands,
    AppState,
};

fn main() {
    // Initialize logging
    logging::init();
    info!("MotoConnect Desktop starting...");

    let storage = PreferenceStorage::new();

    // One-time preference load, before any screen renders
    let mut prefs = PreferencesManager::new();
    prefs.load(&storage);
    let mut notifications = NotificationManager::new();
    notifications.load(&storage);

    let app_state = AppState {
        auth: Mutex::new(AuthManager::new()),
        prefs: Mutex::new(prefs),
        notifications: Mutex::new(notifications),
        scan: Mutex::new(None),
        storage,
        api: ApiClient::from_env(),
    };

    tauri::Builder::default()
        .plugin(tauri_plugin_notification::init())
        .manage(app_state)
        .invoke_handler(tauri::generate_handler![
            commands::get_stored_session,
            commands::get_remembered_email,
            commands::login,
            commands::logout,
            commands::register_user,
            commands::register_vehicle,
            commands::load_vehicle_page,
            commands::start_scan,
            commands::cancel_scan,
            commands::get_preferences,
            commands::set_theme_mode,
            commands::set_language,
            commands::set_notifications_enabled,
            commands::resolve_theme,
            commands::send_local_notification,
            commands::get_login_history,
        ])
        .setup(|_app| {
            info!("Application setup complete");
            Ok(())
        })
        .run(tauri::generate_context!())
        .expect("Error running MotoConnect Desktop");
}
