//! MotoConnect Desktop Library
//!
//! Core modules for the fleet registration companion app.

pub mod api;
pub mod auth;
pub mod commands;
pub mod logging;
pub mod notifications;
pub mod prefs;
pub mod scan;
pub mod storage;
pub mod vehicles;

use std::sync::Mutex;
use api::ApiClient;
use auth::AuthManager;
use notifications::NotificationManager;
use prefs::PreferencesManager;
use scan::ScanTask;
use storage::PreferenceStorage;

/// Application state shared across commands
pub struct AppState {
    pub auth: Mutex<AuthManager>,
    pub prefs: Mutex<PreferencesManager>,
    pub notifications: Mutex<NotificationManager>,
    pub scan: Mutex<Option<ScanTask>>,
    pub storage: PreferenceStorage,
    pub api: ApiClient,
}
