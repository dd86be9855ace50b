//! Tauri Commands Module
//!
//! IPC commands exposed to the frontend screens.

use tauri::{command, State, AppHandle, WebviewWindow, Emitter};
use tauri_plugin_notification::NotificationExt;
use serde::Serialize;
use tracing::{info, error, debug};

use crate::AppState;
use crate::api::{LoginOutcome, NewUser, NewVehicle, PageRequest, User};
use crate::auth::{
    LoginHistory, LoginRecord, Session,
    SESSION_KEY, REMEMBERED_EMAIL_KEY, REMEMBER_ME_KEY, LOGIN_TIMESTAMP_KEY, LOGIN_HISTORY_KEY,
};
use crate::prefs::{Language, Preferences, Theme, ThemeMode};
use crate::scan::{ScanConfig, ScanTask};
use crate::vehicles::{
    self, FieldErrors, ListFilters, RegistrationForm, Vehicle,
};

// Response types for frontend

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub email: String,
    pub name: Option<String>,
    pub user_type: i32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResult {
    pub success: bool,
    pub message: Option<String>,
    pub field_errors: Option<FieldErrors>,
    pub session: Option<SessionResponse>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterVehicleResult {
    pub success: bool,
    pub field_errors: Option<FieldErrors>,
    pub vehicle_id: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VehiclePage {
    pub vehicles: Vec<Vehicle>,
    pub current_page: u32,
    pub total_pages: u32,
    pub authoritative: bool,
}

// Commands

/// Restore the persisted session from local storage, if any
#[command]
pub fn get_stored_session(state: State<'_, AppState>) -> Option<SessionResponse> {
    debug!("Getting stored session");

    match state.storage.load::<Session>(SESSION_KEY) {
        Ok(session) => {
            let response = SessionResponse {
                email: session.email.clone(),
                name: session.name.clone(),
                user_type: session.user_type,
            };

            if let Ok(mut auth) = state.auth.lock() {
                auth.set_session(session);
            }

            Some(response)
        }
        Err(_) => {
            debug!("No stored session found");
            None
        }
    }
}

/// Email remembered from the last login, when the box was ticked
#[command]
pub fn get_remembered_email(state: State<'_, AppState>) -> Option<String> {
    let remembered = state.storage.load::<bool>(REMEMBER_ME_KEY).unwrap_or(false);
    if !remembered {
        return None;
    }
    state.storage.load::<String>(REMEMBERED_EMAIL_KEY).ok()
}

/// Validate credentials, authenticate, persist the session
#[command]
pub async fn login(
    email: String,
    password: String,
    remember_me: bool,
    app: AppHandle,
    state: State<'_, AppState>,
) -> Result<LoginResult, String> {
    let field_errors = vehicles::validate_login(&email, &password);
    if !field_errors.is_empty() {
        return Ok(LoginResult {
            success: false,
            message: Some("Fix the highlighted fields".to_string()),
            field_errors: Some(field_errors),
            session: None,
        });
    }

    let email = email.trim().to_lowercase();
    info!("Login attempt for: {}", email);

    let outcome: LoginOutcome = state.api.login(&email, &password).await;

    if !outcome.success {
        return Ok(LoginResult {
            success: false,
            message: Some(outcome.message),
            field_errors: None,
            session: None,
        });
    }

    let Some(token) = outcome.token else {
        return Ok(LoginResult {
            success: false,
            message: Some("Error connecting to the server".to_string()),
            field_errors: None,
            session: None,
        });
    };

    let login_time = chrono::Utc::now();
    let session = Session {
        email: email.clone(),
        name: outcome.user.as_ref().and_then(|u| {
            if u.name.is_empty() { None } else { Some(u.name.clone()) }
        }),
        user_type: outcome.user.as_ref().map_or(0, |u| u.user_type),
        token,
        login_time,
        is_authenticated: true,
    };

    if let Ok(mut auth) = state.auth.lock() {
        auth.set_session(session.clone());
    }

    // Persistence failures never block the login
    if remember_me {
        if let Err(e) = state.storage.save(REMEMBERED_EMAIL_KEY, &email) {
            error!("Failed to remember email: {}", e);
        }
        if let Err(e) = state.storage.save(REMEMBER_ME_KEY, &true) {
            error!("Failed to save remember flag: {}", e);
        }
    } else {
        let _ = state.storage.delete(REMEMBERED_EMAIL_KEY);
        let _ = state.storage.delete(REMEMBER_ME_KEY);
    }

    if let Err(e) = state.storage.save(SESSION_KEY, &session) {
        error!("Failed to save session: {}", e);
    }
    if let Err(e) = state.storage.save(LOGIN_TIMESTAMP_KEY, &login_time) {
        error!("Failed to save login timestamp: {}", e);
    }

    save_login_record(&state, &email, login_time);
    notify(&app, &state, "Welcome", "You are logged in to MotoConnect");

    Ok(LoginResult {
        success: true,
        message: Some(outcome.message),
        field_errors: None,
        session: Some(SessionResponse {
            email: session.email,
            name: session.name,
            user_type: session.user_type,
        }),
    })
}

/// Logout and clear the persisted session
#[command]
pub fn logout(state: State<'_, AppState>) {
    info!("Logging out");

    if let Ok(mut auth) = state.auth.lock() {
        auth.clear_session();
    }

    let _ = state.storage.delete(SESSION_KEY);
}

/// Create a user account
#[command]
pub async fn register_user(
    name: String,
    email: String,
    password: String,
    state: State<'_, AppState>,
) -> Result<User, String> {
    let user = NewUser { name, email, password, user_type: 0 };

    state.api.register_user(&user).await.map_err(|e| e.to_string())
}

/// Validate and submit a motorcycle registration
#[command]
pub async fn register_vehicle(
    form: RegistrationForm,
    app: AppHandle,
    state: State<'_, AppState>,
) -> Result<RegisterVehicleResult, String> {
    let field_errors = vehicles::validate_registration(&form);
    if !field_errors.is_empty() {
        return Ok(RegisterVehicleResult {
            success: false,
            field_errors: Some(field_errors),
            vehicle_id: None,
            error: None,
        });
    }

    let vehicle = NewVehicle {
        license_plate: form.plate_clean(),
        vehicle_model: form.model,
    };

    match state.api.create_vehicle(&vehicle).await {
        Ok(created) => {
            notify(
                &app,
                &state,
                "New motorcycle",
                &format!("Motorcycle {} registered", form.plate),
            );

            Ok(RegisterVehicleResult {
                success: true,
                field_errors: None,
                vehicle_id: created.vehicle_id,
                error: None,
            })
        }
        Err(e) => {
            error!("Vehicle registration failed: {}", e);
            Ok(RegisterVehicleResult {
                success: false,
                field_errors: None,
                vehicle_id: None,
                error: Some(e.to_string()),
            })
        }
    }
}

/// Fetch one page of vehicles and apply the page-local filters
#[command]
pub async fn load_vehicle_page(
    page: PageRequest,
    filters: ListFilters,
    state: State<'_, AppState>,
) -> Result<VehiclePage, String> {
    let request = PageRequest { page: page.page.max(1), page_size: page.page_size.max(1) };

    let fetched = state.api.list_vehicles(request).await.map_err(|e| e.to_string())?;
    let vehicles = vehicles::filter_page(&fetched.items, &filters);

    Ok(VehiclePage {
        vehicles,
        current_page: request.page,
        total_pages: fetched.total_pages,
        authoritative: fetched.authoritative,
    })
}

/// Start the simulated RFID scan; the result arrives as a `scan_result`
/// event carrying the registration payload.
///
/// Async so the spawned delay runs on the tokio runtime.
#[command]
pub async fn start_scan(
    form: RegistrationForm,
    app: AppHandle,
    state: State<'_, AppState>,
) -> Result<(), String> {
    let mut slot = state.scan.lock().map_err(|e| e.to_string())?;

    // A previous pending scan is aborted, not left to fire late
    if let Some(previous) = slot.take() {
        previous.cancel();
    }

    let app_handle = app.clone();
    let task = ScanTask::spawn(ScanConfig::default(), form, move |result| {
        if let Err(e) = app_handle.emit("scan_result", &result) {
            error!("Failed to emit scan result: {}", e);
        }
    });

    *slot = Some(task);
    Ok(())
}

/// Abort the pending scan, e.g. when the screen is left mid-delay
#[command]
pub fn cancel_scan(state: State<'_, AppState>) {
    if let Ok(mut slot) = state.scan.lock() {
        if let Some(task) = slot.take() {
            task.cancel();
        }
    }
}

/// Current preference snapshot for the settings screen
#[command]
pub fn get_preferences(state: State<'_, AppState>) -> Result<Preferences, String> {
    let prefs = state.prefs.lock().map_err(|e| e.to_string())?;
    Ok(prefs.snapshot())
}

#[command]
pub fn set_theme_mode(mode: ThemeMode, state: State<'_, AppState>) -> Result<(), String> {
    let mut prefs = state.prefs.lock().map_err(|e| e.to_string())?;
    prefs.set_theme_mode(&state.storage, mode);
    Ok(())
}

#[command]
pub fn set_language(code: String, state: State<'_, AppState>) -> Result<(), String> {
    let mut prefs = state.prefs.lock().map_err(|e| e.to_string())?;
    prefs.set_language(&state.storage, Language::from_code(Some(&code)));
    Ok(())
}

#[command]
pub fn set_notifications_enabled(enabled: bool, state: State<'_, AppState>) -> Result<(), String> {
    let mut notifications = state.notifications.lock().map_err(|e| e.to_string())?;
    notifications.set_enabled(&state.storage, enabled);
    Ok(())
}

/// Effective theme for the window's reported color scheme
#[command]
pub fn resolve_theme(window: WebviewWindow, state: State<'_, AppState>) -> Result<Theme, String> {
    let system_scheme = match window.theme() {
        Ok(tauri::Theme::Dark) => Some(Theme::Dark),
        Ok(_) => Some(Theme::Light),
        Err(_) => None,
    };

    let prefs = state.prefs.lock().map_err(|e| e.to_string())?;
    Ok(prefs.theme_mode().resolve(system_scheme))
}

/// Fire an immediate local notification, gated on the preference
#[command]
pub fn send_local_notification(
    title: String,
    body: String,
    app: AppHandle,
    state: State<'_, AppState>,
) {
    notify(&app, &state, &title, &body);
}

/// Recent logins, oldest first
#[command]
pub fn get_login_history(state: State<'_, AppState>) -> Vec<LoginRecord> {
    state.storage.load::<LoginHistory>(LOGIN_HISTORY_KEY)
        .map(|h| h.entries().to_vec())
        .unwrap_or_default()
}

// Helpers

fn save_login_record(state: &State<'_, AppState>, email: &str, timestamp: chrono::DateTime<chrono::Utc>) {
    let mut history: LoginHistory = state.storage.load(LOGIN_HISTORY_KEY).unwrap_or_default();

    history.push(LoginRecord {
        email: email.to_string(),
        timestamp,
        device: whoami::platform().to_string(),
    });

    if let Err(e) = state.storage.save(LOGIN_HISTORY_KEY, &history) {
        error!("Failed to save login history: {}", e);
    }
}

fn notify(app: &AppHandle, state: &State<'_, AppState>, title: &str, body: &str) {
    let notification = state.notifications.lock()
        .ok()
        .and_then(|manager| manager.dispatch(title, body));

    let Some(notification) = notification else {
        return;
    };

    if let Err(e) = app.notification()
        .builder()
        .title(notification.title)
        .body(notification.body)
        .show()
    {
        error!("Failed to show notification: {}", e);
    }
}
