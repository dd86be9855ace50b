//! Authentication Module
//!
//! Session state, display-only JWT claim decoding, and the bounded
//! login history.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Storage keys for auth-related blobs
pub const SESSION_KEY: &str = "current_user";
pub const REMEMBERED_EMAIL_KEY: &str = "user_email";
pub const REMEMBER_ME_KEY: &str = "remember_me";
pub const LOGIN_TIMESTAMP_KEY: &str = "login_timestamp";
pub const LOGIN_HISTORY_KEY: &str = "login_history";

/// Authenticated user record, persisted to local storage.
///
/// Overwritten by the next successful login.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub email: String,
    pub name: Option<String>,
    pub user_type: i32,
    pub token: String,
    pub login_time: chrono::DateTime<chrono::Utc>,
    pub is_authenticated: bool,
}

/// Manages in-memory session state
pub struct AuthManager {
    session: Option<Session>,
}

impl AuthManager {
    /// Create a new auth manager
    pub fn new() -> Self {
        Self { session: None }
    }

    /// Set the current session, replacing any previous one
    pub fn set_session(&mut self, session: Session) {
        info!("Session set for user: {}", session.email);
        self.session = Some(session);
    }

    /// Get the current session
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Get the access token if authenticated
    pub fn access_token(&self) -> Option<&str> {
        self.session().map(|s| s.token.as_str())
    }

    /// Check if currently authenticated
    pub fn is_authenticated(&self) -> bool {
        self.session().map_or(false, |s| s.is_authenticated)
    }

    /// Clear the current session
    pub fn clear_session(&mut self) {
        info!("Session cleared");
        self.session = None;
    }
}

impl Default for AuthManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Display fields extracted from a JWT payload.
///
/// The signature is never verified; these claims are used for display only
/// and must not be treated as a trust boundary.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenClaims {
    #[serde(default)]
    pub sub: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, rename = "userType")]
    pub user_type: String,
}

impl TokenClaims {
    pub fn user_type_code(&self) -> i32 {
        self.user_type.parse().unwrap_or(0)
    }
}

/// Decode the payload segment of a three-segment JWT.
///
/// Returns `None` when the token does not have three dot-separated segments
/// or the middle segment is not base64url JSON.
pub fn decode_token_claims(token: &str) -> Option<TokenClaims> {
    let mut segments = token.split('.');
    let (Some(_), Some(payload), Some(_), None) =
        (segments.next(), segments.next(), segments.next(), segments.next())
    else {
        warn!("Token does not have three segments");
        return None;
    };

    let bytes = URL_SAFE_NO_PAD.decode(payload).ok()?;
    serde_json::from_slice(&bytes).ok()
}

/// Maximum retained login history entries
pub const LOGIN_HISTORY_LIMIT: usize = 10;

/// One entry in the login history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRecord {
    pub email: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub device: String,
}

/// Bounded record of recent logins, oldest evicted first
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LoginHistory {
    entries: Vec<LoginRecord>,
}

impl LoginHistory {
    pub fn push(&mut self, record: LoginRecord) {
        self.entries.push(record);
        if self.entries.len() > LOGIN_HISTORY_LIMIT {
            let excess = self.entries.len() - LOGIN_HISTORY_LIMIT;
            self.entries.drain(..excess);
        }
    }

    pub fn entries(&self) -> &[LoginRecord] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
