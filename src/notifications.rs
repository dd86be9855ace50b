//! Notifications Module
//!
//! Notification preference plus the dispatch gate for local notifications.
//! The command layer hands dispatched notifications to the platform plugin;
//! this module decides whether they may go out at all.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::storage::PreferenceStorage;

pub const NOTIFICATIONS_ENABLED_KEY: &str = "notifications_enabled";

/// A title/body pair for an immediate local notification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalNotification {
    pub title: String,
    pub body: String,
}

/// Process-wide notification preference store and pending registry
pub struct NotificationManager {
    enabled: bool,
    pending: Vec<LocalNotification>,
    loaded: bool,
}

impl NotificationManager {
    pub fn new() -> Self {
        Self {
            enabled: true,
            pending: Vec::new(),
            loaded: false,
        }
    }

    /// One-time load from storage; a missing key keeps notifications enabled
    pub fn load(&mut self, storage: &PreferenceStorage) {
        if let Ok(enabled) = storage.load::<bool>(NOTIFICATIONS_ENABLED_KEY) {
            self.enabled = enabled;
        }
        self.loaded = true;
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Persist then flip the preference. Disabling cancels every pending
    /// scheduled notification before the flag changes in memory; a storage
    /// failure leaves both flag and pending set untouched.
    pub fn set_enabled(&mut self, storage: &PreferenceStorage, enabled: bool) {
        if let Err(e) = storage.save(NOTIFICATIONS_ENABLED_KEY, &enabled) {
            warn!("Failed to persist notification preference: {}", e);
            return;
        }

        if !enabled {
            let cancelled = self.cancel_all_scheduled();
            info!("Cancelled {} pending notification(s)", cancelled);
        }

        self.enabled = enabled;
    }

    /// Gate an immediate notification on the preference.
    ///
    /// Returns the notification to show when enabled, `None` when disabled.
    pub fn dispatch(&self, title: &str, body: &str) -> Option<LocalNotification> {
        if !self.enabled {
            debug!("Notifications disabled, dropping: {}", title);
            return None;
        }

        Some(LocalNotification {
            title: title.to_string(),
            body: body.to_string(),
        })
    }

    /// Queue a notification for later delivery
    pub fn schedule(&mut self, notification: LocalNotification) {
        self.pending.push(notification);
    }

    /// Drop every pending scheduled notification, returning how many
    pub fn cancel_all_scheduled(&mut self) -> usize {
        let cancelled = self.pending.len();
        self.pending.clear();
        cancelled
    }

    pub fn pending(&self) -> &[LocalNotification] {
        &self.pending
    }
}

impl Default for NotificationManager {
    fn default() -> Self {
        Self::new()
    }
}
