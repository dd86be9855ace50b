//! Preferences Module
//!
//! Theme and language preference stores. Loaded once at startup, mutated
//! through write-through setters: persist first, then update memory, so a
//! storage failure leaves in-memory state untouched.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::storage::PreferenceStorage;

pub const THEME_KEY: &str = "theme_preference";
pub const LANGUAGE_KEY: &str = "language_preference";

/// Stored theme preference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    Light,
    Dark,
    System,
}

impl Default for ThemeMode {
    fn default() -> Self {
        ThemeMode::System
    }
}

/// Effective rendering theme. Exactly one of light/dark is active at all
/// times, regardless of the stored mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
}

impl ThemeMode {
    /// Resolve the effective theme against the platform color scheme.
    ///
    /// `System` tracks the platform signal, defaulting to light when the
    /// platform reports nothing. Explicit modes win unconditionally.
    pub fn resolve(self, system_scheme: Option<Theme>) -> Theme {
        match self {
            ThemeMode::Light => Theme::Light,
            ThemeMode::Dark => Theme::Dark,
            ThemeMode::System => system_scheme.unwrap_or(Theme::Light),
        }
    }
}

/// Supported UI languages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Language {
    #[serde(rename = "pt-BR")]
    PtBr,
    #[serde(rename = "es")]
    Es,
}

impl Default for Language {
    fn default() -> Self {
        Language::PtBr
    }
}

impl Language {
    pub fn code(&self) -> &'static str {
        match self {
            Language::PtBr => "pt-BR",
            Language::Es => "es",
        }
    }

    /// Parse a stored locale code, falling back to the default language for
    /// unset or unsupported values.
    pub fn from_code(code: Option<&str>) -> Self {
        match code {
            Some("pt") | Some("pt-BR") => Language::PtBr,
            Some("es") | Some("es-ES") => Language::Es,
            _ => Language::default(),
        }
    }
}

/// Current preference values exposed to the frontend
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    pub theme_mode: ThemeMode,
    pub language: Language,
}

/// Process-wide preference store
pub struct PreferencesManager {
    theme_mode: ThemeMode,
    language: Language,
    loaded: bool,
}

impl PreferencesManager {
    pub fn new() -> Self {
        Self {
            theme_mode: ThemeMode::default(),
            language: Language::default(),
            loaded: false,
        }
    }

    /// One-time load from storage. Missing or unreadable keys keep the
    /// defaults; the manager still counts as loaded.
    pub fn load(&mut self, storage: &PreferenceStorage) {
        if let Ok(mode) = storage.load::<ThemeMode>(THEME_KEY) {
            self.theme_mode = mode;
        }

        match storage.load::<String>(LANGUAGE_KEY) {
            Ok(code) => self.language = Language::from_code(Some(&code)),
            Err(_) => self.language = Language::default(),
        }

        self.loaded = true;
    }

    /// Whether the one-time load has run; the root screen gates on this
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn theme_mode(&self) -> ThemeMode {
        self.theme_mode
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn snapshot(&self) -> Preferences {
        Preferences {
            theme_mode: self.theme_mode,
            language: self.language,
        }
    }

    /// Persist then update the theme mode. A storage failure is logged and
    /// leaves the in-memory value unchanged.
    pub fn set_theme_mode(&mut self, storage: &PreferenceStorage, mode: ThemeMode) {
        if let Err(e) = storage.save(THEME_KEY, &mode) {
            warn!("Failed to persist theme preference: {}", e);
            return;
        }
        self.theme_mode = mode;
    }

    /// Persist then update the language. Same failure contract as the theme.
    pub fn set_language(&mut self, storage: &PreferenceStorage, language: Language) {
        if let Err(e) = storage.save(LANGUAGE_KEY, language.code()) {
            warn!("Failed to persist language preference: {}", e);
            return;
        }
        self.language = language;
    }
}

impl Default for PreferencesManager {
    fn default() -> Self {
        Self::new()
    }
}
