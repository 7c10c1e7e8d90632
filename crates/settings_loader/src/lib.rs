//! # Settings Loader
//!
//! Theme catalogue and the small preference file that remembers which theme the user
//! picked.
//!
//! ## Features
//!
//! - Load preferences from a JSON file (`{"theme": "dark"}`)
//! - Fall back to the default theme when the file is missing, unreadable or names an
//!   unknown theme
//! - Persist the preference on every change through [`PreferenceStore`]
//! - Expose each theme's colour tokens as CSS variables and as a chart palette
//!
//! ## Usage Examples
//!
//! ```rust,no_run
//! use settings_loader::{PreferenceStore, ThemeId};
//!
//! let mut store = PreferenceStore::open("preferences.json");
//! store.set_theme(ThemeId::Dark)?;
//! let css = store.theme().css_variables();
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod themes;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub use themes::{Theme, ThemeId, catalogue, theme};

pub const DEFAULT_PREFERENCES_PATH: &str = "preferences.json";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    pub theme: ThemeId,
}

#[derive(Debug, Deserialize)]
struct RawPreferences {
    #[serde(default)]
    theme: Option<String>,
}

/// Loads preferences from a JSON file
pub fn load_preferences<P: AsRef<Path>>(path: P) -> Result<Preferences> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Reading preferences file: {}", path.display()))?;
    let parsed: RawPreferences = serde_json::from_str(&raw)
        .with_context(|| format!("Parsing preferences JSON in {}", path.display()))?;
    let theme = parsed
        .theme
        .as_deref()
        .map(ThemeId::parse_or_default)
        .unwrap_or_default();
    Ok(Preferences { theme })
}

/// Loads preferences, returning the defaults when the file is absent or unusable
pub fn load_preferences_or_default<P: AsRef<Path>>(path: P) -> Preferences {
    let path = path.as_ref();
    if !preferences_file_exists(path) {
        return Preferences::default();
    }
    match load_preferences(path) {
        Ok(prefs) => prefs,
        Err(err) => {
            tracing::warn!(error = %err, "ignoring unreadable preferences");
            Preferences::default()
        }
    }
}

/// Writes preferences as pretty JSON, creating parent directories when needed
pub fn save_preferences<P: AsRef<Path>>(path: P, prefs: &Preferences) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Creating preferences dir: {}", parent.display()))?;
        }
    }
    let json = serde_json::to_string_pretty(prefs)?;
    fs::write(path, json)
        .with_context(|| format!("Writing preferences file: {}", path.display()))?;
    Ok(())
}

/// Checks if a preferences file exists at the given path
pub fn preferences_file_exists<P: AsRef<Path>>(path: P) -> bool {
    path.as_ref().exists() && path.as_ref().is_file()
}

/// Current preferences backed by a file. Every change is written through.
#[derive(Debug, Clone)]
pub struct PreferenceStore {
    path: PathBuf,
    current: Preferences,
}

impl PreferenceStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let current = load_preferences_or_default(&path);
        Self { path, current }
    }

    pub fn open_default() -> Self {
        Self::open(DEFAULT_PREFERENCES_PATH)
    }

    pub fn preferences(&self) -> &Preferences {
        &self.current
    }

    pub fn theme_id(&self) -> ThemeId {
        self.current.theme
    }

    pub fn theme(&self) -> Theme {
        theme(self.current.theme)
    }

    pub fn set_theme(&mut self, id: ThemeId) -> Result<()> {
        self.current.theme = id;
        save_preferences(&self.path, &self.current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "settings_loader_{}_{}",
            name,
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        dir.join("prefs").join("preferences.json")
    }

    #[test]
    fn test_missing_file_gives_default() {
        let prefs = load_preferences_or_default(temp_path("missing"));
        assert_eq!(prefs.theme, ThemeId::Light);
    }

    #[test]
    fn test_store_persists_every_change() {
        let path = temp_path("persist");
        let mut store = PreferenceStore::open(&path);
        assert_eq!(store.theme_id(), ThemeId::Light);

        store.set_theme(ThemeId::Forest).unwrap();
        assert_eq!(PreferenceStore::open(&path).theme_id(), ThemeId::Forest);

        store.set_theme(ThemeId::Dark).unwrap();
        assert_eq!(load_preferences(&path).unwrap().theme, ThemeId::Dark);
        assert_eq!(store.theme().id, ThemeId::Dark);
    }

    #[test]
    fn test_unknown_or_corrupt_values_fall_back() {
        let path = temp_path("fallback");
        fs::create_dir_all(path.parent().unwrap()).unwrap();

        fs::write(&path, r#"{"theme": "neon"}"#).unwrap();
        assert_eq!(load_preferences_or_default(&path).theme, ThemeId::Light);

        fs::write(&path, "not json").unwrap();
        assert!(load_preferences(&path).is_err());
        assert_eq!(load_preferences_or_default(&path).theme, ThemeId::Light);

        fs::write(&path, "{}").unwrap();
        assert_eq!(load_preferences(&path).unwrap().theme, ThemeId::Light);
    }
}
