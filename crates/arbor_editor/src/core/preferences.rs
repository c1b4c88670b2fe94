//! Persistent editor preferences, stored as TOML in the platform
//! config directory.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::EditorError;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorPreferences {
    /// Maximum retained undo entries; 0 keeps everything.
    pub history_limit: usize,
    pub autosave_enabled: bool,
    pub autosave_interval_secs: u32,
}

impl Default for EditorPreferences {
    fn default() -> Self {
        Self {
            history_limit: 0,
            autosave_enabled: false,
            autosave_interval_secs: 300,
        }
    }
}

impl EditorPreferences {
    /// Platform default location, e.g. `~/.config/arbor/preferences.toml`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("arbor").join("preferences.toml"))
    }

    /// Load from `path`, falling back to defaults if the file does not
    /// exist yet.
    pub fn load(path: &Path) -> Result<Self, EditorError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path)?;
        Ok(toml::from_str(&text)?)
    }

    pub fn save(&self, path: &Path) -> Result<(), EditorError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let text = toml::to_string_pretty(self)?;
        fs::write(path, text)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toml_round_trip() {
        let prefs = EditorPreferences {
            history_limit: 200,
            autosave_enabled: true,
            autosave_interval_secs: 60,
        };
        let text = toml::to_string_pretty(&prefs).unwrap();
        let back: EditorPreferences = toml::from_str(&text).unwrap();
        assert_eq!(back, prefs);
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let back: EditorPreferences = toml::from_str("history_limit = 50\n").unwrap();
        assert_eq!(back.history_limit, 50);
        assert!(!back.autosave_enabled);
        assert_eq!(back.autosave_interval_secs, 300);
    }

    #[test]
    fn load_of_missing_file_yields_defaults() {
        let prefs =
            EditorPreferences::load(Path::new("/nonexistent/arbor/preferences.toml")).unwrap();
        assert_eq!(prefs, EditorPreferences::default());
    }
}
