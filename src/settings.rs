//! Boot-time settings: which payload is selected and whether it runs on its own.
//!
//! Stored as JSON, e.g. `{"selected_payload": "wifi.dd", "auto_execute": true}`.

use serde::Deserialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

/// Payload used when none has been selected.
pub const DEFAULT_PAYLOAD: &str = "payload.dd";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("cannot read settings: {0}")]
    Io(#[from] io::Error),

    #[error("malformed settings: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub selected_payload: String,
    pub auto_execute: bool,
}

/// What the device should do once booted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BootAction {
    /// Run this payload immediately, without waiting for the menu.
    AutoRun(PathBuf),
    /// Wait for a selection from the menu.
    Menu,
}

impl Settings {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Like [`Settings::load`], but a missing or malformed file yields defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        Self::load(path).unwrap_or_else(|err| {
            warn!(path = %path.display(), "{err}; using default settings");
            Self::default()
        })
    }

    /// The selected payload inside `payload_dir`.
    pub fn payload_path(&self, payload_dir: impl AsRef<Path>) -> PathBuf {
        let name = match self.selected_payload.trim() {
            "" => DEFAULT_PAYLOAD,
            name => name,
        };
        payload_dir.as_ref().join(name)
    }

    pub fn boot_action(&self, payload_dir: impl AsRef<Path>) -> BootAction {
        if self.auto_execute {
            BootAction::AutoRun(self.payload_path(payload_dir))
        } else {
            BootAction::Menu
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{"selected_payload": "wifi.dd", "auto_execute": true}"#).unwrap();
        let settings = Settings::load(&path).unwrap();
        assert_eq!(settings.selected_payload, "wifi.dd");
        assert!(settings.auto_execute);
    }

    #[test]
    fn test_missing_fields_default() {
        let settings: Settings = serde_json::from_str(r#"{"auto_execute": true}"#).unwrap();
        assert_eq!(settings.selected_payload, "");
        assert_eq!(
            settings.payload_path("/payloads"),
            PathBuf::from("/payloads/payload.dd")
        );
    }

    #[test]
    fn test_load_or_default() {
        let dir = TempDir::new().unwrap();
        assert_eq!(
            Settings::load_or_default(dir.path().join("missing.json")),
            Settings::default()
        );
        let bad = dir.path().join("bad.json");
        fs::write(&bad, "{not json").unwrap();
        assert!(matches!(Settings::load(&bad), Err(SettingsError::Json(_))));
        assert_eq!(Settings::load_or_default(&bad), Settings::default());
    }

    #[test]
    fn test_boot_action() {
        let mut settings = Settings {
            selected_payload: "a.dd".into(),
            auto_execute: false,
        };
        assert_eq!(settings.boot_action("/payloads"), BootAction::Menu);
        settings.auto_execute = true;
        assert_eq!(
            settings.boot_action("/payloads"),
            BootAction::AutoRun(PathBuf::from("/payloads/a.dd"))
        );
    }
}
