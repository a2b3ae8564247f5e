//! User settings document.
//!
//! Stored as one JSON record in the durable store. Absent or corrupt
//! records fall back to defaults; the extension never refuses to start
//! over settings.

use serde::{Deserialize, Serialize};

use sg_lists::schedule::UpdateFrequency;
use sg_lists::storage::{keys, KeyValueStore};

/// Popup/settings-page color theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    /// Follow the host's color-scheme preference.
    #[default]
    System,
}

/// User-facing configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub theme: Theme,
    /// When false, unsafe sites keep their icon status but never redirect
    /// to the interstitial.
    pub warning_page: bool,
    pub update_frequency: UpdateFrequency,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: Theme::System,
            warning_page: true,
            update_frequency: UpdateFrequency::Daily,
        }
    }
}

impl Settings {
    /// Load from the store, falling back to defaults on a missing or
    /// unreadable record.
    pub fn load(store: &dyn KeyValueStore) -> Settings {
        match store.get(keys::SETTINGS) {
            Ok(Some(json)) => match serde_json::from_str(&json) {
                Ok(settings) => settings,
                Err(err) => {
                    log::warn!("corrupt settings record, using defaults: {err}");
                    Settings::default()
                }
            },
            Ok(None) => Settings::default(),
            Err(err) => {
                log::warn!("settings read failed, using defaults: {err}");
                Settings::default()
            }
        }
    }

    /// Persist to the store. Failure is logged; the in-memory settings
    /// stay authoritative for the session.
    pub fn save(&self, store: &dyn KeyValueStore) {
        match serde_json::to_string(self) {
            Ok(json) => {
                if let Err(err) = store.set(keys::SETTINGS, &json) {
                    log::warn!("settings write failed: {err}");
                }
            }
            Err(err) => log::warn!("settings encode failed: {err}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sg_lists::storage::MemoryStore;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.theme, Theme::System);
        assert!(settings.warning_page);
        assert_eq!(settings.update_frequency, UpdateFrequency::Daily);
    }

    #[test]
    fn test_load_missing_record_uses_defaults() {
        let store = MemoryStore::new();
        assert_eq!(Settings::load(&store), Settings::default());
    }

    #[test]
    fn test_load_corrupt_record_uses_defaults() {
        let store = MemoryStore::new();
        store.set(keys::SETTINGS, "{not json").ok();
        assert_eq!(Settings::load(&store), Settings::default());
    }

    #[test]
    fn test_save_load_roundtrip() {
        let store = MemoryStore::new();
        let settings = Settings {
            theme: Theme::Dark,
            warning_page: false,
            update_frequency: UpdateFrequency::Monthly,
        };
        settings.save(&store);
        assert_eq!(Settings::load(&store), settings);
    }

    #[test]
    fn test_wire_field_names() {
        let json = serde_json::to_value(Settings::default()).expect("encode");
        assert!(json.get("warningPage").is_some());
        assert!(json.get("updateFrequency").is_some());
        assert_eq!(json["theme"], "system");
    }

    #[test]
    fn test_partial_document_fills_defaults() {
        let parsed: Settings = serde_json::from_str(r#"{"theme":"dark"}"#).expect("decode");
        assert_eq!(parsed.theme, Theme::Dark);
        assert!(parsed.warning_page);
    }
}
