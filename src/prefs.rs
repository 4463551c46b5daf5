//! Persistent key-value preferences.
//!
//! All keys live in one JSON document. Every write replaces the whole file
//! through a temp file + rename, so a reader never observes a half-written
//! record and a failed write leaves both disk and memory untouched.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::i18n::Language;

pub mod keys {
    pub const ONBOARDING_SEEN: &str = "onboarding_seen";
    pub const DARK_MODE: &str = "dark_mode";
    pub const LANGUAGE: &str = "language";
    pub const WIDGET_INSTALLED: &str = "widget_installed";
    pub const SPEED_OVERLAY: &str = "speed_overlay";
    pub const PREMIUM: &str = "premium";
    pub const DEFINITIONS: &str = "definitions";
}

pub struct PreferenceStore {
    path: PathBuf,
    values: Mutex<BTreeMap<String, Value>>,
}

impl PreferenceStore {
    /// Open the store at `path`. A missing file is an empty store; a corrupt
    /// one is logged and treated as empty until the next write.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let values = match std::fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str::<BTreeMap<String, Value>>(&content) {
                Ok(map) => map,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "preferences file is corrupt, starting empty");
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(Error::store(&path, e)),
        };

        debug!(path = %path.display(), keys = values.len(), "preferences loaded");
        Ok(Self {
            path,
            values: Mutex::new(values),
        })
    }

    /// Empty store that never read `path`. Writes still target it.
    pub fn in_memory(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            values: Mutex::new(BTreeMap::new()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.lock().get(key).cloned()
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(|v| v.as_bool())
    }

    pub fn get_str(&self, key: &str) -> Option<String> {
        self.get(key).and_then(|v| v.as_str().map(str::to_string))
    }

    /// Typed read. A value that no longer matches `T` reads as absent.
    pub fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.get(key)?;
        match serde_json::from_value(value) {
            Ok(v) => Some(v),
            Err(e) => {
                warn!(key, error = %e, "stored preference has unexpected shape");
                None
            }
        }
    }

    /// Replace one key and persist the whole document.
    pub fn set(&self, key: &str, value: Value) -> Result<()> {
        let mut guard = self.lock();
        let mut next = guard.clone();
        next.insert(key.to_string(), value);
        self.persist(&next)?;
        *guard = next;
        debug!(key, "preference written");
        Ok(())
    }

    pub fn set_bool(&self, key: &str, value: bool) -> Result<()> {
        self.set(key, Value::Bool(value))
    }

    pub fn set_str(&self, key: &str, value: &str) -> Result<()> {
        self.set(key, Value::String(value.to_string()))
    }

    pub fn set_json<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        self.set(key, serde_json::to_value(value)?)
    }

    fn persist(&self, values: &BTreeMap<String, Value>) -> Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir).map_err(|e| Error::store(&dir, e))?;

        let mut tmp = NamedTempFile::new_in(&dir).map_err(|e| Error::store(&dir, e))?;
        serde_json::to_writer_pretty(tmp.as_file_mut(), values)?;
        tmp.as_file_mut()
            .flush()
            .and_then(|_| tmp.as_file().sync_all())
            .map_err(|e| Error::store(tmp.path(), e))?;
        tmp.persist(&self.path)
            .map_err(|e| Error::store(&self.path, e.error))?;
        Ok(())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, Value>> {
        self.values.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

/// Snapshot of the user-facing settings. Owned by the app shell and passed to
/// screens; setters persist first and only then update the snapshot.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UserPreferences {
    pub theme: Theme,
    pub language: Language,
    pub widget_enabled: bool,
    pub speed_overlay: bool,
    pub premium_unlocked: bool,
    pub onboarding_seen: bool,
}

impl UserPreferences {
    pub fn load(store: &PreferenceStore) -> Self {
        let flag = |key: &str| store.get_bool(key).unwrap_or(false);
        Self {
            theme: if flag(keys::DARK_MODE) {
                Theme::Dark
            } else {
                Theme::Light
            },
            language: store
                .get_str(keys::LANGUAGE)
                .and_then(|code| Language::from_code(&code))
                .unwrap_or_default(),
            widget_enabled: flag(keys::WIDGET_INSTALLED),
            speed_overlay: flag(keys::SPEED_OVERLAY),
            premium_unlocked: flag(keys::PREMIUM),
            onboarding_seen: flag(keys::ONBOARDING_SEEN),
        }
    }

    pub fn set_theme(&mut self, store: &PreferenceStore, theme: Theme) -> Result<()> {
        store.set_bool(keys::DARK_MODE, theme == Theme::Dark)?;
        self.theme = theme;
        Ok(())
    }

    pub fn set_language(&mut self, store: &PreferenceStore, language: Language) -> Result<()> {
        store.set_str(keys::LANGUAGE, language.code())?;
        self.language = language;
        Ok(())
    }

    pub fn set_widget_enabled(&mut self, store: &PreferenceStore, enabled: bool) -> Result<()> {
        store.set_bool(keys::WIDGET_INSTALLED, enabled)?;
        self.widget_enabled = enabled;
        Ok(())
    }

    pub fn set_speed_overlay(&mut self, store: &PreferenceStore, enabled: bool) -> Result<()> {
        store.set_bool(keys::SPEED_OVERLAY, enabled)?;
        self.speed_overlay = enabled;
        Ok(())
    }

    pub fn set_premium_unlocked(&mut self, store: &PreferenceStore, unlocked: bool) -> Result<()> {
        store.set_bool(keys::PREMIUM, unlocked)?;
        self.premium_unlocked = unlocked;
        Ok(())
    }

    pub fn mark_onboarding_seen(&mut self, store: &PreferenceStore) -> Result<()> {
        store.set_bool(keys::ONBOARDING_SEEN, true)?;
        self.onboarding_seen = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn values_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("preferences.json");

        let store = PreferenceStore::open(&path).unwrap();
        store.set_bool(keys::PREMIUM, true).unwrap();
        store.set_str(keys::LANGUAGE, "sw").unwrap();
        drop(store);

        let reopened = PreferenceStore::open(&path).unwrap();
        assert_eq!(reopened.get_bool(keys::PREMIUM), Some(true));
        assert_eq!(reopened.get_str(keys::LANGUAGE).as_deref(), Some("sw"));
        assert_eq!(reopened.get_bool(keys::DARK_MODE), None);
    }

    #[test]
    fn corrupt_file_opens_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("preferences.json");
        std::fs::write(&path, "{not json").unwrap();

        let store = PreferenceStore::open(&path).unwrap();
        assert_eq!(store.get(keys::PREMIUM), None);
    }

    #[test]
    fn failed_write_leaves_memory_untouched() {
        let dir = TempDir::new().unwrap();
        // A directory where the file should be makes the final rename fail.
        let path = dir.path().join("preferences.json");
        std::fs::create_dir(&path).unwrap();
        std::fs::write(path.join("occupied"), b"x").unwrap();

        let blocked = PreferenceStore {
            path: path.clone(),
            values: Mutex::new(BTreeMap::new()),
        };
        assert!(blocked.set_bool(keys::PREMIUM, true).is_err());
        assert_eq!(blocked.get_bool(keys::PREMIUM), None);
    }

    #[test]
    fn user_preferences_round_trip_through_store() {
        let dir = TempDir::new().unwrap();
        let store = PreferenceStore::open(dir.path().join("preferences.json")).unwrap();

        let mut prefs = UserPreferences::load(&store);
        assert_eq!(prefs, UserPreferences::default());

        prefs.set_theme(&store, Theme::Dark).unwrap();
        prefs.set_language(&store, Language::Sw).unwrap();
        prefs.set_widget_enabled(&store, true).unwrap();
        prefs.mark_onboarding_seen(&store).unwrap();

        let loaded = UserPreferences::load(&store);
        assert_eq!(loaded, prefs);
        assert_eq!(store.get_bool(keys::DARK_MODE), Some(true));
        assert!(!loaded.premium_unlocked);
    }

    #[test]
    fn unknown_language_code_falls_back_to_default() {
        let dir = TempDir::new().unwrap();
        let store = PreferenceStore::open(dir.path().join("preferences.json")).unwrap();
        store.set_str(keys::LANGUAGE, "fr").unwrap();
        assert_eq!(UserPreferences::load(&store).language, Language::En);
    }
}
