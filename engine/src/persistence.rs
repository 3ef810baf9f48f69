//! # Persistence Adapter
//!
//! Stores the persisted subset of the theme ([`PersistedTheme`]) as a JSON
//! object in a single durable key-value slot and restores it at startup.
//!
//! Rehydration never fails. Each field is decoded on its own, so a corrupt
//! `mode` does not cost the user their preset choices: invalid fields are
//! logged and replaced by the corresponding value from the base state.
//!
//! Writes happen on every store notification, but an identical payload is
//! only written once, which keeps settings-panel toggles and repeated
//! no-change cycles from touching the storage backend.

use crate::error::{ThemeError, ThemeResult};
use crate::palette::Palette;
use crate::state::{CustomRole, PersistedTheme, PresetRole, ThemeState};
use crate::store::{Subscription, ThemeStore};
use crate::validation::{StorageKeyValidator, Validator};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::{Arc, Mutex, PoisonError};

/// Durable key-value slot backend.
pub trait Storage: Send + Sync {
    fn get(&self, key: &str) -> ThemeResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> ThemeResult<()>;
    fn remove(&self, key: &str) -> ThemeResult<()>;
}

/// Process-local storage, mainly for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(key: impl Into<String>, value: impl Into<String>) -> Self {
        let storage = Self::new();
        storage
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.into(), value.into());
        storage
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> ThemeResult<Option<String>> {
        Ok(self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned())
    }

    fn set(&self, key: &str, value: &str) -> ThemeResult<()> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> ThemeResult<()> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
        Ok(())
    }
}

/// One `<key>.json` file per slot inside a directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    directory: PathBuf,
}

impl FileStorage {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    /// `<platform config dir>/tucu`
    pub fn default_location() -> ThemeResult<Self> {
        let base = dirs::config_dir().ok_or_else(|| {
            ThemeError::storage("*", "Could not determine the user configuration directory")
        })?;
        Ok(Self::new(base.join("tucu")))
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    fn path_for(&self, key: &str) -> ThemeResult<PathBuf> {
        StorageKeyValidator.validate(key)?;
        Ok(self.directory.join(format!("{key}.json")))
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> ThemeResult<Option<String>> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(ThemeError::storage(
                key,
                format!("Failed to read '{}': {e}", path.display()),
            )),
        }
    }

    fn set(&self, key: &str, value: &str) -> ThemeResult<()> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.directory).map_err(|e| {
            ThemeError::storage(
                key,
                format!(
                    "Failed to create directory '{}': {e}",
                    self.directory.display()
                ),
            )
        })?;

        // write-then-rename so a crash never leaves a truncated slot behind
        let staging = path.with_extension("json.tmp");
        fs::write(&staging, value).map_err(|e| {
            ThemeError::storage(key, format!("Failed to write '{}': {e}", staging.display()))
        })?;
        fs::rename(&staging, &path).map_err(|e| {
            ThemeError::storage(key, format!("Failed to replace '{}': {e}", path.display()))
        })?;
        Ok(())
    }

    fn remove(&self, key: &str) -> ThemeResult<()> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ThemeError::storage(
                key,
                format!("Failed to remove '{}': {e}", path.display()),
            )),
        }
    }
}

/// Reads and writes the persisted theme slot.
pub struct PersistenceAdapter {
    storage: Arc<dyn Storage>,
    key: String,
    palette: Palette,
    last_written: Mutex<Option<String>>,
}

impl std::fmt::Debug for PersistenceAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistenceAdapter")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

impl PersistenceAdapter {
    pub fn new(storage: Arc<dyn Storage>, key: impl Into<String>, palette: Palette) -> ThemeResult<Self> {
        let key = key.into();
        StorageKeyValidator.validate(&key)?;

        Ok(Self {
            storage,
            key,
            palette,
            last_written: Mutex::new(None),
        })
    }

    /// Slot name for an application: `"<app>-theme-storage"`.
    pub fn storage_key(app: &str) -> String {
        format!("{app}-theme-storage")
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Restore state over library defaults.
    pub fn rehydrate(&self) -> ThemeState {
        self.rehydrate_over(ThemeState::default())
    }

    /// Restore state, taking every missing or invalid field from `base`.
    pub fn rehydrate_over(&self, base: ThemeState) -> ThemeState {
        match self.storage.get(&self.key) {
            Ok(Some(raw)) => {
                let state = decode_persisted(&raw, base, &self.palette);
                log::info!("Rehydrated theme from '{}'", self.key);
                state
            }
            Ok(None) => {
                log::info!("No stored theme under '{}', using defaults", self.key);
                ThemeState {
                    is_settings_open: false,
                    ..base
                }
            }
            Err(e) => {
                log::error!("Failed to read stored theme: {e}");
                ThemeState {
                    is_settings_open: false,
                    ..base
                }
            }
        }
    }

    /// Write the persisted subset of `state`.
    ///
    /// Returns `Ok(false)` when the payload matches the last write.
    pub fn persist(&self, state: &ThemeState) -> ThemeResult<bool> {
        let payload = serde_json::to_string(&PersistedTheme::from(state))?;

        let mut last_written = self
            .last_written
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if last_written.as_deref() == Some(payload.as_str()) {
            return Ok(false);
        }

        self.storage.set(&self.key, &payload)?;
        log::debug!("Persisted theme to '{}'", self.key);
        *last_written = Some(payload);
        Ok(true)
    }

    /// Remove the slot entirely.
    pub fn clear(&self) -> ThemeResult<()> {
        self.storage.remove(&self.key)?;
        *self
            .last_written
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = None;
        log::info!("Cleared stored theme '{}'", self.key);
        Ok(())
    }

    /// Persist after every store notification. Storage failures are logged.
    pub fn attach(adapter: Arc<Self>, store: &ThemeStore) -> Subscription {
        log::info!("Persistence attached to '{}'", adapter.key);
        store.subscribe(move |state| {
            if let Err(e) = adapter.persist(state) {
                log::error!("Failed to persist theme: {e}");
            }
        })
    }
}

/// Decode a stored payload field by field over `base`.
pub fn decode_persisted(raw: &str, base: ThemeState, palette: &Palette) -> ThemeState {
    let mut state = ThemeState {
        is_settings_open: false,
        ..base
    };

    let value: Value = match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(e) => {
            log::warn!("Stored theme is not valid JSON, using defaults: {e}");
            return state;
        }
    };
    let Some(object) = value.as_object() else {
        log::warn!("Stored theme is not a JSON object, using defaults");
        return state;
    };

    if let Some(mode) = enum_field(object, "mode") {
        state.mode = mode;
    }
    if let Some(direction) = enum_field(object, "direction") {
        state.direction = direction;
    }
    if let Some(layout) = enum_field(object, "layout") {
        state.layout = layout;
    }

    for &role in PresetRole::ALL {
        let key = role.persisted_key();
        match object.get(key) {
            None => {}
            Some(Value::String(id)) if palette.contains(id) => {
                *state.preset_mut(role) = id.clone();
            }
            Some(other) => log::warn!("Ignoring stored {key} {other}: not a known preset"),
        }
    }
    state.repair_presets(palette);

    match object.get("customPaletteColor") {
        None => {}
        Some(Value::Object(entries)) => {
            state.custom_palette_color = custom_colors(entries);
        }
        Some(Value::Null) => state.custom_palette_color = BTreeMap::new(),
        Some(other) => log::warn!("Ignoring stored customPaletteColor {other}: not an object"),
    }

    state
}

fn enum_field<T: FromStr<Err = String>>(object: &Map<String, Value>, key: &str) -> Option<T> {
    let value = object.get(key)?;
    match value.as_str().map(str::parse::<T>) {
        Some(Ok(parsed)) => Some(parsed),
        Some(Err(e)) => {
            log::warn!("Ignoring stored {key}: {e}");
            None
        }
        None => {
            log::warn!("Ignoring stored {key} {value}: expected a string");
            None
        }
    }
}

fn custom_colors(entries: &Map<String, Value>) -> BTreeMap<CustomRole, String> {
    entries
        .iter()
        .filter_map(|(role, color)| {
            let role = match role.parse::<CustomRole>() {
                Ok(role) => role,
                Err(e) => {
                    log::warn!("Dropping stored custom color: {e}");
                    return None;
                }
            };
            match color.as_str().map(str::trim) {
                Some(color) if !color.is_empty() => Some((role, color.to_string())),
                _ => {
                    log::warn!("Dropping stored custom color for '{role}': {color}");
                    None
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{Direction, Layout, Mode};

    fn decode(raw: &str) -> ThemeState {
        decode_persisted(raw, ThemeState::default(), &Palette::builtin())
    }

    #[test]
    fn test_decode_full_payload() {
        let state = decode(
            r##"{
                "mode": "dark",
                "direction": "rtl",
                "layout": "admin",
                "primaryPreset": "emerald",
                "secondaryPreset": "rose",
                "accentPreset": "amber",
                "customPaletteColor": { "dark": "#112233" }
            }"##,
        );
        assert_eq!(state.mode, Mode::Dark);
        assert_eq!(state.direction, Direction::Rtl);
        assert_eq!(state.layout, Layout::Admin);
        assert_eq!(state.primary_preset, "emerald");
        assert_eq!(state.secondary_preset, "rose");
        assert_eq!(state.accent_preset, "amber");
        assert_eq!(state.custom_color(CustomRole::Dark), Some("#112233"));
    }

    #[test]
    fn test_decode_garbage_yields_defaults() {
        for raw in ["", "not json", "[1, 2, 3]", "42", "null", "\"dark\""] {
            assert_eq!(decode(raw), ThemeState::default(), "payload {raw:?}");
        }
    }

    #[test]
    fn test_decode_isolates_corrupt_fields() {
        let state = decode(
            r##"{
                "mode": 123,
                "direction": "sideways",
                "layout": "horizontal",
                "primaryPreset": "nope",
                "secondaryPreset": 7,
                "accentPreset": "teal",
                "customPaletteColor": { "dark": 5, "light": "#fafafa", "brand": "#000000", "muted": "  " }
            }"##,
        );
        assert_eq!(state.mode, Mode::Light);
        assert_eq!(state.direction, Direction::Ltr);
        assert_eq!(state.layout, Layout::Horizontal);
        assert_eq!(state.primary_preset, "default");
        assert_eq!(state.secondary_preset, "slate");
        assert_eq!(state.accent_preset, "teal");
        assert_eq!(state.custom_palette_color.len(), 1);
        assert_eq!(state.custom_color(CustomRole::Light), Some("#fafafa"));
    }

    #[test]
    fn test_decode_keeps_base_for_missing_fields() {
        let base = ThemeState {
            mode: Mode::Dark,
            primary_preset: "rose".to_string(),
            is_settings_open: true,
            ..ThemeState::default()
        };
        let state = decode_persisted(r#"{"layout": "admin"}"#, base, &Palette::builtin());
        assert_eq!(state.mode, Mode::Dark);
        assert_eq!(state.primary_preset, "rose");
        assert_eq!(state.layout, Layout::Admin);
        assert!(!state.is_settings_open);
    }

    #[test]
    fn test_persist_skips_identical_payloads() {
        let storage = Arc::new(MemoryStorage::new());
        let adapter =
            PersistenceAdapter::new(storage.clone(), "test-theme-storage", Palette::builtin())
                .unwrap();

        let mut state = ThemeState::default();
        assert!(adapter.persist(&state).unwrap());
        assert!(!adapter.persist(&state).unwrap());

        state.is_settings_open = true;
        assert!(!adapter.persist(&state).unwrap());

        state.mode = Mode::Dark;
        assert!(adapter.persist(&state).unwrap());
        assert_eq!(storage.len(), 1);
    }

    #[test]
    fn test_rejects_unsafe_storage_key() {
        let storage = Arc::new(MemoryStorage::new());
        assert!(PersistenceAdapter::new(storage, "../theme", Palette::builtin()).is_err());
    }

    #[test]
    fn test_storage_key_format() {
        assert_eq!(
            PersistenceAdapter::storage_key("tucu"),
            "tucu-theme-storage"
        );
    }
}
