//! Wiring of one live theme: store, style reifier and persistence.

use crate::config::{AppConfig, StorageConfig};
use crate::error::AppResult;
use engine::persistence::{FileStorage, PersistenceAdapter, Storage};
use engine::reifier::{HeadlessDocument, Reifier, ReifierHandle};
use engine::store::{Subscription, ThemeStore};
use std::sync::Arc;

/// A hydrated store with the root element and the storage slot attached.
///
/// Dropping the session detaches both observers.
pub struct ThemeSession {
    store: ThemeStore,
    adapter: Arc<PersistenceAdapter>,
    root: ReifierHandle<HeadlessDocument>,
    _subscriptions: Vec<Subscription>,
}

impl std::fmt::Debug for ThemeSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThemeSession")
            .field("store", &self.store)
            .field("adapter", &self.adapter)
            .finish_non_exhaustive()
    }
}

impl ThemeSession {
    /// Open the session on the storage the configuration points at.
    pub fn open(config: &AppConfig) -> AppResult<Self> {
        let storage = open_storage(config.storage())?;
        Self::bootstrap(config, storage)
    }

    /// Build the palette, hydrate the store from `storage` over the
    /// configured defaults, then attach the reifier and persistence.
    pub fn bootstrap(config: &AppConfig, storage: Arc<dyn Storage>) -> AppResult<Self> {
        let palette = config.palette()?;
        let defaults = config.defaults().to_state();

        let adapter = Arc::new(PersistenceAdapter::new(
            storage,
            config.storage_key(),
            palette.clone(),
        )?);
        let initial = adapter.rehydrate_over(defaults.clone());
        let store = ThemeStore::with_config(initial, defaults, palette);

        let (root, styles) = Reifier::attach(&store, HeadlessDocument::new());
        let persistence = PersistenceAdapter::attach(Arc::clone(&adapter), &store);
        log::info!("Theme session ready on '{}'", adapter.key());

        Ok(Self {
            store,
            adapter,
            root,
            _subscriptions: vec![styles, persistence],
        })
    }

    pub fn store(&self) -> &ThemeStore {
        &self.store
    }

    pub fn adapter(&self) -> &PersistenceAdapter {
        &self.adapter
    }

    pub fn root(&self) -> &ReifierHandle<HeadlessDocument> {
        &self.root
    }
}

/// File storage in the configured directory, or the platform default.
pub fn open_storage(config: &StorageConfig) -> AppResult<Arc<dyn Storage>> {
    let storage = match config.directory() {
        Some(directory) => FileStorage::new(directory),
        None => FileStorage::default_location()?,
    };
    log::debug!("Theme storage at {}", storage.directory().display());
    Ok(Arc::new(storage))
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine::persistence::MemoryStorage;
    use engine::state::Mode;

    fn config(source: &str) -> AppConfig {
        toml::from_str(source).unwrap()
    }

    #[test]
    fn test_bootstrap_applies_configured_defaults() {
        let session = ThemeSession::bootstrap(
            &config("[defaults]\nmode = \"dark\"\nprimary_preset = \"teal\""),
            Arc::new(MemoryStorage::new()),
        )
        .unwrap();

        let state = session.store().snapshot();
        assert_eq!(state.mode, Mode::Dark);
        assert_eq!(state.primary_preset, "teal");
        session
            .root()
            .with_document(|doc| assert!(doc.has_class("dark")));
    }

    #[test]
    fn test_stored_values_win_over_configured_defaults() {
        let storage = Arc::new(MemoryStorage::with_entry(
            "tucu-theme-storage",
            r#"{"mode":"light","primaryPreset":"rose"}"#,
        ));
        let session =
            ThemeSession::bootstrap(&config("[defaults]\nmode = \"dark\""), storage).unwrap();

        let state = session.store().snapshot();
        assert_eq!(state.mode, Mode::Light);
        assert_eq!(state.primary_preset, "rose");
        // absent from storage, so taken from the defaults
        assert_eq!(state.secondary_preset, "slate");
    }

    #[test]
    fn test_reset_returns_to_configured_defaults() {
        let session = ThemeSession::bootstrap(
            &config("[defaults]\nlayout = \"admin\""),
            Arc::new(MemoryStorage::new()),
        )
        .unwrap();
        session.store().set_layout(engine::state::Layout::Horizontal);
        session.store().reset();
        assert_eq!(
            session.store().snapshot().layout,
            engine::state::Layout::Admin
        );
    }
}
