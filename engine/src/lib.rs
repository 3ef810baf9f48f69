//! # Tucu Theme Engine
//!
//! Core library behind the tucu-ui theming system. It owns the theme
//! configuration (color mode, text direction, layout, three preset color
//! roles and custom override colors), broadcasts every change to its
//! subscribers, reifies the state into root-element classes, attributes and
//! CSS custom properties, and persists the durable part of it.
//!
//! ## Modules
//!
//! - [`color`] - CSS color parsing, validation and HSL adjustments
//! - [`error`] - Error types for the fallible edges of the engine
//! - [`palette`] - Read-only preset table and identifier resolution
//! - [`persistence`] - Storage backends and the rehydration adapter
//! - [`reifier`] - Root-element patches, the `Document` abstraction and CSS output
//! - [`state`] - Theme state, setting enums and the persisted subset
//! - [`store`] - The observable state store and its mutation queue
//! - [`validation`] - Shared `Validator` trait and identifier validators
//!
//! ## Wiring
//!
//! ```no_run
//! use engine::persistence::{MemoryStorage, PersistenceAdapter};
//! use engine::reifier::{HeadlessDocument, Reifier};
//! use engine::state::Mode;
//! use engine::store::ThemeStore;
//! use std::sync::Arc;
//!
//! let storage = Arc::new(MemoryStorage::new());
//! let adapter = Arc::new(PersistenceAdapter::new(
//!     storage,
//!     PersistenceAdapter::storage_key("tucu"),
//!     engine::palette::Palette::builtin(),
//! )?);
//!
//! let store = ThemeStore::new(adapter.rehydrate());
//! let (document, _styles) = Reifier::attach(&store, HeadlessDocument::new());
//! let _persistence = PersistenceAdapter::attach(adapter, &store);
//!
//! store.set_mode(Mode::Dark);
//! document.with_document(|root| assert!(root.has_class("dark")));
//! # Ok::<(), engine::error::ThemeError>(())
//! ```

pub mod color;
pub mod error;
pub mod palette;
pub mod persistence;
pub mod reifier;
pub mod state;
pub mod store;
pub mod validation;

pub use error::{ThemeError, ThemeResult};
pub use store::{Subscription, ThemeStore};
