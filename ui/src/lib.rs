//! # Tucu Theme Settings
//!
//! Command-line settings surface for the tucu-ui theme engine. It loads the
//! layered configuration, hydrates a [`ThemeStore`](engine::ThemeStore) from
//! the persisted slot, keeps the root element and the slot in sync with the
//! store, and exposes the settings operations as subcommands.
//!
//! ## Modules
//!
//! - [`cli`] - Command-line parsing and command execution
//! - [`config`] - Layered configuration (embedded defaults, file, environment)
//! - [`error`] - Application error types
//! - [`logger`] - File logging setup
//! - [`session`] - Store, reifier and persistence wiring
//! - [`settings`] - The settings panel operations

pub mod cli;
pub mod config;
pub mod error;
pub mod logger;
pub mod session;
pub mod settings;

pub use error::{AppError, AppResult};
pub use session::ThemeSession;
pub use settings::SettingsPanel;
