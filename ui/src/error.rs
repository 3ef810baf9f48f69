use engine::ThemeError;
use std::fmt::Display;

/// Error types for the theme settings surface.
///
/// The engine itself never fails on a bad setting (it logs and keeps the
/// previous state), so these errors only come from the edges the command
/// line touches: configuration, storage and explicit user input.
///
/// # Error Categories
///
/// - [`Config`] - Configuration loading and validation errors
/// - [`Theme`] - Rejected user input (unknown setting, preset or color)
/// - [`Storage`] - The persisted slot could not be read, written or removed
///
/// [`Config`]: AppError::Config
/// [`Theme`]: AppError::Theme
/// [`Storage`]: AppError::Storage
#[derive(Debug, Clone, PartialEq)]
pub enum AppError {
    /// Configuration loading and validation errors.
    ///
    /// These prevent startup; the message already carries the offending
    /// value and where to change it.
    Config(String),

    /// Rejected user input.
    Theme(String),

    /// Storage backend failures.
    Storage(String),
}

impl AppError {
    /// Message shown to the user on the terminal.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Config(msg) => {
                format!("{msg}\n\nPlease check your configuration file and environment variables.")
            }
            AppError::Theme(msg) => {
                format!("{msg}\n\nRun `tucu-theme presets` to list the available presets.")
            }
            AppError::Storage(msg) => {
                format!("{msg}\n\nCheck that the storage directory exists and is writable.")
            }
        }
    }
}

impl Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppError::Config(msg) => write!(f, "Configuration Error: {msg}"),
            AppError::Theme(msg) => write!(f, "Theme Error: {msg}"),
            AppError::Storage(msg) => write!(f, "Storage Error: {msg}"),
        }
    }
}

impl std::error::Error for AppError {}

impl From<ThemeError> for AppError {
    fn from(err: ThemeError) -> Self {
        match err {
            ThemeError::Storage { .. } | ThemeError::Serialization(_) => {
                AppError::Storage(err.to_string())
            }
            other => AppError::Theme(other.to_string()),
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
