use thiserror::Error;

/// Errors produced at the fallible edges of the theme engine.
///
/// The store itself never surfaces these to consumers: invalid settings are
/// logged and ignored, malformed colors fall back to the last good value and
/// corrupt persisted data degrades to defaults. `ThemeError` only escapes from
/// operations that genuinely touch the outside world (storage, parsing of
/// user-supplied strings) so callers at those edges can decide what to report.
///
/// # Error Categories
///
/// ## Input Errors
/// - [`InvalidColor`] - A string that is not a recognizable CSS color
/// - [`UnknownPreset`] - A preset identifier missing from the palette
/// - [`InvalidSetting`] - A settings key or value that cannot be mapped to a mutation
///
/// ## Storage Errors
/// - [`Storage`] - The durable key-value slot could not be read or written
/// - [`Serialization`] - The persisted payload could not be encoded
///
/// # Examples
///
/// ```no_run
/// use engine::error::ThemeError;
/// use engine::store::Mutation;
///
/// match Mutation::parse("mode", "sepia") {
///     Ok(mutation) => println!("parsed {mutation:?}"),
///     Err(ThemeError::InvalidSetting { key, value, reason }) => {
///         eprintln!("ignoring {key}={value}: {reason}");
///     }
///     Err(other) => eprintln!("unexpected: {other}"),
/// }
/// ```
///
/// [`InvalidColor`]: ThemeError::InvalidColor
/// [`UnknownPreset`]: ThemeError::UnknownPreset
/// [`InvalidSetting`]: ThemeError::InvalidSetting
/// [`Storage`]: ThemeError::Storage
/// [`Serialization`]: ThemeError::Serialization
#[derive(Debug, Error)]
pub enum ThemeError {
    #[error("Invalid color '{value}': {reason}")]
    InvalidColor { value: String, reason: String },

    #[error("Unknown preset '{id}'")]
    UnknownPreset { id: String },

    #[error("Invalid setting {key}={value}: {reason}")]
    InvalidSetting {
        key: String,
        value: String,
        reason: String,
    },

    #[error("Storage error for key '{key}': {reason}")]
    Storage { key: String, reason: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ThemeError {
    pub fn invalid_color(value: impl Into<String>, reason: impl Into<String>) -> Self {
        ThemeError::InvalidColor {
            value: value.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid_setting(
        key: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        ThemeError::InvalidSetting {
            key: key.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    pub fn storage(key: impl Into<String>, reason: impl Into<String>) -> Self {
        ThemeError::Storage {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Whether the error comes from user input rather than the environment.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            ThemeError::InvalidColor { .. }
                | ThemeError::UnknownPreset { .. }
                | ThemeError::InvalidSetting { .. }
        )
    }
}

/// Result type alias for theme engine operations
pub type ThemeResult<T> = Result<T, ThemeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_includes_context() {
        let error = ThemeError::invalid_setting("mode", "sepia", "unknown mode");
        let message = error.to_string();
        assert!(message.contains("mode=sepia"));
        assert!(message.contains("unknown mode"));

        let error = ThemeError::storage("tucu-theme-storage", "disk full");
        assert!(error.to_string().contains("tucu-theme-storage"));
    }

    #[test]
    fn test_input_error_classification() {
        assert!(ThemeError::invalid_color("#zz", "bad hex").is_input_error());
        assert!(
            ThemeError::UnknownPreset {
                id: "nope".to_string()
            }
            .is_input_error()
        );
        assert!(!ThemeError::storage("k", "r").is_input_error());
    }
}
