use super::app::AppConfig;

/// Configuration validation errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid app_name: '{value}' ({reason})")]
    AppName { value: String, reason: String },
    #[error("Invalid storage key: '{value}' ({reason})")]
    StorageKey { value: String, reason: String },
    #[error("Invalid log level: '{value}'")]
    LogLevel { value: String },
    #[error("Invalid preset '{id}': {reason}")]
    Preset { id: String, reason: String },
    #[error("Unknown default {role} preset: '{id}'")]
    UnknownDefaultPreset { role: String, id: String },
}

impl ConfigValidationError {
    pub fn user_message(&self) -> String {
        match self {
            ConfigValidationError::AppName { value, reason } => {
                format!(
                    "Application name is not usable!\n\n\
                    Your configured value: '{value}'\n\
                    Problem: {reason}\n\n\
                    Please update app_name in config.toml to use only letters, digits, '-' or '_'."
                )
            }
            ConfigValidationError::StorageKey { value, reason } => {
                format!(
                    "Storage key is not usable!\n\n\
                    Your configured value: '{value}'\n\
                    Problem: {reason}\n\n\
                    Please update [storage] key in config.toml."
                )
            }
            ConfigValidationError::LogLevel { value } => {
                format!(
                    "Unknown log level!\n\n\
                    Your configured value: '{value}'\n\
                    Valid levels: trace, debug, info, warn, error\n\n\
                    Please update [logging] level in config.toml."
                )
            }
            ConfigValidationError::Preset { id, reason } => {
                format!(
                    "Custom preset could not be added!\n\n\
                    Preset: '{id}'\n\
                    Problem: {reason}\n\n\
                    Please fix the matching [[presets]] entry in config.toml."
                )
            }
            ConfigValidationError::UnknownDefaultPreset { role, id } => {
                format!(
                    "Default {role} preset does not exist!\n\n\
                    Your configured value: '{id}'\n\n\
                    Run `tucu-theme presets` to list the available presets and update \
                    [defaults] {role}_preset in config.toml."
                )
            }
        }
    }
}

/// Configuration loading result
pub enum ConfigLoadResult {
    Success(Box<AppConfig>),
    LoadError(String),
    DeserializeError(String),
}

impl ConfigLoadResult {
    /// Collapse into a plain `Result`, keeping the failure message.
    pub fn into_result(self) -> Result<AppConfig, String> {
        match self {
            ConfigLoadResult::Success(config) => Ok(*config),
            ConfigLoadResult::LoadError(msg) | ConfigLoadResult::DeserializeError(msg) => Err(msg),
        }
    }
}
