use config::{Config, Environment, File, FileFormat};
use log::LevelFilter;
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub mod app;
pub mod defaults;
pub mod validation;

pub use app::{AppConfig, DefaultsConfig, PresetConfig, StorageConfig};
pub use validation::{ConfigLoadResult, ConfigValidationError};

use defaults::{DEFAULT_CONFIG, DEFAULT_LOG_LEVEL, ENV_PREFIX, ENV_SEPARATOR, LOCAL_CONFIG_FILE};

/// Where to look for configuration and which values the command line pins
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Explicit file; must exist when set
    pub config_file: Option<PathBuf>,
    /// Look for `config.toml` in the working directory when no explicit file is set
    pub use_local_file: bool,
    pub storage_dir: Option<PathBuf>,
    pub log_level: Option<String>,
}

impl LoadOptions {
    pub fn new() -> Self {
        Self {
            use_local_file: true,
            ..Self::default()
        }
    }
}

/// Load configuration from the embedded defaults, an optional file, the
/// environment and finally command-line overrides, in that order.
pub fn load_config(options: &LoadOptions) -> ConfigLoadResult {
    dotenv::dotenv().ok();

    let mut builder =
        Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));

    if let Some(path) = options.config_file.as_deref() {
        builder = builder.add_source(File::from(path).format(FileFormat::Toml).required(true));
    } else if options.use_local_file {
        builder = builder.add_source(File::with_name(LOCAL_CONFIG_FILE).required(false));
    }

    // environment entries override file values when present
    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator(ENV_SEPARATOR)
            .separator(ENV_SEPARATOR),
    );

    if let Some(dir) = options.storage_dir.as_deref() {
        builder = match builder.set_override("storage.directory", path_value(dir)) {
            Ok(builder) => builder,
            Err(e) => return ConfigLoadResult::LoadError(format!("Invalid --storage-dir: {e}")),
        };
    }
    if let Some(level) = options.log_level.as_deref() {
        builder = match builder.set_override("logging.level", level) {
            Ok(builder) => builder,
            Err(e) => return ConfigLoadResult::LoadError(format!("Invalid --log-level: {e}")),
        };
    }

    let config = match builder.build() {
        Ok(config) => config,
        Err(e) => {
            return ConfigLoadResult::LoadError(format!(
                "Configuration loading failed: {e}. Please check your config.toml file and environment variables."
            ));
        }
    };

    match config.try_deserialize::<AppConfig>() {
        Ok(app_config) => ConfigLoadResult::Success(Box::new(app_config)),
        Err(e) => ConfigLoadResult::DeserializeError(format!("Failed to deserialize config: {e}")),
    }
}

fn path_value(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoggingConfig {
    level: Option<String>,
    file: Option<String>,
}

impl LoggingConfig {
    pub fn level(&self) -> &str {
        self.level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }

    pub fn file(&self) -> Option<&str> {
        self.file.as_deref()
    }

    /// `None` when the configured level is not one `log` knows.
    pub fn level_filter(&self) -> Option<LevelFilter> {
        match self.level().to_lowercase().as_str() {
            "trace" => Some(LevelFilter::Trace),
            "debug" => Some(LevelFilter::Debug),
            "info" => Some(LevelFilter::Info),
            "warn" | "warning" => Some(LevelFilter::Warn),
            "error" => Some(LevelFilter::Error),
            "off" => Some(LevelFilter::Off),
            _ => None,
        }
    }
}
