/// Default base configuration file embedded in the binary
pub const DEFAULT_CONFIG: &str = include_str!("../../config.default.toml");

/// Application name used when the configuration does not set one
pub const DEFAULT_APP_NAME: &str = "tucu";

/// Log level used when the configuration does not set one
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Log file used when the configuration does not set one
pub const DEFAULT_LOG_FILE: &str = "tucu-theme.log";

/// Project-local configuration file picked up when present
pub const LOCAL_CONFIG_FILE: &str = "config.toml";

/// Prefix for environment overrides (`TUCU__LOGGING__LEVEL=debug`)
pub const ENV_PREFIX: &str = "TUCU";

/// Separator for nested keys in environment overrides
pub const ENV_SEPARATOR: &str = "__";
