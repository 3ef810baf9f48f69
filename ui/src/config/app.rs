use super::{LoggingConfig, defaults::DEFAULT_APP_NAME, validation::ConfigValidationError};
use engine::ThemeError;
use engine::palette::{Palette, Preset};
use engine::persistence::PersistenceAdapter;
use engine::state::{Direction, Layout, Mode, PresetRole, ThemeState};
use engine::validation::{StorageKeyValidator, Validator};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    app_name: Option<String>,
    #[serde(default)]
    storage: StorageConfig,
    #[serde(default)]
    logging: LoggingConfig,
    #[serde(default)]
    defaults: DefaultsConfig,
    #[serde(default)]
    presets: Vec<PresetConfig>,
}

impl AppConfig {
    /// Validate the configuration against the palette and naming rules
    pub fn validate(&self) -> Result<(), Vec<ConfigValidationError>> {
        let mut errors = Vec::new();

        let app_name = self.app_name();
        if let Err(e) = StorageKeyValidator.validate(app_name) {
            errors.push(ConfigValidationError::AppName {
                value: app_name.to_string(),
                reason: reason_of(e),
            });
        }

        if let Some(key) = self.storage.key.as_deref() {
            if let Err(e) = StorageKeyValidator.validate(key) {
                errors.push(ConfigValidationError::StorageKey {
                    value: key.to_string(),
                    reason: reason_of(e),
                });
            }
        }

        if self.logging.level_filter().is_none() {
            errors.push(ConfigValidationError::LogLevel {
                value: self.logging.level().to_string(),
            });
        }

        for preset in &self.presets {
            if let Err(e) = Palette::extended([preset.to_preset()]) {
                errors.push(ConfigValidationError::Preset {
                    id: preset.id.clone(),
                    reason: reason_of(e),
                });
            }
        }

        // Default presets can only be checked against a palette that built
        match self.palette() {
            Ok(palette) => {
                for &role in PresetRole::ALL {
                    if let Some(id) = self.defaults.preset(role) {
                        if !palette.contains(id) {
                            errors.push(ConfigValidationError::UnknownDefaultPreset {
                                role: role.to_string(),
                                id: id.to_string(),
                            });
                        }
                    }
                }
            }
            // extras that clash with each other
            Err(e) if errors.is_empty() => errors.push(ConfigValidationError::Preset {
                id: String::from("[[presets]]"),
                reason: reason_of(e),
            }),
            Err(_) => {}
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    pub fn app_name(&self) -> &str {
        self.app_name.as_deref().unwrap_or(DEFAULT_APP_NAME)
    }

    pub fn storage(&self) -> &StorageConfig {
        &self.storage
    }

    pub fn logging(&self) -> &LoggingConfig {
        &self.logging
    }

    pub fn defaults(&self) -> &DefaultsConfig {
        &self.defaults
    }

    pub fn presets(&self) -> &[PresetConfig] {
        &self.presets
    }

    /// Name of the persisted slot
    pub fn storage_key(&self) -> String {
        self.storage
            .key
            .clone()
            .unwrap_or_else(|| PersistenceAdapter::storage_key(self.app_name()))
    }

    /// Built-in palette plus the configured extra presets
    pub fn palette(&self) -> Result<Palette, ThemeError> {
        if self.presets.is_empty() {
            return Ok(Palette::builtin());
        }
        Palette::extended(self.presets.iter().map(PresetConfig::to_preset))
    }
}

fn reason_of(error: ThemeError) -> String {
    match error {
        ThemeError::InvalidSetting { reason, .. } | ThemeError::InvalidColor { reason, .. } => {
            reason
        }
        ThemeError::Storage { reason, .. } => reason,
        other => other.to_string(),
    }
}

/// Where the persisted theme lives
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StorageConfig {
    directory: Option<PathBuf>,
    key: Option<String>,
}

impl StorageConfig {
    pub fn directory(&self) -> Option<&Path> {
        self.directory.as_deref()
    }

    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }
}

/// First-run theme values
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DefaultsConfig {
    mode: Option<Mode>,
    direction: Option<Direction>,
    layout: Option<Layout>,
    primary_preset: Option<String>,
    secondary_preset: Option<String>,
    accent_preset: Option<String>,
}

impl DefaultsConfig {
    pub fn mode(&self) -> Mode {
        self.mode.unwrap_or_default()
    }

    pub fn direction(&self) -> Direction {
        self.direction.unwrap_or_default()
    }

    pub fn layout(&self) -> Layout {
        self.layout.unwrap_or_default()
    }

    pub fn preset(&self, role: PresetRole) -> Option<&str> {
        match role {
            PresetRole::Primary => self.primary_preset.as_deref(),
            PresetRole::Secondary => self.secondary_preset.as_deref(),
            PresetRole::Accent => self.accent_preset.as_deref(),
        }
    }

    /// State the store starts from and resets to.
    pub fn to_state(&self) -> ThemeState {
        let base = ThemeState::default();
        let preset = |role: PresetRole| {
            self.preset(role)
                .map(str::to_string)
                .unwrap_or_else(|| base.preset(role).to_string())
        };

        ThemeState {
            mode: self.mode(),
            direction: self.direction(),
            layout: self.layout(),
            primary_preset: preset(PresetRole::Primary),
            secondary_preset: preset(PresetRole::Secondary),
            accent_preset: preset(PresetRole::Accent),
            ..ThemeState::default()
        }
    }
}

/// Extra palette entry from `[[presets]]`
#[derive(Debug, Clone, Deserialize)]
pub struct PresetConfig {
    id: String,
    label: Option<String>,
    value: String,
}

impl PresetConfig {
    pub fn id(&self) -> &str {
        &self.id
    }

    fn to_preset(&self) -> Preset {
        let label = self.label.clone().unwrap_or_else(|| self.id.clone());
        Preset::new(self.id.clone(), label, self.value.clone())
    }
}
