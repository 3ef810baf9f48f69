use crate::palette::{DEFAULT_PRESET_ID, Palette};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Implements lower-case `Display`/`FromStr` for the closed setting enums.
macro_rules! setting_enum {
    ($name:ident, $label:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_lowercase().as_str() {
                    $($text => Ok($name::$variant),)+
                    other => Err(format!("unknown {} '{}'", $label, other)),
                }
            }
        }
    };
}

/// Color mode; drives the root class and the background/foreground mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Light,
    Dark,
}

setting_enum!(Mode, "mode", { Light => "light", Dark => "dark" });

impl Mode {
    pub fn toggled(self) -> Self {
        match self {
            Mode::Light => Mode::Dark,
            Mode::Dark => Mode::Light,
        }
    }

    /// Class placed on the root element while this mode is active.
    pub fn class_name(self) -> &'static str {
        self.as_str()
    }
}

/// Text direction written to the root `dir` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Ltr,
    Rtl,
}

setting_enum!(Direction, "direction", { Ltr => "ltr", Rtl => "rtl" });

impl Direction {
    pub fn toggled(self) -> Self {
        match self {
            Direction::Ltr => Direction::Rtl,
            Direction::Rtl => Direction::Ltr,
        }
    }
}

/// Page layout variant. Only rendering components read it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    #[default]
    Clean,
    Admin,
    Horizontal,
}

setting_enum!(Layout, "layout", {
    Clean => "clean",
    Admin => "admin",
    Horizontal => "horizontal",
});

/// Color roles whose value comes from a palette preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PresetRole {
    Primary,
    Secondary,
    Accent,
}

setting_enum!(PresetRole, "preset role", {
    Primary => "primary",
    Secondary => "secondary",
    Accent => "accent",
});

impl PresetRole {
    /// Preset used for the role when nothing else was chosen.
    pub fn default_preset_id(self) -> &'static str {
        match self {
            PresetRole::Primary => DEFAULT_PRESET_ID,
            PresetRole::Secondary => "slate",
            PresetRole::Accent => "violet",
        }
    }

    /// Field name in the persisted JSON object.
    pub fn persisted_key(self) -> &'static str {
        match self {
            PresetRole::Primary => "primaryPreset",
            PresetRole::Secondary => "secondaryPreset",
            PresetRole::Accent => "accentPreset",
        }
    }
}

/// Color roles that accept a literal override color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CustomRole {
    Dark,
    Light,
    Muted,
}

setting_enum!(CustomRole, "color role", {
    Dark => "dark",
    Light => "light",
    Muted => "muted",
});

/// Complete theme configuration held by the store.
///
/// Consumers only ever see immutable snapshots; all changes go through
/// [`ThemeStore`](crate::store::ThemeStore) mutations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeState {
    pub mode: Mode,
    pub direction: Direction,
    pub layout: Layout,
    pub primary_preset: String,
    pub secondary_preset: String,
    pub accent_preset: String,
    pub custom_palette_color: BTreeMap<CustomRole, String>,
    pub is_settings_open: bool,
}

impl Default for ThemeState {
    fn default() -> Self {
        Self {
            mode: Mode::default(),
            direction: Direction::default(),
            layout: Layout::default(),
            primary_preset: PresetRole::Primary.default_preset_id().to_string(),
            secondary_preset: PresetRole::Secondary.default_preset_id().to_string(),
            accent_preset: PresetRole::Accent.default_preset_id().to_string(),
            custom_palette_color: BTreeMap::new(),
            is_settings_open: false,
        }
    }
}

impl ThemeState {
    pub fn preset(&self, role: PresetRole) -> &str {
        match role {
            PresetRole::Primary => &self.primary_preset,
            PresetRole::Secondary => &self.secondary_preset,
            PresetRole::Accent => &self.accent_preset,
        }
    }

    pub(crate) fn preset_mut(&mut self, role: PresetRole) -> &mut String {
        match role {
            PresetRole::Primary => &mut self.primary_preset,
            PresetRole::Secondary => &mut self.secondary_preset,
            PresetRole::Accent => &mut self.accent_preset,
        }
    }

    pub fn custom_color(&self, role: CustomRole) -> Option<&str> {
        self.custom_palette_color.get(&role).map(String::as_str)
    }

    /// Replace every preset reference the palette cannot resolve with the
    /// role's default id. Returns the roles that were repaired.
    pub fn repair_presets(&mut self, palette: &Palette) -> Vec<PresetRole> {
        let mut repaired = Vec::new();
        for &role in PresetRole::ALL {
            if !palette.contains(self.preset(role)) {
                let fallback = if palette.contains(role.default_preset_id()) {
                    role.default_preset_id()
                } else {
                    DEFAULT_PRESET_ID
                };
                *self.preset_mut(role) = fallback.to_string();
                repaired.push(role);
            }
        }
        repaired
    }

    /// Rebuild a full state from its persisted subset. The settings panel
    /// always starts closed.
    pub fn from_persisted(persisted: PersistedTheme) -> Self {
        Self {
            mode: persisted.mode,
            direction: persisted.direction,
            layout: persisted.layout,
            primary_preset: persisted.primary_preset,
            secondary_preset: persisted.secondary_preset,
            accent_preset: persisted.accent_preset,
            custom_palette_color: persisted.custom_palette_color,
            is_settings_open: false,
        }
    }
}

/// The slice of [`ThemeState`] that survives a reload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedTheme {
    pub mode: Mode,
    pub direction: Direction,
    pub layout: Layout,
    pub primary_preset: String,
    pub secondary_preset: String,
    pub accent_preset: String,
    #[serde(default)]
    pub custom_palette_color: BTreeMap<CustomRole, String>,
}

impl From<&ThemeState> for PersistedTheme {
    fn from(state: &ThemeState) -> Self {
        Self {
            mode: state.mode,
            direction: state.direction,
            layout: state.layout,
            primary_preset: state.primary_preset.clone(),
            secondary_preset: state.secondary_preset.clone(),
            accent_preset: state.accent_preset.clone(),
            custom_palette_color: state.custom_palette_color.clone(),
        }
    }
}
