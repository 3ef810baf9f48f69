//! # Preset Palette
//!
//! Read-only table of named brand colors. Every color role that draws from a
//! preset (primary, secondary, accent) stores only the preset identifier; the
//! palette turns that identifier into a display label and a CSS color value.
//!
//! Resolution is total: an identifier the palette does not know resolves to
//! the default entry, so rendering never fails on stale or corrupted ids.
//! Membership checks ([`Palette::contains`]) are what the store uses to reject
//! invalid ids at mutation time.

use crate::color::ColorValidator;
use crate::error::{ThemeError, ThemeResult};
use crate::validation::{PresetIdValidator, Validator};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// Identifier of the palette entry used whenever an id cannot be resolved.
pub const DEFAULT_PRESET_ID: &str = "default";

/// (id, label, value)
const BUILTIN_PRESETS: &[(&str, &str, &str)] = &[
    (DEFAULT_PRESET_ID, "Default", "#2563eb"),
    ("blue", "Blue", "#3b82f6"),
    ("sky", "Sky", "#0ea5e9"),
    ("cyan", "Cyan", "#06b6d4"),
    ("teal", "Teal", "#14b8a6"),
    ("emerald", "Emerald", "#10b981"),
    ("green", "Green", "#22c55e"),
    ("lime", "Lime", "#84cc16"),
    ("yellow", "Yellow", "#eab308"),
    ("amber", "Amber", "#f59e0b"),
    ("orange", "Orange", "#f97316"),
    ("red", "Red", "#ef4444"),
    ("rose", "Rose", "#f43f5e"),
    ("pink", "Pink", "#ec4899"),
    ("fuchsia", "Fuchsia", "#d946ef"),
    ("purple", "Purple", "#a855f7"),
    ("violet", "Violet", "#8b5cf6"),
    ("indigo", "Indigo", "#6366f1"),
    ("slate", "Slate", "215 16% 47%"),
    ("gray", "Gray", "220 9% 46%"),
    ("zinc", "Zinc", "240 4% 46%"),
    ("stone", "Stone", "25 5% 45%"),
];

static BUILTIN: Lazy<Palette> = Lazy::new(|| {
    let presets = BUILTIN_PRESETS
        .iter()
        .map(|(id, label, value)| Preset::new(*id, *label, *value))
        .collect();
    Palette::from_presets(presets)
});

/// A named color selectable by identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preset {
    pub id: String,
    pub label: String,
    pub value: String,
}

impl Preset {
    pub fn new(id: impl Into<String>, label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            value: value.into(),
        }
    }
}

struct PaletteInner {
    presets: Vec<Preset>,
    index: HashMap<String, usize>,
    default_index: usize,
}

/// Immutable preset table. Cloning is cheap; clones share the same table.
#[derive(Clone)]
pub struct Palette {
    inner: Arc<PaletteInner>,
}

impl std::fmt::Debug for Palette {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Palette")
            .field("presets", &self.inner.presets.len())
            .field("default", &self.default_preset().id)
            .finish()
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Palette {
    /// The palette shipped with the library.
    pub fn builtin() -> Self {
        BUILTIN.clone()
    }

    fn from_presets(presets: Vec<Preset>) -> Self {
        let index: HashMap<String, usize> = presets
            .iter()
            .enumerate()
            .map(|(position, preset)| (preset.id.clone(), position))
            .collect();
        let default_index = index.get(DEFAULT_PRESET_ID).copied().unwrap_or(0);

        Self {
            inner: Arc::new(PaletteInner {
                presets,
                index,
                default_index,
            }),
        }
    }

    /// Build a palette from the builtin table plus additional presets.
    ///
    /// Extra presets must have a well-formed id, a parsable color value and
    /// must not shadow an existing entry.
    pub fn extended(extra: impl IntoIterator<Item = Preset>) -> ThemeResult<Self> {
        let mut presets = BUILTIN.inner.presets.clone();

        for preset in extra {
            PresetIdValidator.validate(&preset.id)?;
            ColorValidator.validate(&preset.value)?;

            if presets.iter().any(|existing| existing.id == preset.id) {
                return Err(ThemeError::invalid_setting(
                    "preset",
                    preset.id,
                    "A preset with this id already exists",
                ));
            }

            log::debug!("Registering custom preset '{}'", preset.id);
            presets.push(preset);
        }

        Ok(Self::from_presets(presets))
    }

    pub fn get(&self, id: &str) -> Option<&Preset> {
        self.inner
            .index
            .get(id)
            .map(|&position| &self.inner.presets[position])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.inner.index.contains_key(id)
    }

    /// Resolve an identifier, falling back to the default entry when unknown.
    pub fn resolve(&self, id: &str) -> &Preset {
        match self.get(id) {
            Some(preset) => preset,
            None => {
                log::debug!("Unknown preset '{id}', resolving to '{DEFAULT_PRESET_ID}'");
                self.default_preset()
            }
        }
    }

    pub fn default_preset(&self) -> &Preset {
        &self.inner.presets[self.inner.default_index]
    }

    /// Entries in table order.
    pub fn presets(&self) -> &[Preset] {
        &self.inner.presets
    }

    pub fn len(&self) -> usize {
        self.inner.presets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.presets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;

    #[test]
    fn test_builtin_values_are_valid_colors() {
        let palette = Palette::builtin();
        for preset in palette.presets() {
            assert!(
                Color::parse(&preset.value).is_ok(),
                "preset '{}' has malformed value '{}'",
                preset.id,
                preset.value
            );
            assert!(PresetIdValidator.validate(&preset.id).is_ok());
        }
    }

    #[test]
    fn test_builtin_ids_are_unique() {
        let palette = Palette::builtin();
        assert_eq!(palette.inner.index.len(), palette.len());
    }

    #[test]
    fn test_resolve_known_and_unknown() {
        let palette = Palette::builtin();
        assert_eq!(palette.resolve("emerald").value, "#10b981");
        assert_eq!(palette.resolve("emerald").label, "Emerald");

        let fallback = palette.resolve("no-such-preset");
        assert_eq!(fallback.id, DEFAULT_PRESET_ID);
        assert_eq!(palette.resolve("").id, DEFAULT_PRESET_ID);
        assert_eq!(palette.resolve("Emerald").id, DEFAULT_PRESET_ID);
    }

    #[test]
    fn test_extended_palette() {
        let palette = Palette::extended([Preset::new("brand", "Brand", "#ff5500")]).unwrap();
        assert!(palette.contains("brand"));
        assert!(palette.contains("emerald"));
        assert_eq!(palette.len(), Palette::builtin().len() + 1);
        // builtin palette is untouched
        assert!(!Palette::builtin().contains("brand"));
    }

    #[test]
    fn test_extended_palette_rejects_bad_presets() {
        assert!(Palette::extended([Preset::new("emerald", "Dup", "#000000")]).is_err());
        assert!(Palette::extended([Preset::new("brand", "Brand", "#zzzzzz")]).is_err());
        assert!(Palette::extended([Preset::new("Bad Id", "Brand", "#ff5500")]).is_err());
    }
}
