//! The settings panel: the user-facing operations on a live theme.

use crate::error::AppResult;
use crate::session::ThemeSession;
use engine::ThemeError;
use engine::palette::Preset;
use engine::reifier::CssProperty;
use engine::state::{CustomRole, Direction, Layout, Mode, PresetRole, ThemeState};
use engine::store::Mutation;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Something `toggle` can flip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ToggleTarget {
    Mode,
    Direction,
    Settings,
}

/// Flat view of the current theme for `show`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThemeSummary {
    pub mode: Mode,
    pub direction: Direction,
    pub layout: Layout,
    pub presets: BTreeMap<String, PresetSummary>,
    pub custom_palette_color: BTreeMap<CustomRole, String>,
    pub css: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PresetSummary {
    pub id: String,
    pub value: String,
}

/// A palette entry together with the roles currently using it.
#[derive(Debug, Clone, PartialEq)]
pub struct PresetListing {
    pub preset: Preset,
    pub roles: Vec<PresetRole>,
}

pub struct SettingsPanel {
    session: ThemeSession,
}

impl SettingsPanel {
    pub fn new(session: ThemeSession) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &ThemeSession {
        &self.session
    }

    pub fn state(&self) -> Arc<ThemeState> {
        self.session.store().snapshot()
    }

    /// Apply one `key=value` setting. Returns whether the theme changed.
    ///
    /// Unlike the store, which silently keeps its state on bad input, the
    /// panel reports unknown keys, values and presets back to the user.
    pub fn apply(&self, key: &str, value: &str) -> AppResult<bool> {
        let mutation = Mutation::parse(key, value)?;
        match &mutation {
            Mutation::SetPreset(_, id) if !self.session.store().palette().contains(id) => {
                return Err(ThemeError::UnknownPreset { id: id.clone() }.into());
            }
            Mutation::SetCustomColor(role, Some(color)) if color.trim().is_empty() => {
                return Err(ThemeError::invalid_color(
                    color.clone(),
                    format!("empty override for '{role}'"),
                )
                .into());
            }
            _ => {}
        }
        Ok(self.dispatch(mutation))
    }

    /// Drop a custom override, reverting the role to its derived color.
    pub fn unset(&self, role: CustomRole) -> bool {
        self.dispatch(Mutation::SetCustomColor(role, None))
    }

    pub fn toggle(&self, target: ToggleTarget) -> bool {
        self.dispatch(match target {
            ToggleTarget::Mode => Mutation::ToggleMode,
            ToggleTarget::Direction => Mutation::ToggleDirection,
            ToggleTarget::Settings => Mutation::ToggleSettings,
        })
    }

    pub fn open(&self) {
        self.session.store().set_is_settings_open(true);
    }

    pub fn close(&self) {
        self.session.store().set_is_settings_open(false);
    }

    pub fn is_open(&self) -> bool {
        self.state().is_settings_open
    }

    /// Restore the configured defaults. With `clear`, the stored slot is
    /// removed as well so the next start is a first run.
    pub fn reset(&self, clear: bool) -> AppResult<()> {
        self.session.store().reset();
        if clear {
            self.session.adapter().clear()?;
        }
        Ok(())
    }

    /// Root element rendered as a CSS rule.
    pub fn render_css(&self) -> String {
        self.session.root().with_document(|doc| doc.to_css())
    }

    /// Root element `class` and `dir` attributes.
    pub fn root_attributes(&self) -> String {
        self.session
            .root()
            .with_document(|doc| doc.root_attributes())
    }

    pub fn summary(&self) -> ThemeSummary {
        let state = self.state();
        let palette = self.session.store().palette();

        let presets = PresetRole::ALL
            .iter()
            .map(|&role| {
                let preset = palette.resolve(state.preset(role));
                (
                    role.to_string(),
                    PresetSummary {
                        id: preset.id.clone(),
                        value: preset.value.clone(),
                    },
                )
            })
            .collect();

        let css = self.session.root().with_document(|doc| {
            CssProperty::ALL
                .iter()
                .filter_map(|&property| {
                    doc.property(property)
                        .map(|value| (property.name().to_string(), value.to_string()))
                })
                .collect()
        });

        ThemeSummary {
            mode: state.mode,
            direction: state.direction,
            layout: state.layout,
            presets,
            custom_palette_color: state.custom_palette_color.clone(),
            css,
        }
    }

    /// Every palette entry in palette order.
    pub fn presets(&self) -> Vec<PresetListing> {
        let state = self.state();
        self.session
            .store()
            .palette()
            .presets()
            .iter()
            .map(|preset| PresetListing {
                preset: preset.clone(),
                roles: PresetRole::ALL
                    .iter()
                    .copied()
                    .filter(|&role| state.preset(role) == preset.id)
                    .collect(),
            })
            .collect()
    }

    fn dispatch(&self, mutation: Mutation) -> bool {
        let store = self.session.store();
        let before = store.snapshot();
        log::debug!("Settings panel dispatching {mutation:?}");
        store.dispatch(mutation);
        !Arc::ptr_eq(&before, &store.snapshot())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use engine::persistence::MemoryStorage;

    fn panel() -> SettingsPanel {
        let config = crate::config::AppConfig::default();
        let session =
            ThemeSession::bootstrap(&config, Arc::new(MemoryStorage::new())).unwrap();
        SettingsPanel::new(session)
    }

    #[test]
    fn test_apply_reports_change() {
        let panel = panel();
        assert!(panel.apply("mode", "dark").unwrap());
        assert!(!panel.apply("mode", "dark").unwrap());
    }

    #[test]
    fn test_apply_rejects_unknown_preset() {
        let panel = panel();
        let error = panel.apply("primary", "ultraviolet").unwrap_err();
        assert_eq!(
            error,
            AppError::Theme("Unknown preset 'ultraviolet'".to_string())
        );
        assert_eq!(panel.state().primary_preset, "default");
    }

    #[test]
    fn test_reset_restores_defaults() {
        let panel = panel();
        panel.apply("mode", "dark").unwrap();
        panel.apply("primary", "emerald").unwrap();
        panel.apply("custom.muted", "#777777").unwrap();

        panel.reset(false).unwrap();
        assert_eq!(*panel.state(), *panel.session().store().defaults());
        assert!(panel.render_css().contains("--color-brand: #2563eb;"));
    }

    #[test]
    fn test_toggle_settings_opens_and_closes() {
        let panel = panel();
        assert!(!panel.is_open());
        assert!(panel.toggle(ToggleTarget::Settings));
        assert!(panel.is_open());
        panel.close();
        assert!(!panel.is_open());
        panel.open();
        assert!(panel.is_open());
    }

    #[test]
    fn test_presets_mark_roles_in_use() {
        let panel = panel();
        let listings = panel.presets();
        let slate = listings
            .iter()
            .find(|listing| listing.preset.id == "slate")
            .unwrap();
        assert_eq!(slate.roles, vec![PresetRole::Secondary]);

        let default = &listings[0];
        assert_eq!(default.preset.id, "default");
        assert_eq!(default.roles, vec![PresetRole::Primary]);
    }
}
