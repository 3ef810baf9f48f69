use engine::palette::{DEFAULT_PRESET_ID, Palette};
use engine::persistence::{MemoryStorage, PersistenceAdapter};
use engine::state::{CustomRole, Direction, Layout, Mode, PresetRole, ThemeState};
use engine::store::ThemeStore;
use proptest::prelude::*;
use std::collections::BTreeMap;
use std::sync::Arc;

fn preset_id() -> impl Strategy<Value = String> {
    let ids: Vec<String> = Palette::builtin()
        .presets()
        .iter()
        .map(|preset| preset.id.clone())
        .collect();
    prop::sample::select(ids)
}

fn custom_colors() -> impl Strategy<Value = BTreeMap<CustomRole, String>> {
    prop::collection::btree_map(
        prop::sample::select(CustomRole::ALL.to_vec()),
        "#[0-9a-f]{6}",
        0..=3,
    )
}

prop_compose! {
    fn theme_state()(
        mode in prop::sample::select(Mode::ALL.to_vec()),
        direction in prop::sample::select(Direction::ALL.to_vec()),
        layout in prop::sample::select(Layout::ALL.to_vec()),
        primary in preset_id(),
        secondary in preset_id(),
        accent in preset_id(),
        custom in custom_colors(),
        open in any::<bool>(),
    ) -> ThemeState {
        ThemeState {
            mode,
            direction,
            layout,
            primary_preset: primary,
            secondary_preset: secondary,
            accent_preset: accent,
            custom_palette_color: custom,
            is_settings_open: open,
        }
    }
}

#[cfg(test)]
mod palette_property_tests {
    use super::*;

    proptest! {
        #[test]
        fn test_resolve_is_pure(id in preset_id()) {
            let palette = Palette::builtin();
            let first = palette.resolve(&id).clone();
            let second = palette.resolve(&id).clone();

            // Property: same id, same entry
            prop_assert_eq!(&first, &second);
            prop_assert_eq!(first.id, id);
        }

        #[test]
        fn test_resolve_unknown_falls_back(id in "[A-Za-z0-9 _./-]{0,24}") {
            let palette = Palette::builtin();
            prop_assume!(!palette.contains(&id));

            // Property: unknown ids resolve to the documented default
            prop_assert_eq!(&palette.resolve(&id).id, DEFAULT_PRESET_ID);
        }
    }
}

#[cfg(test)]
mod persistence_property_tests {
    use super::*;

    proptest! {
        #[test]
        fn test_persist_rehydrate_round_trip(original in theme_state()) {
            let storage = Arc::new(MemoryStorage::new());
            let adapter = PersistenceAdapter::new(storage, "prop-theme-storage", Palette::builtin())
                .expect("valid key");

            adapter.persist(&original).expect("memory storage never fails");
            let restored = ThemeStore::new(adapter.rehydrate()).snapshot();

            // Property: every persisted field survives
            prop_assert_eq!(restored.mode, original.mode);
            prop_assert_eq!(restored.direction, original.direction);
            prop_assert_eq!(restored.layout, original.layout);
            for &role in PresetRole::ALL {
                prop_assert_eq!(restored.preset(role), original.preset(role));
            }
            prop_assert_eq!(&restored.custom_palette_color, &original.custom_palette_color);

            // Property: the settings panel always starts closed
            prop_assert!(!restored.is_settings_open);
        }

        #[test]
        fn test_rehydrate_never_panics_on_arbitrary_payloads(raw in ".{0,200}") {
            let storage = Arc::new(MemoryStorage::with_entry("prop-theme-storage", raw));
            let adapter = PersistenceAdapter::new(storage, "prop-theme-storage", Palette::builtin())
                .expect("valid key");

            let state = adapter.rehydrate();
            let palette = Palette::builtin();
            for &role in PresetRole::ALL {
                prop_assert!(palette.contains(state.preset(role)));
            }
        }
    }
}
