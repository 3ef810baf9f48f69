use claims::*;
use engine::persistence::{FileStorage, Storage};
use engine::state::{CustomRole, Direction, Mode};
use std::sync::Arc;
use tempfile::TempDir;
use tucu_theme::cli::{self, Command, ShowFormat};
use tucu_theme::config::AppConfig;
use tucu_theme::settings::ToggleTarget;
use tucu_theme::{AppError, SettingsPanel, ThemeSession};

// Helper modules for settings tests
mod helpers {
    use super::*;

    pub fn config(source: &str) -> AppConfig {
        toml::from_str(source).unwrap()
    }

    pub fn panel_in(dir: &TempDir, config: &AppConfig) -> SettingsPanel {
        let storage: Arc<dyn Storage> = Arc::new(FileStorage::new(dir.path()));
        SettingsPanel::new(ThemeSession::bootstrap(config, storage).unwrap())
    }

    pub fn run(panel: &SettingsPanel, command: Command) -> String {
        let mut out = Vec::new();
        cli::execute(&command, panel, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }
}

use helpers::*;

#[test]
fn test_settings_persist_across_sessions() {
    let dir = TempDir::new().unwrap();
    let config = config("");

    {
        let panel = panel_in(&dir, &config);
        assert_ok_eq!(panel.apply("mode", "dark"), true);
        assert_ok_eq!(panel.apply("primary", "emerald"), true);
        assert_ok_eq!(panel.apply("custom.dark", "#112233"), true);
        assert!(panel.toggle(ToggleTarget::Direction));
        panel.open();
    }

    let panel = panel_in(&dir, &config);
    let state = panel.state();
    assert_eq!(state.mode, Mode::Dark);
    assert_eq!(state.direction, Direction::Rtl);
    assert_eq!(state.primary_preset, "emerald");
    assert_some_eq!(state.custom_color(CustomRole::Dark), "#112233");
    assert!(!panel.is_open());

    let css = panel.render_css();
    assert!(css.contains("--color-brand: #10b981;"));
    assert!(css.contains("--color-dark: #112233;"));
    assert_eq!(panel.root_attributes(), "class=\"dark\" dir=\"rtl\"");
}

#[test]
fn test_unset_reverts_to_derived_color() {
    let dir = TempDir::new().unwrap();
    let panel = panel_in(&dir, &config(""));
    let derived = panel.summary().css["--color-muted"].clone();

    assert_ok!(panel.apply("custom.muted", "#abcdef"));
    assert_eq!(panel.summary().css["--color-muted"], "#abcdef");

    assert!(panel.unset(CustomRole::Muted));
    assert!(!panel.unset(CustomRole::Muted));
    assert_eq!(panel.summary().css["--color-muted"], derived);
}

#[test]
fn test_bad_input_is_reported_and_state_kept() {
    let dir = TempDir::new().unwrap();
    let panel = panel_in(&dir, &config(""));

    assert!(matches!(panel.apply("mode", "sepia"), Err(AppError::Theme(_))));
    assert!(matches!(panel.apply("font", "serif"), Err(AppError::Theme(_))));
    assert!(matches!(panel.apply("accent", "nope"), Err(AppError::Theme(_))));
    assert!(matches!(panel.apply("custom.light", "  "), Err(AppError::Theme(_))));

    assert_eq!(*panel.state(), *panel.session().store().defaults());
}

#[test]
fn test_reset_with_clear_removes_stored_slot() {
    let dir = TempDir::new().unwrap();
    let config = config("app_name = \"docs\"");
    let panel = panel_in(&dir, &config);

    assert_ok!(panel.apply("layout", "horizontal"));
    let slot = dir.path().join("docs-theme-storage.json");
    assert!(slot.exists());

    assert_ok!(panel.reset(true));
    assert!(!slot.exists());
    assert_eq!(panel.state().layout, engine::state::Layout::Clean);
}

#[test]
fn test_configured_extra_preset_is_usable() {
    let dir = TempDir::new().unwrap();
    let config = config(
        r##"
        [[presets]]
        id = "brand"
        label = "Brand"
        value = "#0f766e"
        "##,
    );
    let panel = panel_in(&dir, &config);

    assert_ok_eq!(panel.apply("primary-preset", "brand"), true);
    assert!(panel.render_css().contains("--color-brand: #0f766e;"));

    let listing = run(&panel, Command::Presets);
    let brand_line = listing
        .lines()
        .find(|line| line.starts_with("brand"))
        .unwrap();
    assert!(brand_line.contains("Brand"));
    assert!(brand_line.ends_with("(primary)"));
}

#[test]
fn test_commands_write_expected_output() {
    let dir = TempDir::new().unwrap();
    let panel = panel_in(&dir, &config(""));

    let out = run(
        &panel,
        Command::Set {
            key: "mode".to_string(),
            value: "dark".to_string(),
        },
    );
    assert_eq!(out, "Updated: mode = dark\n");

    let out = run(
        &panel,
        Command::Set {
            key: "mode".to_string(),
            value: "dark".to_string(),
        },
    );
    assert_eq!(out, "Unchanged: mode = dark\n");

    let out = run(
        &panel,
        Command::Toggle {
            target: ToggleTarget::Mode,
        },
    );
    assert_eq!(out, "Mode is now light\n");

    let out = run(&panel, Command::Css);
    assert!(out.starts_with("/* class=\"light\" dir=\"ltr\" */\n:root {\n"));

    let json = run(
        &panel,
        Command::Show {
            format: ShowFormat::Json,
        },
    );
    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed["mode"], "light");
    assert_eq!(parsed["presets"]["secondary"]["id"], "slate");

    let toml_out = run(
        &panel,
        Command::Show {
            format: ShowFormat::Toml,
        },
    );
    assert!(toml_out.contains("mode = \"light\""));
}

#[test]
fn test_failed_command_surfaces_app_error() {
    let dir = TempDir::new().unwrap();
    let panel = panel_in(&dir, &config(""));

    let mut out = Vec::new();
    let error = cli::execute(
        &Command::Set {
            key: "primary".to_string(),
            value: "ultraviolet".to_string(),
        },
        &panel,
        &mut out,
    )
    .unwrap_err();

    assert_some!(error.downcast_ref::<AppError>());
    assert!(out.is_empty());
}
