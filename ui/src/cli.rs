use crate::config::LoadOptions;
use crate::settings::{SettingsPanel, ToggleTarget};
use clap::{Parser, Subcommand, ValueEnum};
use engine::state::CustomRole;
use std::io::Write;
use std::path::PathBuf;

/// Inspect and change the persisted tucu-ui theme.
#[derive(Debug, Parser)]
#[command(name = "tucu-theme", about = "Inspect and change the persisted tucu-ui theme", version)]
pub struct Cli {
    /// Configuration file to use instead of ./config.toml
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Directory holding the persisted theme
    #[arg(long, global = true, value_name = "DIR")]
    pub storage_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, value_name = "LEVEL")]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            config_file: self.config.clone(),
            storage_dir: self.storage_dir.clone(),
            log_level: self.log_level.clone(),
            ..LoadOptions::new()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ShowFormat {
    #[default]
    Toml,
    Json,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the current theme
    Show {
        #[arg(long, value_enum, default_value_t = ShowFormat::Toml)]
        format: ShowFormat,
    },
    /// Change one setting, e.g. `set mode dark`, `set primary emerald` or
    /// `set custom.dark '#112233'`
    Set { key: String, value: String },
    /// Remove a custom color override (dark, light or muted)
    Unset { role: CustomRole },
    /// Flip the color mode, the text direction or the settings panel
    Toggle {
        #[arg(value_enum)]
        target: ToggleTarget,
    },
    /// List the available presets
    Presets,
    /// Print the root element as CSS
    Css,
    /// Restore the configured defaults
    Reset {
        /// Also remove the stored theme
        #[arg(long)]
        clear: bool,
    },
}

/// Run one command against the panel, writing its output to `out`.
pub fn execute(command: &Command, panel: &SettingsPanel, out: &mut impl Write) -> anyhow::Result<()> {
    match command {
        Command::Show { format } => {
            let summary = panel.summary();
            let rendered = match format {
                ShowFormat::Toml => toml::to_string_pretty(&summary)?,
                ShowFormat::Json => serde_json::to_string_pretty(&summary)?,
            };
            writeln!(out, "{}", rendered.trim_end())?;
        }
        Command::Set { key, value } => {
            let changed = panel.apply(key, value)?;
            report(out, changed, &format!("{key} = {value}"))?;
        }
        Command::Unset { role } => {
            let changed = panel.unset(*role);
            report(out, changed, &format!("custom.{role} removed"))?;
        }
        Command::Toggle { target } => {
            panel.toggle(*target);
            let state = panel.state();
            let now = match target {
                ToggleTarget::Mode => state.mode.to_string(),
                ToggleTarget::Direction => state.direction.to_string(),
                ToggleTarget::Settings if state.is_settings_open => "open".to_string(),
                ToggleTarget::Settings => "closed".to_string(),
            };
            writeln!(out, "{target:?} is now {now}")?;
        }
        Command::Presets => {
            for listing in panel.presets() {
                let roles = listing
                    .roles
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", ");
                let suffix = if roles.is_empty() {
                    String::new()
                } else {
                    format!("  ({roles})")
                };
                writeln!(
                    out,
                    "{:<10} {:<14} {}{suffix}",
                    listing.preset.id, listing.preset.label, listing.preset.value
                )?;
            }
        }
        Command::Css => {
            writeln!(out, "/* {} */", panel.root_attributes())?;
            writeln!(out, "{}", panel.render_css())?;
        }
        Command::Reset { clear } => {
            panel.reset(*clear)?;
            if *clear {
                writeln!(out, "Theme reset and stored slot removed")?;
            } else {
                writeln!(out, "Theme reset to defaults")?;
            }
        }
    }
    Ok(())
}

fn report(out: &mut impl Write, changed: bool, what: &str) -> std::io::Result<()> {
    if changed {
        writeln!(out, "Updated: {what}")
    } else {
        writeln!(out, "Unchanged: {what}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_set_with_global_flags() {
        let cli = Cli::try_parse_from([
            "tucu-theme",
            "set",
            "custom.dark",
            "#112233",
            "--storage-dir",
            "/tmp/themes",
        ])
        .unwrap();

        assert_eq!(cli.storage_dir, Some(PathBuf::from("/tmp/themes")));
        match cli.command {
            Command::Set { key, value } => {
                assert_eq!(key, "custom.dark");
                assert_eq!(value, "#112233");
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_parses_unset_role_and_toggle_target() {
        let cli = Cli::try_parse_from(["tucu-theme", "unset", "Muted"]).unwrap();
        assert!(matches!(cli.command, Command::Unset { role: CustomRole::Muted }));

        let cli = Cli::try_parse_from(["tucu-theme", "toggle", "direction"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Toggle { target: ToggleTarget::Direction }
        ));

        assert!(Cli::try_parse_from(["tucu-theme", "unset", "brand"]).is_err());
    }

    #[test]
    fn test_show_defaults_to_toml() {
        let cli = Cli::try_parse_from(["tucu-theme", "show"]).unwrap();
        assert!(matches!(cli.command, Command::Show { format: ShowFormat::Toml }));
        let options = cli.load_options();
        assert!(options.use_local_file);
        assert!(options.config_file.is_none());
    }
}
