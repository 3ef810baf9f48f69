use clap::Parser;
use tucu_theme::cli::{self, Cli};
use tucu_theme::config::{self, ConfigLoadResult};
use tucu_theme::{SettingsPanel, ThemeSession, logger};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let app_config = match config::load_config(&cli.load_options()) {
        ConfigLoadResult::Success(config) => *config,
        ConfigLoadResult::LoadError(e) | ConfigLoadResult::DeserializeError(e) => {
            eprintln!("{e}");
            anyhow::bail!("configuration could not be loaded");
        }
    };

    if let Err(errors) = app_config.validate() {
        for error in &errors {
            eprintln!("{}\n", error.user_message());
        }
        anyhow::bail!("configuration has {} problem(s)", errors.len());
    }

    logger::setup_logger(app_config.logging())?;
    log::info!("Starting tucu-theme for '{}'", app_config.app_name());

    let session = match ThemeSession::open(&app_config) {
        Ok(session) => session,
        Err(e) => {
            log::error!("Failed to open theme session: {e}");
            eprintln!("{}", e.user_message());
            return Err(e.into());
        }
    };
    let panel = SettingsPanel::new(session);

    let mut stdout = std::io::stdout().lock();
    if let Err(e) = cli::execute(&cli.command, &panel, &mut stdout) {
        log::error!("Command failed: {e}");
        if let Some(app_error) = e.downcast_ref::<tucu_theme::AppError>() {
            eprintln!("{}", app_error.user_message());
        }
        return Err(e);
    }

    Ok(())
}
