pub mod cli;
pub mod controller;
pub mod core;
pub mod providers;
pub mod store;

use crate::cli::terminal::{TerminalPrompter, TerminalView};
use crate::controller::Controller;
use crate::core::config::AppConfig;
use crate::providers::SourceFactory;
use crate::store::{ConfigStore, Prompter};
use anyhow::Result;
use tracing::{debug, info};

pub enum AppCommand {
    Sources,
    Currencies {
        source: Option<String>,
    },
    Convert {
        source: Option<String>,
        from: Option<String>,
        to: Vec<String>,
        amount: f64,
    },
    Configure {
        source: String,
        option: String,
    },
}

fn load_config(config_path: Option<&str>) -> Result<AppConfig> {
    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");
    Ok(config)
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    run_command_with_prompter(command, config_path, TerminalPrompter::new()).await
}

/// Runs `command`, asking for missing source options through `prompter`.
pub async fn run_command_with_prompter<P: Prompter>(
    command: AppCommand,
    config_path: Option<&str>,
    prompter: P,
) -> Result<()> {
    info!("Currency converter starting...");

    if let AppCommand::Sources = command {
        println!("{}", cli::sources::display_sources());
        return Ok(());
    }

    let config = load_config(config_path)?;
    let dirs = config.dirs()?;
    let factory = SourceFactory::new(dirs.clone(), &config.providers.exchangerates);
    let store = ConfigStore::new(dirs, prompter);

    match command {
        AppCommand::Sources => Ok(()),
        AppCommand::Currencies { source } => {
            let mut controller = Controller::new(factory, store, TerminalView::new(true));
            cli::session::currencies(&mut controller, source.as_deref()).await
        }
        AppCommand::Convert {
            source,
            from,
            to,
            amount,
        } => {
            let mut controller = Controller::new(factory, store, TerminalView::new(false));
            cli::session::convert(
                &mut controller,
                source.as_deref(),
                from.as_deref(),
                &to,
                amount,
            )
            .await
        }
        AppCommand::Configure { source, option } => {
            let mut controller = Controller::new(factory, store, TerminalView::new(true));
            cli::session::configure(&mut controller, &source, &option).await
        }
    }
}
