use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use currency_converter::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional settings file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create default settings file
    Setup,
    /// List exchange-rate sources and their options
    Sources,
    /// List the currencies a source can convert between
    Currencies {
        /// Source to use, defaults to the first registered one
        #[arg(short, long)]
        source: Option<String>,
    },
    /// Convert an amount into one or more currencies
    Convert {
        /// Source to use, defaults to the first registered one
        #[arg(short, long)]
        source: Option<String>,
        /// Currency to convert from, defaults to EUR when available
        #[arg(short, long)]
        from: Option<String>,
        /// Currency to convert into, may be repeated
        #[arg(short, long = "to", required = true)]
        to: Vec<String>,
        /// Amount to convert
        amount: f64,
    },
    /// Change a stored option of a source
    Configure {
        /// Source whose option is changed
        #[arg(short, long)]
        source: String,
        /// Option key, see `sources`
        option: String,
    },
}

impl From<Commands> for currency_converter::AppCommand {
    fn from(cmd: Commands) -> currency_converter::AppCommand {
        use currency_converter::AppCommand;
        match cmd {
            Commands::Sources => AppCommand::Sources,
            Commands::Currencies { source } => AppCommand::Currencies { source },
            Commands::Convert {
                source,
                from,
                to,
                amount,
            } => AppCommand::Convert {
                source,
                from,
                to,
                amount,
            },
            Commands::Configure { source, option } => AppCommand::Configure { source, option },
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => currency_converter::cli::setup::setup(),
        Some(cmd) => currency_converter::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
