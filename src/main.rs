use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use fxc::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl From<Commands> for fxc::AppCommand {
    fn from(cmd: Commands) -> fxc::AppCommand {
        match cmd {
            Commands::Convert { amount, from, to } => fxc::AppCommand::Convert { amount, from, to },
            Commands::Rates { base } => fxc::AppCommand::Rates { base },
            Commands::History { from, to, days } => fxc::AppCommand::History { from, to, days },
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Convert an amount between two currencies
    Convert {
        /// Amount in the base currency
        amount: String,
        /// Currency to convert from (e.g. USD)
        #[arg(long)]
        from: Option<String>,
        /// Currency to convert to (e.g. EGP)
        #[arg(long)]
        to: Option<String>,
    },
    /// Display latest rates for a base currency
    Rates {
        /// Base currency (e.g. USD)
        #[arg(long)]
        base: Option<String>,
    },
    /// Display a historical rate chart for a currency pair
    History {
        /// Currency to convert from (e.g. USD)
        #[arg(long)]
        from: Option<String>,
        /// Currency to convert to (e.g. EGP)
        #[arg(long)]
        to: Option<String>,
        /// Days of history to fetch
        #[arg(long)]
        days: Option<i64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => fxc::cli::setup::setup(),
        Some(cmd) => fxc::run_command(cmd.into(), cli.config_path.as_deref()).await,
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
