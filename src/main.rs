use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use valtrack::cli::setup::setup;
use valtrack::core::log::init_logging;

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

impl From<Commands> for valtrack::AppCommand {
    fn from(cmd: Commands) -> valtrack::AppCommand {
        match cmd {
            Commands::Quote { symbol } => valtrack::AppCommand::Quote(symbol),
            Commands::Add { symbol } => valtrack::AppCommand::Add(symbol),
            Commands::Remove { symbol } => valtrack::AppCommand::Remove(symbol),
            Commands::List => valtrack::AppCommand::List,
            Commands::Refresh => valtrack::AppCommand::Refresh,
            Commands::Search { query } => valtrack::AppCommand::Search(query),
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Show valuation metrics for one stock
    Quote { symbol: String },
    /// Track a stock in the portfolio
    Add { symbol: String },
    /// Stop tracking a stock
    Remove { symbol: String },
    /// Display the portfolio, refreshing stale quotes
    List,
    /// Re-fetch quotes for every tracked stock
    Refresh,
    /// Search the exchange symbol list
    Search { query: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => setup(),
        Some(cmd) => valtrack::run_command(cmd.into(), cli.config_path.as_deref()).await,
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
