use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use ratesnow::core::format::parse_locale_number;
use ratesnow::core::log::init_logging;
use ratesnow::core::rates::Direction;

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

impl From<Commands> for ratesnow::AppCommand {
    fn from(cmd: Commands) -> ratesnow::AppCommand {
        match cmd {
            Commands::Rates => ratesnow::AppCommand::Rates,
            Commands::Bitcoins => ratesnow::AppCommand::Bitcoins,
            Commands::Stocks { filter } => ratesnow::AppCommand::Stocks { filter },
            Commands::Convert {
                code,
                amount,
                to_brl,
                from_brl,
            } => ratesnow::AppCommand::Convert {
                code,
                amount,
                direction: if from_brl && !to_brl {
                    Direction::FromBrl
                } else {
                    Direction::ToBrl
                },
            },
            Commands::All => ratesnow::AppCommand::All,
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Display exchange rates against the Brazilian real
    Rates,
    /// Display bitcoin quotes per exchange
    Bitcoins,
    /// Display stock market indices
    Stocks {
        /// Only show indices whose ticker or name contains this text
        #[arg(short, long)]
        filter: Option<String>,
    },
    /// Convert an amount between a currency and the Brazilian real
    Convert {
        /// Currency code, e.g. USD
        code: String,
        /// Amount to convert; accepts 1234.5 or 1.234,50
        #[arg(value_parser = parse_amount)]
        amount: f64,
        /// Convert from the currency to reais (default)
        #[arg(long, conflicts_with = "from_brl")]
        to_brl: bool,
        /// Convert from reais to the currency
        #[arg(long)]
        from_brl: bool,
    },
    /// Display every feed
    All,
}

fn parse_amount(raw: &str) -> Result<f64, String> {
    match parse_locale_number(raw) {
        Some(amount) if amount >= 0.0 => Ok(amount),
        _ => Err(format!("'{raw}' is not a valid amount")),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => match cli.config_path.as_deref() {
            Some(path) => ratesnow::cli::setup::setup_at_path(path),
            None => ratesnow::cli::setup::setup(),
        },
        Some(cmd) => ratesnow::run_command(cmd.into(), cli.config_path.as_deref()).await,
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
