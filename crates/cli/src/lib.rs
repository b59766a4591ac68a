pub mod commands;
pub mod config;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use crate::config::{CliConfig, LogFormat};

#[derive(Debug, Parser)]
#[command(
    name = "quotecalc",
    about = "Quote pricing calculation engine CLI",
    long_about = "Run the 13-stage quote pricing calculation, validate quote inputs, and inspect the variable catalog.",
    after_help = "Examples:\n  quotecalc calculate --input quote.json\n  quotecalc calculate --input quote.json --pretty\n  quotecalc check --input quote.json\n  quotecalc catalog --scope both"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Run the full calculation for a quote request file and emit the result")]
    Calculate {
        #[arg(long, help = "Path to a JSON calculation request")]
        input: PathBuf,
        #[arg(long, help = "Render a human-readable phase summary instead of JSON")]
        pretty: bool,
    },
    #[command(about = "Resolve and validate a quote request without calculating")]
    Check {
        #[arg(long, help = "Path to a JSON calculation request")]
        input: PathBuf,
    },
    #[command(about = "Print the variable catalog with scopes, kinds, ranges, and defaults")]
    Catalog {
        #[arg(long, help = "Filter by scope: product_only|quote_only|both|admin_only")]
        scope: Option<String>,
    },
}

fn init_logging(config: &CliConfig) {
    use tracing::Level;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);

    // try_init so repeated invocations from tests stay harmless
    let _ = match config.logging.format {
        LogFormat::Compact => tracing_subscriber::fmt()
            .with_target(false)
            .with_max_level(log_level)
            .compact()
            .try_init(),
        LogFormat::Pretty => tracing_subscriber::fmt()
            .with_target(false)
            .with_max_level(log_level)
            .pretty()
            .try_init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .with_target(false)
            .with_max_level(log_level)
            .json()
            .try_init(),
    };
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let config = match CliConfig::from_env() {
        Ok(config) => config,
        Err(error) => {
            eprintln!("configuration error: {error}");
            return ExitCode::from(2);
        }
    };
    init_logging(&config);

    let result = match cli.command {
        Command::Calculate { input, pretty } => commands::calculate::run(&input, pretty),
        Command::Check { input } => commands::check::run(&input),
        Command::Catalog { scope } => commands::catalog::run(scope.as_deref()),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
