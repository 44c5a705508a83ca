//! optprice - command-line European option pricing
//!
//! # Commands
//!
//! - `optprice binomial` - Cox-Ross-Rubinstein lattice price of a call or put
//! - `optprice monte-carlo <spot> <rate> <volatility> <maturity> <steps> <paths> <payoff>` -
//!   Monte Carlo price of a payoff expression
//!
//! Prices are written to stdout; logs go to stderr.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;
mod error;

pub use error::{CliError, Result};

use commands::binomial::BinomialArgs;
use commands::monte_carlo::MonteCarloArgs;

/// European option pricing from the command line
#[derive(Parser, Debug)]
#[command(name = "optprice")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Price a European option on a binomial lattice
    Binomial(BinomialArgs),

    /// Price a payoff expression by Monte Carlo simulation
    MonteCarlo(MonteCarloArgs),
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run(cli: &Cli) -> Result<()> {
    match &cli.command {
        Commands::Binomial(args) => commands::binomial::run(args),
        Commands::MonteCarlo(args) => commands::monte_carlo::run(args),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {}", err);
            ExitCode::FAILURE
        }
    }
}
