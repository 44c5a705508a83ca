//! Monte Carlo command implementation
//!
//! Prices a user-defined payoff expression under geometric Brownian motion.

use clap::Args;
use pricer_pricing::mc::{ExecutionMode, GbmParams, MonteCarloConfig, MonteCarloPricer};
use pricer_pricing::payoff::parse_payoff_expression;
use tracing::info;

use crate::Result;

/// Arguments of `optprice monte-carlo`
#[derive(Args, Debug, Clone)]
pub struct MonteCarloArgs {
    /// Current underlying price
    #[arg(allow_negative_numbers = true)]
    pub spot: f64,

    /// Risk-free rate (annualised)
    #[arg(allow_negative_numbers = true)]
    pub rate: f64,

    /// Volatility (annualised)
    #[arg(allow_negative_numbers = true)]
    pub volatility: f64,

    /// Time to maturity in years
    #[arg(allow_negative_numbers = true)]
    pub maturity: f64,

    /// Number of time steps per path
    pub steps: usize,

    /// Number of Monte Carlo paths
    pub paths: usize,

    /// Payoff expression; use `path` for the price path or `S` for the terminal price
    pub payoff: String,

    /// Optional RNG seed for reproducible results
    #[arg(long)]
    pub seed: Option<u64>,

    /// Simulate batches of paths on all cores
    #[arg(long)]
    pub parallel: bool,
}

/// Prices the payoff described by `args`.
pub fn price(args: &MonteCarloArgs) -> Result<f64> {
    let payoff = parse_payoff_expression(args.payoff.trim())?;

    let gbm = GbmParams::new(args.spot, args.rate, args.volatility, args.maturity);
    gbm.validate()?;

    let mode = if args.parallel {
        ExecutionMode::Parallel
    } else {
        ExecutionMode::Sequential
    };
    let mut builder = MonteCarloConfig::builder()
        .n_steps(args.steps)
        .n_paths(args.paths)
        .mode(mode);
    if let Some(seed) = args.seed {
        builder = builder.seed(seed);
    }

    let result = MonteCarloPricer::new(builder.build()?)?.price(gbm, &payoff)?;
    info!(
        price = result.price,
        std_error = result.std_error,
        paths = result.n_paths,
        "monte carlo price computed"
    );
    Ok(result.price)
}

/// Run the monte-carlo command
pub fn run(args: &MonteCarloArgs) -> Result<()> {
    let price = price(args)?;
    println!("Estimated option price: {:.6}", price);
    Ok(())
}
