//! Binomial command implementation
//!
//! Prices a European call or put on a Cox-Ross-Rubinstein lattice.

use clap::Args;
use pricer_core::types::OptionSpec;
use pricer_pricing::tree::price_option;
use tracing::info;

use crate::Result;

/// Arguments of `optprice binomial`
#[derive(Args, Debug, Clone)]
pub struct BinomialArgs {
    /// Current underlying price
    #[arg(long, default_value_t = 100.0, allow_negative_numbers = true)]
    pub spot: f64,

    /// Strike price
    #[arg(long, default_value_t = 100.0)]
    pub strike: f64,

    /// Time to maturity in years
    #[arg(long, default_value_t = 1.0)]
    pub maturity: f64,

    /// Continuously-compounded risk-free rate
    #[arg(long, default_value_t = 0.05, allow_negative_numbers = true)]
    pub rate: f64,

    /// Annualised volatility
    #[arg(long, default_value_t = 0.2)]
    pub volatility: f64,

    /// Number of lattice steps
    #[arg(long, default_value_t = 100)]
    pub steps: usize,

    /// Option kind: call or put
    #[arg(long, default_value = "call")]
    pub kind: String,
}

/// Prices the option described by `args`.
pub fn price(args: &BinomialArgs) -> Result<f64> {
    let option = OptionSpec::parse(&args.kind, args.strike, args.maturity)?;
    let price = price_option(args.spot, &option, args.rate, args.volatility, args.steps)?;
    info!(kind = %option.kind(), steps = args.steps, price, "binomial price computed");
    Ok(price)
}

/// Run the binomial command
pub fn run(args: &BinomialArgs) -> Result<()> {
    let price = price(args)?;
    println!("Estimated option price: {:.4}", price);
    Ok(())
}
