//! Cox-Ross-Rubinstein binomial lattice for European options.
//!
//! # Algorithm
//!
//! With `n` steps over maturity `T`:
//!
//! ```text
//! dt   = T / n
//! u    = exp(σ √dt),  d = 1 / u
//! disc = exp(-r dt)
//! p    = (exp(r dt) - d) / (u - d)
//! ```
//!
//! Terminal node `j` (number of up-moves) carries `S₀ uʲ dⁿ⁻ʲ`. Option values
//! are rolled back one step at a time with
//! `V[j] = disc (p V[j+1] + (1 - p) V[j])` until a single value remains.
//!
//! The rollback runs in place over one buffer of `n + 1` values; no
//! per-step allocation is made.

use pricer_core::types::{
    ensure_positive, ensure_step_count, MarketParams, OptionSpec, PricingError,
};
use tracing::debug;

/// Per-step lattice factors.
///
/// Construction performs the no-arbitrage check, so an instance always has a
/// risk-neutral probability inside `[0, 1]`.
///
/// # Examples
///
/// ```rust
/// use pricer_pricing::tree::CrrParameters;
///
/// let crr = CrrParameters::new(1.0, 0.05, 0.2, 100).unwrap();
/// assert!((crr.up * crr.down - 1.0).abs() < 1e-12);
/// assert!(crr.probability > 0.0 && crr.probability < 1.0);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CrrParameters {
    /// Time step (years).
    pub dt: f64,
    /// Up factor `u`.
    pub up: f64,
    /// Down factor `d = 1 / u`.
    pub down: f64,
    /// One-step discount factor `exp(-r dt)`.
    pub discount: f64,
    /// Risk-neutral up-probability `p`.
    pub probability: f64,
}

impl CrrParameters {
    /// Computes the CRR factors for a lattice with `steps` steps.
    ///
    /// Inputs are assumed to be validated already; only the risk-neutral
    /// probability is checked here.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::InvalidRiskNeutralProbability`] when `p` is
    /// not finite or falls outside `[0, 1]`.
    pub fn new(
        maturity: f64,
        rate: f64,
        volatility: f64,
        steps: usize,
    ) -> Result<Self, PricingError> {
        let dt = maturity / steps as f64;
        let up = (volatility * dt.sqrt()).exp();
        let down = 1.0 / up;
        let discount = (-rate * dt).exp();
        let probability = ((rate * dt).exp() - down) / (up - down);

        if !probability.is_finite() || !(0.0..=1.0).contains(&probability) {
            return Err(PricingError::InvalidRiskNeutralProbability {
                probability,
                up,
                down,
            });
        }

        Ok(Self {
            dt,
            up,
            down,
            discount,
            probability,
        })
    }

    /// Underlying prices at the terminal nodes, ordered by up-move count.
    ///
    /// Node `j` holds `spot * u^j * d^(steps - j)`.
    pub fn terminal_prices(&self, spot: f64, steps: usize) -> Vec<f64> {
        (0..=steps)
            .map(|j| spot * self.up.powi(j as i32) * self.down.powi((steps - j) as i32))
            .collect()
    }
}

/// Reusable CRR lattice engine.
///
/// # Examples
///
/// ```rust
/// use pricer_core::types::{MarketParams, OptionSpec};
/// use pricer_pricing::tree::BinomialPricer;
///
/// let pricer = BinomialPricer::new(500).unwrap();
/// let market = MarketParams::new(100.0, 0.05, 0.2);
/// let call = OptionSpec::call(100.0, 1.0).unwrap();
///
/// let price = pricer.price(&market, &call).unwrap();
/// assert!((price - 10.4506).abs() < 0.01);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BinomialPricer {
    steps: usize,
}

impl BinomialPricer {
    /// Creates a lattice engine with `steps` time steps.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::InvalidInput`] naming `steps` when zero or
    /// above [`MAX_STEP_COUNT`](pricer_core::types::MAX_STEP_COUNT).
    pub fn new(steps: usize) -> Result<Self, PricingError> {
        ensure_step_count("steps", steps)?;
        Ok(Self { steps })
    }

    /// Returns the number of time steps.
    #[inline]
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Prices a European option on the lattice.
    ///
    /// # Errors
    ///
    /// - [`PricingError::InvalidInput`] for an invalid spot, volatility or rate
    /// - [`PricingError::InvalidRiskNeutralProbability`] when the lattice
    ///   parameters admit arbitrage
    pub fn price(&self, market: &MarketParams, option: &OptionSpec) -> Result<f64, PricingError> {
        market.validate()?;
        self.price_unchecked(market, option)
    }

    fn price_unchecked(
        &self,
        market: &MarketParams,
        option: &OptionSpec,
    ) -> Result<f64, PricingError> {
        let steps = self.steps;
        let crr = CrrParameters::new(option.maturity(), market.rate, market.volatility, steps)?;

        let mut values: Vec<f64> = crr
            .terminal_prices(market.spot, steps)
            .into_iter()
            .map(|price| option.intrinsic(price))
            .collect();

        let disc_p = crr.discount * crr.probability;
        let disc_q = crr.discount * (1.0 - crr.probability);

        for step in (0..steps).rev() {
            for j in 0..=step {
                values[j] = disc_p * values[j + 1] + disc_q * values[j];
            }
        }

        let price = values[0];
        debug!(
            kind = %option.kind(),
            strike = option.strike(),
            maturity = option.maturity(),
            steps,
            probability = crr.probability,
            price,
            "binomial lattice priced"
        );
        Ok(price)
    }
}

/// Prices a European option with a CRR binomial tree.
///
/// # Arguments
///
/// * `spot` - Current underlying price (must be positive)
/// * `option` - Validated option contract
/// * `rate` - Continuously-compounded annualised risk-free rate
/// * `volatility` - Annualised volatility (must be positive)
/// * `steps` - Number of lattice steps (must be positive)
///
/// # Errors
///
/// - [`PricingError::InvalidInput`] naming `spot`, `volatility`, `steps` or
///   `rate`, checked in that order before any lattice work
/// - [`PricingError::InvalidRiskNeutralProbability`] when `p ∉ [0, 1]`
///
/// # Examples
///
/// ```rust
/// use pricer_core::types::OptionSpec;
/// use pricer_pricing::tree::price_option;
///
/// let spec = OptionSpec::call(100.0, 1.0).unwrap();
/// let price = price_option(100.0, &spec, 0.05, 0.2, 100).unwrap();
/// assert!((price - 10.43).abs() < 0.05);
/// ```
pub fn price_option(
    spot: f64,
    option: &OptionSpec,
    rate: f64,
    volatility: f64,
    steps: usize,
) -> Result<f64, PricingError> {
    ensure_positive("spot", spot)?;
    ensure_positive("volatility", volatility)?;
    let pricer = BinomialPricer::new(steps)?;
    if !rate.is_finite() {
        return Err(PricingError::invalid_input("rate", "must be a finite number"));
    }

    pricer.price_unchecked(&MarketParams::new(spot, rate, volatility), option)
}
