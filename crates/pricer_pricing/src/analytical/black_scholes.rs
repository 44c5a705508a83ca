//! Black-Scholes closed form for European options.
//!
//! Serves as the reference value the lattice and Monte Carlo engines
//! converge to.
//!
//! ## Mathematical Formulas
//!
//! **Call Price**: C = S·N(d₁) - K·e^(-rT)·N(d₂)
//! **Put Price**: P = K·e^(-rT)·N(-d₂) - S·N(-d₁)
//!
//! Where:
//! - d₁ = (ln(S/K) + (r + σ²/2)T) / (σ√T)
//! - d₂ = d₁ - σ√T

use pricer_core::math::norm_cdf;
use pricer_core::types::{MarketParams, OptionKind, OptionSpec, PricingError};

/// Black-Scholes model for European option pricing.
///
/// # Examples
/// ```
/// use pricer_core::types::{MarketParams, OptionSpec};
/// use pricer_pricing::analytical::BlackScholes;
///
/// let bs = BlackScholes::new(MarketParams::new(100.0, 0.05, 0.2)).unwrap();
/// let call = bs.price(&OptionSpec::call(100.0, 1.0).unwrap());
/// let put = bs.price(&OptionSpec::put(100.0, 1.0).unwrap());
///
/// // Put-call parity: C - P = S - K*exp(-rT)
/// let parity = call - put - (100.0 - 100.0 * (-0.05_f64).exp());
/// assert!(parity.abs() < 1e-10);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct BlackScholes {
    market: MarketParams,
}

impl BlackScholes {
    /// Creates the model from validated market parameters.
    ///
    /// # Errors
    /// Returns [`PricingError::InvalidInput`] for a non-positive spot or
    /// volatility, or a non-finite rate.
    pub fn new(market: MarketParams) -> Result<Self, PricingError> {
        market.validate()?;
        Ok(Self { market })
    }

    /// Returns the market parameters.
    #[inline]
    pub fn market(&self) -> &MarketParams {
        &self.market
    }

    /// d₁ = (ln(S/K) + (r + σ²/2)T) / (σ√T)
    #[inline]
    pub fn d1(&self, strike: f64, expiry: f64) -> f64 {
        let MarketParams {
            spot,
            rate,
            volatility,
        } = self.market;
        let drift = (rate + 0.5 * volatility * volatility) * expiry;
        ((spot / strike).ln() + drift) / (volatility * expiry.sqrt())
    }

    /// d₂ = d₁ - σ√T
    #[inline]
    pub fn d2(&self, strike: f64, expiry: f64) -> f64 {
        self.d1(strike, expiry) - self.market.volatility * expiry.sqrt()
    }

    /// European call price.
    pub fn price_call(&self, strike: f64, expiry: f64) -> f64 {
        let df = (-self.market.rate * expiry).exp();
        self.market.spot * norm_cdf(self.d1(strike, expiry))
            - strike * df * norm_cdf(self.d2(strike, expiry))
    }

    /// European put price.
    pub fn price_put(&self, strike: f64, expiry: f64) -> f64 {
        let df = (-self.market.rate * expiry).exp();
        strike * df * norm_cdf(-self.d2(strike, expiry))
            - self.market.spot * norm_cdf(-self.d1(strike, expiry))
    }

    /// Prices the contract; strike and maturity are taken from `option`.
    pub fn price(&self, option: &OptionSpec) -> f64 {
        match option.kind() {
            OptionKind::Call => self.price_call(option.strike(), option.maturity()),
            OptionKind::Put => self.price_put(option.strike(), option.maturity()),
        }
    }
}
