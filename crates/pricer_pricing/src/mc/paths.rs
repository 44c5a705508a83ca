//! Path generation for Monte Carlo simulation.
//!
//! This module implements Geometric Brownian Motion (GBM) path generation
//! with the log-space (exact) step:
//!
//! ```text
//! S(t+dt) = S(t) × exp((r - 0.5σ²)dt + σ√dt × Z)
//! ```
//!
//! One standard normal `Z` is drawn per step, in step order, so a path of
//! `n` steps consumes exactly `n` variates from the stream.

use pricer_core::types::{ensure_positive, PricingError};

use crate::rng::PricerRng;

/// Parameters for Geometric Brownian Motion path generation.
///
/// # Model
///
/// Under the risk-neutral measure the asset follows:
/// ```text
/// dS = r S dt + σ S dW
/// ```
///
/// # Examples
///
/// ```rust
/// use pricer_pricing::mc::GbmParams;
///
/// let params = GbmParams {
///     spot: 100.0,
///     rate: 0.05,
///     volatility: 0.2,
///     maturity: 1.0,
/// };
/// assert!(params.validate().is_ok());
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GbmParams {
    /// Initial spot price (S₀).
    pub spot: f64,
    /// Risk-free rate (r) - annualised.
    pub rate: f64,
    /// Volatility (σ) - annualised.
    pub volatility: f64,
    /// Time to maturity (T) - in years.
    pub maturity: f64,
}

impl GbmParams {
    /// Creates new GBM parameters.
    #[inline]
    pub fn new(spot: f64, rate: f64, volatility: f64, maturity: f64) -> Self {
        Self {
            spot,
            rate,
            volatility,
            maturity,
        }
    }

    /// Validates the parameters.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::InvalidInput`] naming the first offending
    /// field, checked in the order spot, volatility, maturity, rate.
    pub fn validate(&self) -> Result<(), PricingError> {
        ensure_positive("spot", self.spot)?;
        ensure_positive("volatility", self.volatility)?;
        ensure_positive("maturity", self.maturity)?;
        if !self.rate.is_finite() {
            return Err(PricingError::invalid_input("rate", "must be a finite number"));
        }
        Ok(())
    }

    /// Discount factor to time zero, `exp(-rT)`.
    #[inline]
    pub fn discount_factor(&self) -> f64 {
        (-self.rate * self.maturity).exp()
    }
}

impl Default for GbmParams {
    fn default() -> Self {
        Self {
            spot: 100.0,
            rate: 0.05,
            volatility: 0.2,
            maturity: 1.0,
        }
    }
}

/// Precomputed per-step GBM factors for a fixed step count.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GbmStepper {
    spot: f64,
    drift_dt: f64,
    vol_sqrt_dt: f64,
    n_steps: usize,
}

impl GbmStepper {
    /// Precomputes `drift_dt = (r - 0.5σ²)dt` and `vol_sqrt_dt = σ√dt`.
    pub fn new(params: GbmParams, n_steps: usize) -> Self {
        let dt = params.maturity / n_steps as f64;
        Self {
            spot: params.spot,
            drift_dt: (params.rate - 0.5 * params.volatility * params.volatility) * dt,
            vol_sqrt_dt: params.volatility * dt.sqrt(),
            n_steps,
        }
    }

    /// Number of time steps per path.
    #[inline]
    pub fn n_steps(&self) -> usize {
        self.n_steps
    }

    /// Length of a full path, including the starting spot.
    #[inline]
    pub fn path_len(&self) -> usize {
        self.n_steps + 1
    }

    /// Simulates one path into `path`, overwriting its contents.
    ///
    /// `path[0]` is the spot and `path[i]` the price after step `i`.
    ///
    /// `path.len()` must equal [`path_len`](Self::path_len).
    #[inline]
    pub fn fill_path(&self, rng: &mut PricerRng, path: &mut [f64]) {
        debug_assert_eq!(path.len(), self.path_len());

        path[0] = self.spot;
        let steps = &mut path[1..];
        rng.fill_normal(steps);

        let mut price = self.spot;
        for slot in steps.iter_mut() {
            price *= (self.drift_dt + self.vol_sqrt_dt * *slot).exp();
            *slot = price;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_gbm_params_default() {
        let params = GbmParams::default();
        assert_eq!(params.spot, 100.0);
        assert_eq!(params.rate, 0.05);
        assert_eq!(params.volatility, 0.2);
        assert_eq!(params.maturity, 1.0);
    }

    #[test]
    fn test_validate_order() {
        let all_bad = GbmParams::new(0.0, f64::NAN, 0.0, 0.0);
        assert_eq!(all_bad.validate().unwrap_err().field(), Some("spot"));

        let vol_bad = GbmParams::new(100.0, f64::NAN, 0.0, 0.0);
        assert_eq!(vol_bad.validate().unwrap_err().field(), Some("volatility"));

        let maturity_bad = GbmParams::new(100.0, f64::NAN, 0.2, 0.0);
        assert_eq!(
            maturity_bad.validate().unwrap_err().field(),
            Some("maturity")
        );

        let rate_bad = GbmParams::new(100.0, f64::NAN, 0.2, 1.0);
        assert_eq!(rate_bad.validate().unwrap_err().field(), Some("rate"));
    }

    #[test]
    fn test_negative_rate_is_valid() {
        assert!(GbmParams::new(100.0, -0.01, 0.2, 1.0).validate().is_ok());
    }

    #[test]
    fn test_discount_factor() {
        let params = GbmParams::default();
        assert_relative_eq!(params.discount_factor(), (-0.05_f64).exp());
    }

    #[test]
    fn test_path_starts_at_spot_and_stays_positive() {
        let stepper = GbmStepper::new(GbmParams::default(), 50);
        let mut rng = PricerRng::from_seed(1);
        let mut path = vec![0.0; stepper.path_len()];

        stepper.fill_path(&mut rng, &mut path);

        assert_eq!(path[0], 100.0);
        assert!(path.iter().all(|&s| s > 0.0 && s.is_finite()));
    }

    #[test]
    fn test_path_uses_one_variate_per_step() {
        let params = GbmParams::default();
        let stepper = GbmStepper::new(params, 4);
        let mut rng = PricerRng::from_seed(9);
        let mut path = vec![0.0; 5];
        stepper.fill_path(&mut rng, &mut path);

        let mut replay = PricerRng::from_seed(9);
        let dt: f64 = 0.25;
        let mut expected = 100.0;
        for &value in &path[1..] {
            let z = replay.gen_normal();
            expected *= ((0.05 - 0.02) * dt + 0.2 * dt.sqrt() * z).exp();
            assert_relative_eq!(value, expected, epsilon = 1e-12);
        }

        // both streams now sit at the same position
        assert_eq!(rng.gen_normal(), replay.gen_normal());
    }

    #[test]
    fn test_zero_volatility_is_deterministic_growth() {
        let stepper = GbmStepper {
            spot: 100.0,
            drift_dt: 0.01,
            vol_sqrt_dt: 0.0,
            n_steps: 3,
        };
        let mut rng = PricerRng::from_seed(0);
        let mut path = vec![0.0; 4];
        stepper.fill_path(&mut rng, &mut path);
        assert_relative_eq!(path[3], 100.0 * 0.03_f64.exp(), epsilon = 1e-10);
    }
}
