//! Market inputs for a single pricing call.

use super::error::{ensure_positive, PricingError};

/// Spot, rate and volatility of the underlying.
///
/// Not persisted anywhere: callers build one per pricing request.
///
/// # Examples
///
/// ```
/// use pricer_core::types::MarketParams;
///
/// let market = MarketParams::new(100.0, 0.05, 0.2);
/// assert!(market.validate().is_ok());
///
/// let bad = MarketParams::new(100.0, 0.05, 0.0);
/// assert_eq!(bad.validate().unwrap_err().field(), Some("volatility"));
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MarketParams {
    /// Current underlying price (S₀).
    pub spot: f64,
    /// Continuously-compounded annualised risk-free rate.
    pub rate: f64,
    /// Annualised volatility (σ).
    pub volatility: f64,
}

impl MarketParams {
    /// Creates market parameters without validating them.
    #[inline]
    pub fn new(spot: f64, rate: f64, volatility: f64) -> Self {
        Self {
            spot,
            rate,
            volatility,
        }
    }

    /// Validates the parameters in the order spot, volatility, rate.
    ///
    /// # Errors
    /// Returns [`PricingError::InvalidInput`] naming the first offending field.
    pub fn validate(&self) -> Result<(), PricingError> {
        ensure_positive("spot", self.spot)?;
        ensure_positive("volatility", self.volatility)?;
        if !self.rate.is_finite() {
            return Err(PricingError::invalid_input("rate", "must be a finite number"));
        }
        Ok(())
    }
}

impl Default for MarketParams {
    fn default() -> Self {
        Self {
            spot: 100.0,
            rate: 0.05,
            volatility: 0.2,
        }
    }
}
