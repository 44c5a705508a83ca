//! European option contract description.
//!
//! [`OptionSpec`] is the validated, immutable description of a European
//! call or put: its [`OptionKind`], strike and time to maturity. Once
//! constructed it cannot be modified, and construction never yields a
//! partially valid instance.
//!
//! # Examples
//!
//! ```
//! use pricer_core::types::{OptionKind, OptionSpec};
//!
//! let spec = OptionSpec::new(OptionKind::Call, 100.0, 1.0).unwrap();
//! assert_eq!(spec.intrinsic(105.0), 5.0);
//! assert_eq!(spec.intrinsic(95.0), 0.0);
//!
//! let kind: OptionKind = "Put".parse().unwrap();
//! assert_eq!(kind, OptionKind::Put);
//! ```

use std::fmt;
use std::str::FromStr;

use super::error::PricingError;

/// Exercise payoff direction.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum OptionKind {
    /// Right to buy at the strike: `max(S - K, 0)`.
    Call,
    /// Right to sell at the strike: `max(K - S, 0)`.
    Put,
}

impl OptionKind {
    /// Returns the lowercase name used in text interfaces.
    pub fn as_str(&self) -> &'static str {
        match self {
            OptionKind::Call => "call",
            OptionKind::Put => "put",
        }
    }

    /// Intrinsic value at underlying price `price` for strike `strike`.
    #[inline]
    pub fn intrinsic(&self, price: f64, strike: f64) -> f64 {
        match self {
            OptionKind::Call => (price - strike).max(0.0),
            OptionKind::Put => (strike - price).max(0.0),
        }
    }
}

impl fmt::Display for OptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OptionKind {
    type Err = PricingError;

    /// Parses `call` or `put` (case-insensitive, surrounding whitespace ignored).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "call" => Ok(OptionKind::Call),
            "put" => Ok(OptionKind::Put),
            _ => Err(PricingError::invalid_spec(
                "kind",
                format!("must be either 'call' or 'put', got '{}'", s.trim()),
            )),
        }
    }
}

/// Validated European option contract.
///
/// Invariants: `strike > 0` and `maturity > 0`, both finite.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct OptionSpec {
    kind: OptionKind,
    strike: f64,
    maturity: f64,
}

impl OptionSpec {
    /// Creates a validated option specification.
    ///
    /// # Arguments
    /// * `kind` - Call or put
    /// * `strike` - Strike price (must be positive)
    /// * `maturity` - Time to maturity in years (must be positive)
    ///
    /// # Errors
    /// Returns [`PricingError::InvalidSpec`] naming `strike` or `maturity`
    /// when the value is non-positive or not finite.
    ///
    /// # Examples
    /// ```
    /// use pricer_core::types::{OptionKind, OptionSpec, PricingError};
    ///
    /// assert!(OptionSpec::new(OptionKind::Put, 100.0, 0.5).is_ok());
    ///
    /// let err = OptionSpec::new(OptionKind::Put, -1.0, 0.5).unwrap_err();
    /// assert_eq!(err.field(), Some("strike"));
    /// ```
    pub fn new(kind: OptionKind, strike: f64, maturity: f64) -> Result<Self, PricingError> {
        if !strike.is_finite() || strike <= 0.0 {
            return Err(PricingError::invalid_spec(
                "strike",
                format!("must be positive, got {}", strike),
            ));
        }
        if !maturity.is_finite() || maturity <= 0.0 {
            return Err(PricingError::invalid_spec(
                "maturity",
                format!("must be positive, got {}", maturity),
            ));
        }

        Ok(Self {
            kind,
            strike,
            maturity,
        })
    }

    /// Creates a specification from a textual kind (`"call"` / `"put"`).
    ///
    /// # Errors
    /// Returns [`PricingError::InvalidSpec`] naming `kind`, `strike` or
    /// `maturity`.
    pub fn parse(kind: &str, strike: f64, maturity: f64) -> Result<Self, PricingError> {
        Self::new(kind.parse()?, strike, maturity)
    }

    /// Creates a call specification.
    pub fn call(strike: f64, maturity: f64) -> Result<Self, PricingError> {
        Self::new(OptionKind::Call, strike, maturity)
    }

    /// Creates a put specification.
    pub fn put(strike: f64, maturity: f64) -> Result<Self, PricingError> {
        Self::new(OptionKind::Put, strike, maturity)
    }

    /// Returns the option kind.
    #[inline]
    pub fn kind(&self) -> OptionKind {
        self.kind
    }

    /// Returns the strike price.
    #[inline]
    pub fn strike(&self) -> f64 {
        self.strike
    }

    /// Returns the time to maturity in years.
    #[inline]
    pub fn maturity(&self) -> f64 {
        self.maturity
    }

    /// Payoff at maturity for an underlying price `price`.
    #[inline]
    pub fn intrinsic(&self, price: f64) -> f64 {
        self.kind.intrinsic(price, self.strike)
    }
}
