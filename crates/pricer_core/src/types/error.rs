//! Error types for structured error handling.
//!
//! This module provides [`PricingError`], the single error taxonomy shared by
//! the contract types in this crate and the pricing engines built on top of
//! them:
//! - `InvalidSpec`: contract description rejected (kind, strike, maturity)
//! - `InvalidInput`: market or engine input rejected (spot, rate, volatility, steps, paths)
//! - `InvalidRiskNeutralProbability`: lattice parameters violate no-arbitrage
//! - `PayoffCompile`: payoff expression text is not in the payoff grammar
//! - `PayoffEvaluation`: payoff expression failed against a concrete path

use thiserror::Error;

/// Categorised pricing errors.
///
/// Every failure of a pricing operation is reported through one of these
/// variants, with enough context for a front-end to render a readable
/// message.
///
/// # Examples
/// ```
/// use pricer_core::types::PricingError;
///
/// let err = PricingError::invalid_input("spot", "must be positive");
/// assert_eq!(format!("{}", err), "Invalid input 'spot': must be positive");
/// assert_eq!(err.kind(), "invalid_input");
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PricingError {
    /// Option contract description rejected.
    #[error("Invalid option spec '{field}': {reason}")]
    InvalidSpec {
        /// Offending field (`kind`, `strike` or `maturity`)
        field: &'static str,
        /// Description of the violated constraint
        reason: String,
    },

    /// Market or engine input rejected.
    #[error("Invalid input '{field}': {reason}")]
    InvalidInput {
        /// Offending field
        field: &'static str,
        /// Description of the violated constraint
        reason: String,
    },

    /// Risk-neutral up-probability outside `[0, 1]`.
    #[error(
        "Computed risk-neutral probability {probability} is outside [0, 1] \
         (up = {up}, down = {down}); check rate, volatility and step count"
    )]
    InvalidRiskNeutralProbability {
        /// The computed probability
        probability: f64,
        /// Up factor of the lattice
        up: f64,
        /// Down factor of the lattice
        down: f64,
    },

    /// Payoff expression could not be compiled.
    #[error("Payoff compile error at offset {position}: {message}")]
    PayoffCompile {
        /// What went wrong
        message: String,
        /// Byte offset into the expression text
        position: usize,
    },

    /// Payoff expression failed while evaluating a path.
    #[error("Payoff evaluation error: {0}")]
    PayoffEvaluation(String),
}

impl PricingError {
    /// Creates an [`PricingError::InvalidSpec`] for `field`.
    pub fn invalid_spec(field: &'static str, reason: impl Into<String>) -> Self {
        PricingError::InvalidSpec {
            field,
            reason: reason.into(),
        }
    }

    /// Creates an [`PricingError::InvalidInput`] for `field`.
    pub fn invalid_input(field: &'static str, reason: impl Into<String>) -> Self {
        PricingError::InvalidInput {
            field,
            reason: reason.into(),
        }
    }

    /// Stable snake_case code for the variant.
    ///
    /// Used as the machine-readable `error` field by the HTTP API.
    pub fn kind(&self) -> &'static str {
        match self {
            PricingError::InvalidSpec { .. } => "invalid_spec",
            PricingError::InvalidInput { .. } => "invalid_input",
            PricingError::InvalidRiskNeutralProbability { .. } => {
                "invalid_risk_neutral_probability"
            }
            PricingError::PayoffCompile { .. } => "payoff_compile_error",
            PricingError::PayoffEvaluation(_) => "payoff_evaluation_error",
        }
    }

    /// Returns the offending field name for validation errors.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            PricingError::InvalidSpec { field, .. } | PricingError::InvalidInput { field, .. } => {
                Some(field)
            }
            _ => None,
        }
    }
}

/// Checks that `value` is finite and strictly positive.
///
/// # Errors
/// Returns [`PricingError::InvalidInput`] naming `field` otherwise.
pub fn ensure_positive(field: &'static str, value: f64) -> Result<f64, PricingError> {
    if !value.is_finite() {
        return Err(PricingError::invalid_input(field, "must be a finite number"));
    }
    if value <= 0.0 {
        return Err(PricingError::invalid_input(
            field,
            format!("must be positive, got {}", value),
        ));
    }
    Ok(value)
}

/// Checks that a count is at least one.
///
/// # Errors
/// Returns [`PricingError::InvalidInput`] naming `field` when `value == 0`.
pub fn ensure_nonzero_count(field: &'static str, value: usize) -> Result<usize, PricingError> {
    if value == 0 {
        return Err(PricingError::invalid_input(
            field,
            "must be a positive integer",
        ));
    }
    Ok(value)
}

/// Largest step count a lattice or simulated path may use.
pub const MAX_STEP_COUNT: usize = i32::MAX as usize;

/// Checks that a step count is at least one and at most [`MAX_STEP_COUNT`].
///
/// # Errors
/// Returns [`PricingError::InvalidInput`] naming `field` otherwise.
pub fn ensure_step_count(field: &'static str, value: usize) -> Result<usize, PricingError> {
    ensure_nonzero_count(field, value)?;
    if value > MAX_STEP_COUNT {
        return Err(PricingError::invalid_input(
            field,
            format!("must not exceed {}, got {}", MAX_STEP_COUNT, value),
        ));
    }
    Ok(value)
}
