//! CLI error types

use pricer_core::types::PricingError;
use thiserror::Error;

/// Errors reported by `optprice` before it exits with a failure status.
#[derive(Debug, Error)]
pub enum CliError {
    /// Input validation, payoff compilation or evaluation failed.
    #[error(transparent)]
    Pricing(#[from] PricingError),
}

/// Result alias for CLI commands.
pub type Result<T> = std::result::Result<T, CliError>;
