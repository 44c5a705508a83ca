//! Contract, market and error types.
//!
//! This module provides:
//! - `option`: [`OptionKind`] and the validated [`OptionSpec`] contract
//! - `market`: [`MarketParams`] passed per pricing call
//! - `error`: the [`PricingError`] taxonomy and shared validation helpers

pub mod error;
pub mod market;
pub mod option;

pub use error::{
    ensure_nonzero_count, ensure_positive, ensure_step_count, PricingError, MAX_STEP_COUNT,
};
pub use market::MarketParams;
pub use option::{OptionKind, OptionSpec};
