//! # pricer_core: Foundation types for European option pricing
//!
//! ## Layer 1 (Foundation) Role
//!
//! pricer_core is the bottom layer of the workspace, providing:
//! - The validated option contract: `OptionKind`, `OptionSpec` (`types::option`)
//! - Per-call market inputs: `MarketParams` (`types::market`)
//! - The error taxonomy: `PricingError` (`types::error`)
//! - Standard normal distribution functions (`math::distributions`)
//!
//! ## Zero Dependency Principle
//!
//! Layer 1 has no dependencies on other pricer_* crates, with minimal external dependencies:
//! - num-traits: Traits for generic numerical computation
//! - thiserror: Error derivation
//! - serde: Serialisation support (optional)
//!
//! ## Usage Examples
//!
//! ```rust
//! use pricer_core::types::{MarketParams, OptionKind, OptionSpec, PricingError};
//!
//! let spec = OptionSpec::new(OptionKind::Call, 100.0, 1.0).unwrap();
//! assert_eq!(spec.strike(), 100.0);
//!
//! let market = MarketParams::new(100.0, 0.05, 0.2);
//! assert!(market.validate().is_ok());
//!
//! // Construction never yields a partially valid contract
//! let err = OptionSpec::new(OptionKind::Put, 100.0, -1.0).unwrap_err();
//! assert!(matches!(err, PricingError::InvalidSpec { field: "maturity", .. }));
//! ```
//!
//! ## Feature Flags
//!
//! - `serde` (default): Enable serialisation for `OptionKind`, `OptionSpec`, `MarketParams`

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod math;
pub mod types;
