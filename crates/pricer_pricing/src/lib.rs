//! # pricer_pricing: European option pricing engines (Layer 3)
//!
//! ## Layer 3 Role
//!
//! pricer_pricing holds the numerical engines of the workspace:
//! - Cox-Ross-Rubinstein binomial lattice (`tree`)
//! - Payoff expression language: lexer, parser and interpreter (`payoff`)
//! - Owned, seedable random streams with deterministic sub-streams (`rng`)
//! - Monte Carlo simulation under geometric Brownian motion (`mc`)
//! - Black-Scholes closed form used as the convergence reference (`analytical`)
//!
//! Every engine is synchronous and free of I/O, and no engine holds state
//! between calls. Inputs are validated eagerly and reported through
//! [`pricer_core::types::PricingError`].
//!
//! ## Usage Example
//!
//! ```rust
//! use pricer_core::types::OptionSpec;
//! use pricer_pricing::mc::monte_carlo_price;
//! use pricer_pricing::payoff::parse_payoff_expression;
//! use pricer_pricing::tree::price_option;
//!
//! let call = OptionSpec::call(100.0, 1.0).unwrap();
//! let lattice = price_option(100.0, &call, 0.05, 0.2, 500).unwrap();
//!
//! let payoff = parse_payoff_expression("max(S - 100, 0)").unwrap();
//! let simulated = monte_carlo_price(100.0, 0.05, 0.2, 1.0, 1, 100_000, &payoff, Some(42)).unwrap();
//!
//! assert!((lattice - 10.4506).abs() < 0.01);
//! assert!((simulated - 10.4506).abs() < 0.3);
//! ```
//!
//! ## Logging
//!
//! Engines emit `tracing` events at `debug` level with the run parameters
//! (steps, paths, seed, execution mode) and the resulting price. Installing
//! a subscriber is left to the binaries.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod analytical;
pub mod mc;
pub mod payoff;
pub mod rng;
pub mod tree;

pub use mc::{monte_carlo_price, MonteCarloConfig, MonteCarloPricer, PricingResult};
pub use payoff::{parse_payoff_expression, PathPayoff, PayoffFunction};
pub use tree::{price_option, BinomialPricer};
