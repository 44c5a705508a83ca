//! Monte Carlo pricing under geometric Brownian motion.
//!
//! This module simulates GBM paths, applies any [`PathPayoff`] to each and
//! returns the discounted average with its standard error.
//!
//! # Architecture
//!
//! ```text
//! MonteCarloPricer
//! ├── MonteCarloConfig  (paths, steps, seed, execution mode)
//! ├── GbmStepper        (precomputed per-step factors)
//! ├── PricerRng         (owned random stream, one per run or batch)
//! └── PathPayoff        (compiled expression or vanilla contract)
//! ```
//!
//! # Examples
//!
//! ## Textual payoff
//!
//! ```rust
//! use pricer_pricing::mc::monte_carlo_price;
//! use pricer_pricing::payoff::parse_payoff_expression;
//!
//! let payoff = parse_payoff_expression("max(S - 100, 0)").unwrap();
//! let price = monte_carlo_price(100.0, 0.05, 0.2, 1.0, 50, 20_000, &payoff, Some(42)).unwrap();
//! assert!((price - 10.45).abs() < 0.5);
//! ```
//!
//! ## Parallel engine with standard error
//!
//! ```rust
//! use pricer_core::types::OptionSpec;
//! use pricer_pricing::mc::{ExecutionMode, GbmParams, MonteCarloConfig, MonteCarloPricer};
//!
//! let config = MonteCarloConfig::builder()
//!     .n_paths(50_000)
//!     .n_steps(1)
//!     .seed(7)
//!     .mode(ExecutionMode::Parallel)
//!     .build()
//!     .unwrap();
//!
//! let pricer = MonteCarloPricer::new(config).unwrap();
//! let put = OptionSpec::put(100.0, 1.0).unwrap();
//! let result = pricer.price(GbmParams::default(), &put).unwrap();
//! println!("Price: {:.4} +/- {:.4}", result.price, result.confidence_95());
//! ```
//!
//! [`PathPayoff`]: crate::payoff::PathPayoff

pub mod config;
pub mod paths;
pub mod pricer;

pub use config::{ExecutionMode, MonteCarloConfig, MonteCarloConfigBuilder};
pub use paths::{GbmParams, GbmStepper};
pub use pricer::{monte_carlo_price, MonteCarloPricer, PricingResult, PARALLEL_BATCH_SIZE};
