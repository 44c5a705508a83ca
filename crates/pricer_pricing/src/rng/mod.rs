//! # Random Number Generation Infrastructure
//!
//! This module provides the random stream used by the Monte Carlo engine.
//!
//! ## Design Rationale
//!
//! - **Owned state**: every pricing call creates its own [`PricerRng`]; there
//!   is no process-wide generator to seed or to race on
//! - **Reproducibility**: a seeded stream replays bit-identically
//! - **Parallel splitting**: [`PricerRng::substream`] derives child streams
//!   from the root seed and a batch index only
//!
//! ## Usage Example
//!
//! ```rust
//! use pricer_pricing::rng::PricerRng;
//!
//! let mut rng = PricerRng::from_seed(12345);
//!
//! let normal_value = rng.gen_normal();
//!
//! let mut buffer = vec![0.0; 1000];
//! rng.fill_normal(&mut buffer);
//! ```

mod prng;

pub use prng::PricerRng;
