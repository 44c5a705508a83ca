//! Lattice pricing engines.
//!
//! - [`binomial`]: Cox-Ross-Rubinstein recombining tree for European options

pub mod binomial;

pub use binomial::{price_option, BinomialPricer, CrrParameters};
