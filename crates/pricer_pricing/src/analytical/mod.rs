//! Analytical (closed-form) solutions for option pricing.
//!
//! Used to verify the accuracy of the lattice and Monte Carlo engines.
//!
//! # Available Solutions
//!
//! - **European vanilla options**: Black-Scholes (1973)

pub mod black_scholes;

pub use black_scholes::BlackScholes;
