//! CLI command implementations
//!
//! Each submodule implements a specific CLI command.

pub mod binomial;
pub mod monte_carlo;
