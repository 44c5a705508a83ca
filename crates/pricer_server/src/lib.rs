//! HTTP front-end for the European option pricing engines
//!
//! This crate serves the binomial lattice and the Monte Carlo engine over a
//! JSON API, plus a small HTML form for interactive Monte Carlo pricing.
//!
//! - `config`: layered [`config::ServerConfig`] (defaults, TOML, env, CLI)
//! - `routes`: the axum router, pricing handlers and health probes
//! - `server`: binding and serving
//! - `error`: [`error::ApiError`] and its JSON rendering

pub mod config;
pub mod error;
pub mod routes;
pub mod server;

pub use config::{build_config, CliArgs, ConfigError, ServerConfig};
pub use error::ApiError;
pub use server::Server;

/// Server version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
