//! Server configuration management
//!
//! Handles loading configuration from environment variables, TOML files, and CLI arguments.
//!
//! Priority (highest to lowest):
//! 1. CLI arguments
//! 2. Environment variables
//! 3. Config file
//! 4. Default values

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

/// Configuration error types
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Port 0 cannot be served.
    #[error("Invalid port number: {0}. Must be between 1 and 65535")]
    InvalidPort(u16),

    /// Unknown log level name.
    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    /// Unknown environment name.
    #[error("Invalid environment: {0}. Must be one of: development, staging, production")]
    InvalidEnvironment(String),

    /// A request cap was set to zero.
    #[error("Invalid limit: {0} must be at least 1")]
    InvalidLimit(&'static str),

    /// Config file missing or malformed.
    #[error("Configuration file error: {0}")]
    FileError(String),

    /// Environment variable holds an unparsable value.
    #[error("Environment variable {name} has invalid value '{value}'")]
    EnvError {
        /// Variable name
        name: &'static str,
        /// Raw value found
        value: String,
    },
}

/// Log levels supported by the server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Everything, including per-request traces
    Trace,
    /// Engine run parameters and results
    Debug,
    /// Startup and request summaries
    #[default]
    Info,
    /// Recoverable problems
    Warn,
    /// Failures only
    Error,
}

impl FromStr for LogLevel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(ConfigError::InvalidLogLevel(s.to_string())),
        }
    }
}

impl LogLevel {
    /// Convert log level to tracing filter string
    pub fn as_filter_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_filter_str())
    }
}

/// Deployment environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Local development, human-readable logs
    #[default]
    Development,
    /// Pre-production
    Staging,
    /// Production, JSON logs
    Production,
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "staging" | "stage" => Ok(Environment::Staging),
            "production" | "prod" => Ok(Environment::Production),
            _ => Err(ConfigError::InvalidEnvironment(s.to_string())),
        }
    }
}

impl Environment {
    /// Check if this is a production environment
    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Staging => write!(f, "staging"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Server configuration structure
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host address to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Log level
    #[serde(deserialize_with = "deserialize_log_level")]
    pub log_level: LogLevel,
    /// Environment (development, staging, production)
    #[serde(deserialize_with = "deserialize_environment")]
    pub environment: Environment,
    /// Largest accepted Monte Carlo path count per request
    pub max_paths: usize,
    /// Largest accepted step count per request (lattice or path)
    pub max_steps: usize,
    /// Default Monte Carlo execution mode for requests that do not choose one
    pub parallel_mc: bool,
}

fn deserialize_log_level<'de, D>(deserializer: D) -> Result<LogLevel, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    LogLevel::from_str(&s).map_err(serde::de::Error::custom)
}

fn deserialize_environment<'de, D>(deserializer: D) -> Result<Environment, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    Environment::from_str(&s).map_err(serde::de::Error::custom)
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            log_level: LogLevel::Info,
            environment: Environment::Development,
            max_paths: 1_000_000,
            max_steps: 10_000,
            parallel_mc: false,
        }
    }
}

fn parse_env<T: FromStr>(name: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::EnvError { name, value })
}

fn parse_bool(name: &'static str, value: String) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::EnvError { name, value }),
    }
}

impl ServerConfig {
    /// Create a new ServerConfig with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from environment variables on top of the defaults
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileError(format!("Failed to read config file: {}", e)))?;

        let config: ServerConfig = toml::from_str(&content)
            .map_err(|e| ConfigError::FileError(format!("Failed to parse TOML: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Overrides fields from the process environment.
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_env_from(|name| std::env::var(name).ok())
    }

    /// Overrides fields from `lookup`, one variable per field.
    ///
    /// Unset variables leave the field untouched; set but unparsable ones
    /// are an error.
    pub fn apply_env_from<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("PRICER_SERVER_HOST") {
            self.host = host;
        }
        if let Some(port) = lookup("PRICER_SERVER_PORT") {
            self.port = parse_env("PRICER_SERVER_PORT", port)?;
        }
        if let Some(level) = lookup("PRICER_LOG_LEVEL") {
            self.log_level = LogLevel::from_str(&level)?;
        }
        if let Some(env) = lookup("PRICER_ENV") {
            self.environment = Environment::from_str(&env)?;
        }
        if let Some(paths) = lookup("PRICER_MAX_PATHS") {
            self.max_paths = parse_env("PRICER_MAX_PATHS", paths)?;
        }
        if let Some(steps) = lookup("PRICER_MAX_STEPS") {
            self.max_steps = parse_env("PRICER_MAX_STEPS", steps)?;
        }
        if let Some(parallel) = lookup("PRICER_PARALLEL_MC") {
            self.parallel_mc = parse_bool("PRICER_PARALLEL_MC", parallel)?;
        }
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::InvalidPort(self.port));
        }
        if self.max_paths == 0 {
            return Err(ConfigError::InvalidLimit("max_paths"));
        }
        if self.max_steps == 0 {
            return Err(ConfigError::InvalidLimit("max_steps"));
        }
        Ok(())
    }

    /// Get the socket address string
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Merge with CLI arguments (CLI takes precedence)
    pub fn merge_with_cli(&mut self, cli: &CliArgs) -> Result<(), ConfigError> {
        if let Some(host) = &cli.host {
            self.host = host.clone();
        }
        if let Some(port) = cli.port {
            self.port = port;
        }
        if let Some(log_level) = &cli.log_level {
            self.log_level = LogLevel::from_str(log_level)?;
        }
        if let Some(max_paths) = cli.max_paths {
            self.max_paths = max_paths;
        }
        if let Some(max_steps) = cli.max_steps {
            self.max_steps = max_steps;
        }
        if cli.parallel_mc {
            self.parallel_mc = true;
        }
        Ok(())
    }
}

/// CLI arguments structure
#[derive(Debug, Clone, Default)]
pub struct CliArgs {
    /// Config file path
    pub config_file: Option<PathBuf>,
    /// Host address override
    pub host: Option<String>,
    /// Port override
    pub port: Option<u16>,
    /// Log level override
    pub log_level: Option<String>,
    /// Path cap override
    pub max_paths: Option<usize>,
    /// Step cap override
    pub max_steps: Option<usize>,
    /// Force parallel Monte Carlo by default
    pub parallel_mc: bool,
}

/// Build configuration from all sources
pub fn build_config(cli: &CliArgs) -> Result<ServerConfig, ConfigError> {
    let mut config = match &cli.config_file {
        Some(path) => ServerConfig::from_file(path)?,
        None => ServerConfig::default(),
    };

    config.apply_env()?;
    config.merge_with_cli(cli)?;
    config.validate()?;

    Ok(config)
}
