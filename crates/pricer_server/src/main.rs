//! Option pricer server
//!
//! Serves the pricing form and the JSON pricing API.

use clap::Parser;
use pricer_server::config::{build_config, CliArgs as ConfigCliArgs, ServerConfig};
use pricer_server::server::Server;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Option pricer server - binomial and Monte Carlo pricing over HTTP
#[derive(Parser, Debug)]
#[command(name = "pricer_server")]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path (TOML format)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Host address to bind to
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Largest accepted Monte Carlo path count
    #[arg(long)]
    max_paths: Option<usize>,

    /// Largest accepted step count
    #[arg(long)]
    max_steps: Option<usize>,

    /// Run Monte Carlo requests in parallel unless they ask otherwise
    #[arg(long)]
    parallel: bool,
}

impl From<Args> for ConfigCliArgs {
    fn from(args: Args) -> Self {
        ConfigCliArgs {
            config_file: args.config,
            host: args.host,
            port: args.port,
            log_level: args.log_level,
            max_paths: args.max_paths,
            max_steps: args.max_steps,
            parallel_mc: args.parallel,
        }
    }
}

fn init_tracing(config: &ServerConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(config.log_level.as_filter_str()));

    // JSON lines in production, human-readable output elsewhere
    let (json, plain) = if config.environment.is_production() {
        (Some(tracing_subscriber::fmt::layer().json()), None)
    } else {
        (None, Some(tracing_subscriber::fmt::layer()))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(json)
        .with(plain)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let cli_args: ConfigCliArgs = args.into();
    let config = build_config(&cli_args)?;

    init_tracing(&config);

    tracing::info!("Option pricer server v{}", pricer_server::VERSION);
    tracing::info!(
        host = %config.host,
        port = %config.port,
        log_level = %config.log_level,
        environment = %config.environment,
        max_paths = config.max_paths,
        max_steps = config.max_steps,
        parallel_mc = config.parallel_mc,
        "Server configuration loaded"
    );

    let server = Server::new(config);
    tracing::info!(address = %server.socket_addr(), "Starting server");

    server.run().await?;

    Ok(())
}
