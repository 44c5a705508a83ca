//! Option pricing endpoints
//!
//! - `POST /api/v1/price/binomial`: CRR lattice price of a European call or put
//! - `POST /api/v1/price/monte-carlo`: GBM Monte Carlo price of a payoff expression
//! - `GET /`, `GET /price`, `POST /price`: the HTML pricing form, see [`form`]
//!
//! The engines are CPU-bound, so every pricing run is moved onto tokio's
//! blocking pool. Step and path counts above the configured caps are
//! rejected before any work is scheduled.

pub mod form;

use axum::{
    extract::{rejection::JsonRejection, State},
    response::Json,
    routing::{get, post},
    Router,
};
use pricer_core::types::{OptionSpec, PricingError};
use pricer_pricing::mc::{ExecutionMode, GbmParams, MonteCarloConfig, MonteCarloPricer, PricingResult};
use pricer_pricing::payoff::{parse_payoff_expression, PayoffFunction};
use pricer_pricing::tree::price_option;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::AppState;
use crate::config::ServerConfig;
use crate::error::ApiError;

/// Binomial lattice pricing request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BinomialRequest {
    /// Current underlying price
    pub spot: f64,
    /// Strike price
    pub strike: f64,
    /// Time to maturity in years
    pub maturity: f64,
    /// Continuously-compounded risk-free rate
    pub rate: f64,
    /// Annualised volatility
    pub volatility: f64,
    /// Number of lattice steps
    pub steps: usize,
    /// `"call"` or `"put"`, case-insensitive
    pub kind: String,
}

/// Binomial lattice pricing response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BinomialResponse {
    /// Present value of the option
    pub price: f64,
}

/// Monte Carlo pricing request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonteCarloRequest {
    /// Current underlying price
    pub spot: f64,
    /// Continuously-compounded risk-free rate
    pub rate: f64,
    /// Annualised volatility
    pub volatility: f64,
    /// Time to maturity in years
    pub maturity: f64,
    /// Time steps per path
    pub steps: usize,
    /// Number of simulated paths
    pub paths: usize,
    /// Payoff expression over `S` and `path`
    pub payoff: String,
    /// Seed for a reproducible run
    #[serde(default)]
    pub seed: Option<u64>,
    /// Overrides the server's default execution mode
    #[serde(default)]
    pub parallel: Option<bool>,
}

/// Monte Carlo pricing response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonteCarloResponse {
    /// Discounted mean payoff
    pub price: f64,
    /// Standard error of the estimate
    pub std_error: f64,
    /// Number of simulated paths
    pub n_paths: usize,
}

impl From<PricingResult> for MonteCarloResponse {
    fn from(result: PricingResult) -> Self {
        Self {
            price: result.price,
            std_error: result.std_error,
            n_paths: result.n_paths,
        }
    }
}

/// Build the pricing routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(form::index))
        .route("/price", get(form::show).post(form::submit))
        .route("/api/v1/price/binomial", post(binomial_handler))
        .route("/api/v1/price/monte-carlo", post(monte_carlo_handler))
}

/// Rejects step and path counts above the configured caps.
pub(crate) fn check_limits(
    config: &ServerConfig,
    steps: usize,
    paths: Option<usize>,
) -> Result<(), ApiError> {
    if steps > config.max_steps {
        return Err(ApiError::LimitExceeded {
            field: "steps",
            limit: config.max_steps,
            value: steps,
        });
    }
    if let Some(paths) = paths {
        if paths > config.max_paths {
            return Err(ApiError::LimitExceeded {
                field: "paths",
                limit: config.max_paths,
                value: paths,
            });
        }
    }
    Ok(())
}

/// Runs a pricing closure on the blocking pool.
pub(crate) async fn run_blocking<T, F>(job: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, PricingError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(job)
        .await
        .map_err(|err| ApiError::Worker(err.to_string()))?
        .map_err(ApiError::from)
}

/// A fully parsed Monte Carlo run, ready to move onto a worker thread.
pub(crate) struct MonteCarloJob {
    pub gbm: GbmParams,
    pub steps: usize,
    pub paths: usize,
    pub payoff: PayoffFunction,
    pub seed: Option<u64>,
    pub mode: ExecutionMode,
}

impl MonteCarloJob {
    pub(crate) fn run(self) -> Result<PricingResult, PricingError> {
        self.gbm.validate()?;

        let mut builder = MonteCarloConfig::builder()
            .n_steps(self.steps)
            .n_paths(self.paths)
            .mode(self.mode);
        if let Some(seed) = self.seed {
            builder = builder.seed(seed);
        }

        MonteCarloPricer::new(builder.build()?)?.price(self.gbm, &self.payoff)
    }
}

/// Execution mode for a request, falling back to the server default.
pub(crate) fn execution_mode(config: &ServerConfig, requested: Option<bool>) -> ExecutionMode {
    if requested.unwrap_or(config.parallel_mc) {
        ExecutionMode::Parallel
    } else {
        ExecutionMode::Sequential
    }
}

/// POST /api/v1/price/binomial
async fn binomial_handler(
    State(state): State<AppState>,
    payload: Result<Json<BinomialRequest>, JsonRejection>,
) -> Result<Json<BinomialResponse>, ApiError> {
    let Json(request) = payload?;
    check_limits(&state.config, request.steps, None)?;

    let option = OptionSpec::parse(&request.kind, request.strike, request.maturity)?;
    let BinomialRequest {
        spot,
        rate,
        volatility,
        steps,
        ..
    } = request;
    let price =
        run_blocking(move || price_option(spot, &option, rate, volatility, steps)).await?;

    info!(steps, price, "binomial price computed");
    Ok(Json(BinomialResponse { price }))
}

/// POST /api/v1/price/monte-carlo
async fn monte_carlo_handler(
    State(state): State<AppState>,
    payload: Result<Json<MonteCarloRequest>, JsonRejection>,
) -> Result<Json<MonteCarloResponse>, ApiError> {
    let Json(request) = payload?;
    check_limits(&state.config, request.steps, Some(request.paths))?;

    let payoff = parse_payoff_expression(request.payoff.trim())?;
    let job = MonteCarloJob {
        gbm: GbmParams::new(
            request.spot,
            request.rate,
            request.volatility,
            request.maturity,
        ),
        steps: request.steps,
        paths: request.paths,
        payoff,
        seed: request.seed,
        mode: execution_mode(&state.config, request.parallel),
    };
    let result = run_blocking(move || job.run()).await?;

    info!(
        steps = request.steps,
        paths = request.paths,
        price = result.price,
        std_error = result.std_error,
        "monte carlo price computed"
    );
    Ok(Json(result.into()))
}
