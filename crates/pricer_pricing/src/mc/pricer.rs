//! Monte Carlo pricing engine.
//!
//! # Overview
//!
//! The [`MonteCarloPricer`] coordinates:
//! 1. Random number generation (via [`PricerRng`](crate::rng::PricerRng))
//! 2. Path generation (via [`GbmStepper`](super::paths::GbmStepper))
//! 3. Payoff evaluation (via [`PathPayoff`](crate::payoff::PathPayoff))
//! 4. Discounting and aggregation
//!
//! A single path buffer is reused for every trial of a run; paths are never
//! retained.

use rayon::prelude::*;
use tracing::debug;

use pricer_core::types::{ensure_positive, PricingError};

use super::config::{ExecutionMode, MonteCarloConfig};
use super::paths::{GbmParams, GbmStepper};
use crate::payoff::PathPayoff;
use crate::rng::PricerRng;

/// Paths per batch in [`ExecutionMode::Parallel`].
///
/// Batch boundaries fix which sub-stream each path draws from, so changing
/// this value changes parallel results for a given seed.
pub const PARALLEL_BATCH_SIZE: usize = 4096;

/// Monte Carlo estimate.
///
/// # Examples
///
/// ```rust
/// use pricer_pricing::mc::PricingResult;
///
/// let result = PricingResult {
///     price: 10.5,
///     std_error: 0.05,
///     n_paths: 10_000,
/// };
///
/// println!("Price: {} +/- {}", result.price, result.confidence_95());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PricingResult {
    /// Discounted mean payoff.
    pub price: f64,
    /// Standard error of the price estimate.
    pub std_error: f64,
    /// Number of simulated paths.
    pub n_paths: usize,
}

impl PricingResult {
    /// Returns the 95% confidence interval half-width.
    #[inline]
    pub fn confidence_95(&self) -> f64 {
        1.96 * self.std_error
    }
}

/// Running payoff sums for one batch of paths.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct PayoffMoments {
    sum: f64,
    sum_sq: f64,
    count: usize,
}

impl PayoffMoments {
    #[inline]
    fn push(&mut self, value: f64) {
        self.sum += value;
        self.sum_sq += value * value;
        self.count += 1;
    }

    fn merge(self, other: Self) -> Self {
        Self {
            sum: self.sum + other.sum,
            sum_sq: self.sum_sq + other.sum_sq,
            count: self.count + other.count,
        }
    }

    fn into_result(self, discount_factor: f64) -> PricingResult {
        let n = self.count as f64;
        let mean = self.sum / n;
        let std_error = if self.count > 1 {
            let variance = ((self.sum_sq - n * mean * mean) / (n - 1.0)).max(0.0);
            (variance / n).sqrt()
        } else {
            0.0
        };

        PricingResult {
            price: discount_factor * mean,
            std_error: discount_factor * std_error,
            n_paths: self.count,
        }
    }
}

/// Simulates `n_paths` paths from `rng` and accumulates their payoffs.
fn simulate<P: PathPayoff + ?Sized>(
    stepper: &GbmStepper,
    rng: &mut PricerRng,
    n_paths: usize,
    payoff: &P,
) -> Result<PayoffMoments, PricingError> {
    let mut path = vec![0.0; stepper.path_len()];
    let mut moments = PayoffMoments::default();
    for _ in 0..n_paths {
        stepper.fill_path(rng, &mut path);
        moments.push(payoff.payoff(&path)?);
    }
    Ok(moments)
}

/// Monte Carlo pricing engine.
///
/// # Examples
///
/// ```rust
/// use pricer_pricing::mc::{GbmParams, MonteCarloConfig, MonteCarloPricer};
/// use pricer_pricing::payoff::parse_payoff_expression;
///
/// let config = MonteCarloConfig::builder()
///     .n_paths(10_000)
///     .n_steps(12)
///     .seed(42)
///     .build()
///     .unwrap();
///
/// let pricer = MonteCarloPricer::new(config).unwrap();
/// let payoff = parse_payoff_expression("max(S - 100, 0)").unwrap();
///
/// let result = pricer.price(GbmParams::default(), &payoff).unwrap();
/// assert!((result.price - 10.45).abs() < 4.0 * result.std_error + 0.05);
/// ```
#[derive(Clone, Debug)]
pub struct MonteCarloPricer {
    config: MonteCarloConfig,
}

impl MonteCarloPricer {
    /// Creates a new pricer with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::InvalidInput`] if the configuration is invalid.
    pub fn new(config: MonteCarloConfig) -> Result<Self, PricingError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Returns a reference to the configuration.
    #[inline]
    pub fn config(&self) -> &MonteCarloConfig {
        &self.config
    }

    /// Prices `payoff` under GBM dynamics.
    ///
    /// # Errors
    ///
    /// - [`PricingError::InvalidInput`] if `gbm` fails validation; nothing is
    ///   simulated in that case
    /// - The first error returned by `payoff`, unchanged; no partial result
    ///   is produced
    pub fn price<P>(&self, gbm: GbmParams, payoff: &P) -> Result<PricingResult, PricingError>
    where
        P: PathPayoff + Sync + ?Sized,
    {
        gbm.validate()?;
        match self.config.mode() {
            ExecutionMode::Sequential => self.price_sequential(gbm, payoff),
            ExecutionMode::Parallel => self.price_parallel(gbm, payoff),
        }
    }

    fn price_sequential<P>(
        &self,
        gbm: GbmParams,
        payoff: &P,
    ) -> Result<PricingResult, PricingError>
    where
        P: PathPayoff + ?Sized,
    {
        let n_paths = self.config.n_paths();
        let stepper = GbmStepper::new(gbm, self.config.n_steps());
        let mut rng = PricerRng::from_optional_seed(self.config.seed());

        debug!(
            n_paths,
            n_steps = stepper.n_steps(),
            seed = rng.seed(),
            mode = "sequential",
            "monte carlo run started"
        );

        let moments = simulate(&stepper, &mut rng, n_paths, payoff)?;
        let result = moments.into_result(gbm.discount_factor());

        debug!(
            price = result.price,
            std_error = result.std_error,
            "monte carlo run finished"
        );
        Ok(result)
    }

    fn price_parallel<P>(&self, gbm: GbmParams, payoff: &P) -> Result<PricingResult, PricingError>
    where
        P: PathPayoff + Sync + ?Sized,
    {
        let n_paths = self.config.n_paths();
        let stepper = GbmStepper::new(gbm, self.config.n_steps());
        let root = PricerRng::from_optional_seed(self.config.seed());
        let n_batches = n_paths.div_ceil(PARALLEL_BATCH_SIZE);

        debug!(
            n_paths,
            n_steps = stepper.n_steps(),
            seed = root.seed(),
            n_batches,
            mode = "parallel",
            "monte carlo run started"
        );

        let batches: Vec<Result<PayoffMoments, PricingError>> = (0..n_batches)
            .into_par_iter()
            .map(|batch| {
                let start = batch * PARALLEL_BATCH_SIZE;
                let len = PARALLEL_BATCH_SIZE.min(n_paths - start);
                let mut rng = root.substream(batch as u64);
                simulate(&stepper, &mut rng, len, payoff)
            })
            .collect();

        // reduce in batch order so the sum is independent of scheduling
        let mut moments = PayoffMoments::default();
        for batch in batches {
            moments = moments.merge(batch?);
        }
        let result = moments.into_result(gbm.discount_factor());

        debug!(
            price = result.price,
            std_error = result.std_error,
            "monte carlo run finished"
        );
        Ok(result)
    }
}

/// Prices a payoff by Monte Carlo simulation of GBM paths.
///
/// Runs sequentially: with a fixed `seed` the result is bit-reproducible.
/// Without one, a fresh seed is drawn from OS entropy.
///
/// # Arguments
///
/// * `spot` - Current underlying price (must be positive)
/// * `rate` - Continuously-compounded annualised risk-free rate
/// * `volatility` - Annualised volatility (must be positive)
/// * `maturity` - Time to maturity in years (must be positive)
/// * `steps` - Time steps per path (must be positive)
/// * `paths` - Number of simulated paths (must be positive)
/// * `payoff` - Maps a path of `steps + 1` prices to a payoff
/// * `seed` - Optional seed for reproducibility
///
/// # Errors
///
/// - [`PricingError::InvalidInput`] naming `spot`, `volatility`, `maturity`,
///   `steps`, `paths` or `rate`, checked in that order before simulating
/// - Any error raised by `payoff`, unchanged
///
/// # Examples
///
/// ```rust
/// use pricer_pricing::mc::monte_carlo_price;
/// use pricer_pricing::payoff::parse_payoff_expression;
///
/// let payoff = parse_payoff_expression("max(S - 100, 0)").unwrap();
/// let a = monte_carlo_price(100.0, 0.05, 0.2, 1.0, 10, 2_000, &payoff, Some(7)).unwrap();
/// let b = monte_carlo_price(100.0, 0.05, 0.2, 1.0, 10, 2_000, &payoff, Some(7)).unwrap();
/// assert_eq!(a.to_bits(), b.to_bits());
/// ```
#[allow(clippy::too_many_arguments)]
pub fn monte_carlo_price<P>(
    spot: f64,
    rate: f64,
    volatility: f64,
    maturity: f64,
    steps: usize,
    paths: usize,
    payoff: &P,
    seed: Option<u64>,
) -> Result<f64, PricingError>
where
    P: PathPayoff + ?Sized,
{
    ensure_positive("spot", spot)?;
    ensure_positive("volatility", volatility)?;
    ensure_positive("maturity", maturity)?;

    let mut builder = MonteCarloConfig::builder().n_steps(steps).n_paths(paths);
    if let Some(seed) = seed {
        builder = builder.seed(seed);
    }
    let pricer = MonteCarloPricer::new(builder.build()?)?;

    let gbm = GbmParams::new(spot, rate, volatility, maturity);
    gbm.validate()?;

    pricer
        .price_sequential(gbm, payoff)
        .map(|result| result.price)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payoff::parse_payoff_expression;
    use approx::assert_relative_eq;
    use pricer_core::types::OptionSpec;

    fn seeded_config(n_paths: usize, n_steps: usize, mode: ExecutionMode) -> MonteCarloConfig {
        MonteCarloConfig::builder()
            .n_paths(n_paths)
            .n_steps(n_steps)
            .seed(42)
            .mode(mode)
            .build()
            .unwrap()
    }

    #[test]
    fn test_price_european_call() {
        let pricer =
            MonteCarloPricer::new(seeded_config(50_000, 1, ExecutionMode::Sequential)).unwrap();
        let call = OptionSpec::call(100.0, 1.0).unwrap();

        let result = pricer.price(GbmParams::default(), &call).unwrap();

        assert!(result.std_error > 0.0);
        assert!(result.std_error < result.price * 0.1);
        assert!((result.price - 10.4506).abs() < 4.0 * result.std_error);
        assert_eq!(result.n_paths, 50_000);
    }

    #[test]
    fn test_sequential_reproducibility() {
        let pricer =
            MonteCarloPricer::new(seeded_config(2_000, 20, ExecutionMode::Sequential)).unwrap();
        let payoff = parse_payoff_expression("max(fsum(path) / 21 - 100, 0)").unwrap();

        let a = pricer.price(GbmParams::default(), &payoff).unwrap();
        let b = pricer.price(GbmParams::default(), &payoff).unwrap();

        assert_eq!(a.price.to_bits(), b.price.to_bits());
        assert_eq!(a.std_error.to_bits(), b.std_error.to_bits());
    }

    #[test]
    fn test_parallel_reproducibility() {
        let n_paths = 3 * PARALLEL_BATCH_SIZE + 17;
        let pricer =
            MonteCarloPricer::new(seeded_config(n_paths, 8, ExecutionMode::Parallel)).unwrap();
        let payoff = parse_payoff_expression("max(S - 100, 0)").unwrap();

        let a = pricer.price(GbmParams::default(), &payoff).unwrap();
        let b = pricer.price(GbmParams::default(), &payoff).unwrap();

        assert_eq!(a.price.to_bits(), b.price.to_bits());
        assert_eq!(a.n_paths, n_paths);
    }

    #[test]
    fn test_parallel_independent_of_thread_count() {
        let config = seeded_config(2 * PARALLEL_BATCH_SIZE + 5, 4, ExecutionMode::Parallel);
        let payoff = parse_payoff_expression("max(S - 95, 0)").unwrap();

        let run = |threads: usize| {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build()
                .unwrap();
            pool.install(|| {
                MonteCarloPricer::new(config.clone())
                    .unwrap()
                    .price(GbmParams::default(), &payoff)
                    .unwrap()
            })
        };

        assert_eq!(run(1).price.to_bits(), run(4).price.to_bits());
    }

    #[test]
    fn test_single_batch_parallel_uses_first_substream() {
        let n_paths = 100;
        let gbm = GbmParams::default();
        let payoff = OptionSpec::call(100.0, 1.0).unwrap();

        let parallel = MonteCarloPricer::new(seeded_config(n_paths, 5, ExecutionMode::Parallel))
            .unwrap()
            .price(gbm, &payoff)
            .unwrap();

        let stepper = GbmStepper::new(gbm, 5);
        let mut rng = PricerRng::from_seed(42).substream(0);
        let expected = simulate(&stepper, &mut rng, n_paths, &payoff)
            .unwrap()
            .into_result(gbm.discount_factor());

        assert_eq!(parallel.price.to_bits(), expected.price.to_bits());
    }

    #[test]
    fn test_parallel_converges_to_sequential() {
        let payoff = OptionSpec::call(100.0, 1.0).unwrap();
        let seq = MonteCarloPricer::new(seeded_config(40_000, 1, ExecutionMode::Sequential))
            .unwrap()
            .price(GbmParams::default(), &payoff)
            .unwrap();
        let par = MonteCarloPricer::new(seeded_config(40_000, 1, ExecutionMode::Parallel))
            .unwrap()
            .price(GbmParams::default(), &payoff)
            .unwrap();

        let tolerance = 4.0 * (seq.std_error + par.std_error);
        assert!((seq.price - par.price).abs() < tolerance);
    }

    #[test]
    fn test_payoff_error_aborts_run() {
        let pricer =
            MonteCarloPricer::new(seeded_config(100, 5, ExecutionMode::Sequential)).unwrap();
        let payoff = parse_payoff_expression("S / (S - S)").unwrap();

        let err = pricer.price(GbmParams::default(), &payoff).unwrap_err();
        assert_eq!(
            err,
            PricingError::PayoffEvaluation("division by zero".to_string())
        );
    }

    #[test]
    fn test_payoff_error_aborts_parallel_run() {
        let pricer = MonteCarloPricer::new(seeded_config(100, 5, ExecutionMode::Parallel)).unwrap();
        let payoff = parse_payoff_expression("undefined_name").unwrap();

        assert!(matches!(
            pricer.price(GbmParams::default(), &payoff),
            Err(PricingError::PayoffEvaluation(_))
        ));
    }

    #[test]
    fn test_invalid_gbm_rejected_before_simulation() {
        let pricer =
            MonteCarloPricer::new(seeded_config(100, 5, ExecutionMode::Sequential)).unwrap();
        let payoff = parse_payoff_expression("S").unwrap();
        let gbm = GbmParams::new(100.0, 0.05, 0.2, -1.0);

        assert_eq!(
            pricer.price(gbm, &payoff).unwrap_err().field(),
            Some("maturity")
        );
    }

    #[test]
    fn test_single_path_has_zero_std_error() {
        let pricer = MonteCarloPricer::new(seeded_config(1, 3, ExecutionMode::Sequential)).unwrap();
        let payoff = parse_payoff_expression("S").unwrap();
        let result = pricer.price(GbmParams::default(), &payoff).unwrap();
        assert_eq!(result.std_error, 0.0);
        assert!(result.price > 0.0);
    }

    #[test]
    fn test_constant_payoff_is_discounted_exactly() {
        let payoff = parse_payoff_expression("10").unwrap();
        let price = monte_carlo_price(100.0, 0.05, 0.2, 2.0, 3, 500, &payoff, Some(1)).unwrap();
        assert_relative_eq!(price, 10.0 * (-0.1_f64).exp(), epsilon = 1e-12);
    }

    #[test]
    fn test_monte_carlo_price_matches_engine() {
        let payoff = parse_payoff_expression("max(S - 100, 0)").unwrap();
        let price = monte_carlo_price(100.0, 0.05, 0.2, 1.0, 10, 1_000, &payoff, Some(42)).unwrap();

        let engine = MonteCarloPricer::new(seeded_config(1_000, 10, ExecutionMode::Sequential))
            .unwrap()
            .price(GbmParams::default(), &payoff)
            .unwrap();

        assert_eq!(price.to_bits(), engine.price.to_bits());
    }

    #[test]
    fn test_monte_carlo_price_validation_order() {
        let payoff = parse_payoff_expression("S").unwrap();
        let cases: [(f64, f64, f64, f64, usize, usize, &str); 7] = [
            (0.0, 0.05, 0.0, 0.0, 0, 0, "spot"),
            (100.0, 0.05, -0.2, 0.0, 0, 0, "volatility"),
            (100.0, 0.05, 0.2, 0.0, 0, 0, "maturity"),
            (100.0, 0.05, 0.2, 1.0, 0, 0, "steps"),
            (100.0, 0.05, 0.2, 1.0, 10, 0, "paths"),
            (100.0, f64::NAN, 0.2, 1.0, 10, 10, "rate"),
            (f64::INFINITY, 0.05, 0.2, 1.0, 10, 10, "spot"),
        ];
        for (spot, rate, vol, maturity, steps, paths, field) in cases {
            let err =
                monte_carlo_price(spot, rate, vol, maturity, steps, paths, &payoff, Some(1))
                    .unwrap_err();
            assert_eq!(err.field(), Some(field), "case {:?}", field);
        }
    }

    #[test]
    fn test_oversized_step_count_is_an_error() {
        let payoff = parse_payoff_expression("S").unwrap();
        for steps in [usize::MAX, pricer_core::types::MAX_STEP_COUNT + 1] {
            let err = monte_carlo_price(100.0, 0.05, 0.2, 1.0, steps, 1, &payoff, Some(1))
                .unwrap_err();
            assert!(
                matches!(err, PricingError::InvalidInput { field: "steps", .. }),
                "expected InvalidInput(steps) for {}, got {:?}",
                steps,
                err
            );
        }
    }

    #[test]
    fn test_pricing_result_confidence() {
        let result = PricingResult {
            price: 10.0,
            std_error: 0.1,
            n_paths: 100,
        };
        assert_relative_eq!(result.confidence_95(), 0.196, epsilon = 1e-12);
    }
}
