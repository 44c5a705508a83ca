//! Monte Carlo simulation configuration.
//!
//! This module provides the configuration type and builder for Monte Carlo
//! pricing runs.

use pricer_core::types::{ensure_nonzero_count, ensure_step_count, PricingError};

/// How simulated paths are distributed over threads.
///
/// # Reproducibility
///
/// - `Sequential`: one random stream, paths drawn in order; a fixed seed
///   replays bit-identically
/// - `Parallel`: paths are split into batches of
///   [`PARALLEL_BATCH_SIZE`](super::PARALLEL_BATCH_SIZE); batch `k` draws
///   from sub-stream `k` of the root stream. A fixed seed replays
///   bit-identically whatever the thread count, but the estimate differs
///   from the sequential one
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ExecutionMode {
    /// Single-threaded simulation.
    #[default]
    Sequential,

    /// Batched simulation on the rayon thread pool.
    Parallel,
}

/// Monte Carlo simulation configuration.
///
/// Immutable configuration specifying simulation parameters.
/// Use [`MonteCarloConfigBuilder`] to construct instances.
///
/// # Examples
///
/// ```rust
/// use pricer_pricing::mc::{ExecutionMode, MonteCarloConfig};
///
/// let config = MonteCarloConfig::builder()
///     .n_paths(10_000)
///     .n_steps(252)
///     .mode(ExecutionMode::Parallel)
///     .seed(42)
///     .build()
///     .expect("valid configuration");
///
/// assert_eq!(config.n_paths(), 10_000);
/// assert_eq!(config.n_steps(), 252);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MonteCarloConfig {
    /// Number of simulation paths.
    n_paths: usize,
    /// Number of time steps per path.
    n_steps: usize,
    /// Optional seed for reproducibility.
    seed: Option<u64>,
    /// Thread distribution of the paths.
    mode: ExecutionMode,
}

impl MonteCarloConfig {
    /// Creates a new configuration builder.
    #[inline]
    pub fn builder() -> MonteCarloConfigBuilder {
        MonteCarloConfigBuilder::default()
    }

    /// Returns the number of simulation paths.
    #[inline]
    pub fn n_paths(&self) -> usize {
        self.n_paths
    }

    /// Returns the number of time steps per path.
    #[inline]
    pub fn n_steps(&self) -> usize {
        self.n_steps
    }

    /// Returns the optional seed for reproducibility.
    #[inline]
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Returns the execution mode.
    #[inline]
    pub fn mode(&self) -> ExecutionMode {
        self.mode
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::InvalidInput`] naming `steps` or `paths`
    /// (checked in that order) when either is zero, or when `steps` exceeds
    /// [`MAX_STEP_COUNT`](pricer_core::types::MAX_STEP_COUNT).
    pub fn validate(&self) -> Result<(), PricingError> {
        ensure_step_count("steps", self.n_steps)?;
        ensure_nonzero_count("paths", self.n_paths)?;
        Ok(())
    }
}

/// Builder for [`MonteCarloConfig`].
///
/// # Examples
///
/// ```rust
/// use pricer_pricing::mc::MonteCarloConfig;
///
/// let config = MonteCarloConfig::builder()
///     .n_paths(50_000)
///     .n_steps(252)  // Daily steps for 1 year
///     .seed(12345)
///     .build()
///     .expect("valid config");
/// ```
#[derive(Clone, Debug, Default)]
pub struct MonteCarloConfigBuilder {
    n_paths: Option<usize>,
    n_steps: Option<usize>,
    seed: Option<u64>,
    mode: ExecutionMode,
}

impl MonteCarloConfigBuilder {
    /// Sets the number of simulation paths (at least 1).
    #[inline]
    pub fn n_paths(mut self, n_paths: usize) -> Self {
        self.n_paths = Some(n_paths);
        self
    }

    /// Sets the number of time steps per path (at least 1).
    #[inline]
    pub fn n_steps(mut self, n_steps: usize) -> Self {
        self.n_steps = Some(n_steps);
        self
    }

    /// Sets the seed for reproducibility.
    ///
    /// Without a seed every run draws a fresh seed from OS entropy.
    #[inline]
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Sets the execution mode.
    #[inline]
    pub fn mode(mut self, mode: ExecutionMode) -> Self {
        self.mode = mode;
        self
    }

    /// Builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::InvalidInput`] if `n_steps` or `n_paths` is
    /// missing or zero.
    pub fn build(self) -> Result<MonteCarloConfig, PricingError> {
        let n_steps = self
            .n_steps
            .ok_or_else(|| PricingError::invalid_input("steps", "must be specified"))?;

        let n_paths = self
            .n_paths
            .ok_or_else(|| PricingError::invalid_input("paths", "must be specified"))?;

        let config = MonteCarloConfig {
            n_paths,
            n_steps,
            seed: self.seed,
            mode: self.mode,
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder_valid() {
        let config = MonteCarloConfig::builder()
            .n_paths(10_000)
            .n_steps(252)
            .build()
            .unwrap();

        assert_eq!(config.n_paths(), 10_000);
        assert_eq!(config.n_steps(), 252);
        assert_eq!(config.mode(), ExecutionMode::Sequential);
        assert_eq!(config.seed(), None);
    }

    #[test]
    fn test_config_builder_with_seed_and_mode() {
        let config = MonteCarloConfig::builder()
            .n_paths(1000)
            .n_steps(100)
            .seed(42)
            .mode(ExecutionMode::Parallel)
            .build()
            .unwrap();

        assert_eq!(config.seed(), Some(42));
        assert_eq!(config.mode(), ExecutionMode::Parallel);
    }

    #[test]
    fn test_config_invalid_zero_paths() {
        let result = MonteCarloConfig::builder().n_paths(0).n_steps(100).build();

        assert!(matches!(
            result,
            Err(PricingError::InvalidInput { field: "paths", .. })
        ));
    }

    #[test]
    fn test_config_invalid_zero_steps() {
        let result = MonteCarloConfig::builder().n_paths(1000).n_steps(0).build();

        assert!(matches!(
            result,
            Err(PricingError::InvalidInput { field: "steps", .. })
        ));
    }

    #[test]
    fn test_config_rejects_step_count_above_cap() {
        let result = MonteCarloConfig::builder()
            .n_paths(1)
            .n_steps(usize::MAX)
            .build();
        assert!(matches!(
            result,
            Err(PricingError::InvalidInput { field: "steps", .. })
        ));
    }

    #[test]
    fn test_config_steps_checked_before_paths() {
        let result = MonteCarloConfig::builder().n_paths(0).n_steps(0).build();

        assert!(matches!(
            result,
            Err(PricingError::InvalidInput { field: "steps", .. })
        ));
    }

    #[test]
    fn test_config_missing_paths() {
        let result = MonteCarloConfig::builder().n_steps(100).build();

        assert!(matches!(
            result,
            Err(PricingError::InvalidInput { field: "paths", .. })
        ));
    }

    #[test]
    fn test_config_missing_steps() {
        let result = MonteCarloConfig::builder().n_paths(1000).build();

        assert!(matches!(
            result,
            Err(PricingError::InvalidInput { field: "steps", .. })
        ));
    }

    #[test]
    fn test_execution_mode_default() {
        assert_eq!(ExecutionMode::default(), ExecutionMode::Sequential);
    }
}
