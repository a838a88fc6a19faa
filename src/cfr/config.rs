//! Configuration and statistics for the MCCFR trainer.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SolverError};

/// Configuration for the MCCFR trainer.
///
/// # Example
/// ```
/// use aof_solver::cfr::TrainerConfig;
///
/// let config = TrainerConfig::default().with_seed(42);
/// assert_eq!(config.seed, Some(42));
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainerConfig {
    /// Random seed for reproducibility.
    ///
    /// If `None`, the trainer seeds itself from OS entropy.
    pub seed: Option<u64>,

    /// Worker threads for `train_parallel`.
    ///
    /// `None` uses rayon's global pool (all available cores).
    pub num_threads: Option<usize>,

    /// Base hands per parallel batch.
    pub batch_size: usize,

    /// Iterations between progress reports and utility history points.
    pub log_interval: u64,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            seed: None,
            num_threads: None,
            batch_size: 64,
            log_interval: 10_000,
        }
    }
}

impl TrainerConfig {
    /// Create a TrainerConfig with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Builder method: set number of threads.
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.num_threads = Some(threads);
        self
    }

    /// Builder method: set parallel batch size.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Builder method: set progress interval.
    pub fn with_log_interval(mut self, interval: u64) -> Self {
        self.log_interval = interval;
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(SolverError::Configuration(
                "batch size must be at least 1".into(),
            ));
        }
        if self.log_interval == 0 {
            return Err(SolverError::Configuration(
                "log interval must be at least 1".into(),
            ));
        }
        if self.num_threads == Some(0) {
            return Err(SolverError::Configuration(
                "thread count must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Statistics tracked during training.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainingStats {
    /// Total number of iterations completed.
    pub iterations: u64,

    /// Number of unique information sets discovered.
    pub info_sets: usize,

    /// Total time spent training (in seconds).
    pub elapsed_seconds: f64,

    /// Iterations per second.
    pub iterations_per_second: f64,

    /// Running mean of exact utilities, one per player.
    pub average_utilities: Vec<f64>,

    /// Mean of |average utility| over players.
    ///
    /// Exact utilities are zero-sum in an unraked game, so this measures
    /// how far the running mean still is from its target.
    pub mean_absolute_error: f64,

    /// Convergence indicator from the latest check, if any.
    pub convergence_indicator: Option<f64>,

    /// Utility snapshots taken at each progress interval.
    pub history: Vec<UtilityPoint>,
}

/// Average utilities at a specific iteration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UtilityPoint {
    /// Iteration number when this snapshot was taken.
    pub iteration: u64,
    /// Running mean of exact utilities per player.
    pub average_utilities: Vec<f64>,
    /// Mean absolute utility error at this point.
    pub mean_absolute_error: f64,
}

impl TrainingStats {
    /// Create new empty stats.
    pub fn new() -> Self {
        Self::default()
    }

    /// Update iterations per second based on elapsed time.
    pub fn update_rate(&mut self) {
        if self.elapsed_seconds > 0.0 {
            self.iterations_per_second = self.iterations as f64 / self.elapsed_seconds;
        }
    }

    /// Recompute average utilities from running sums.
    pub fn update_utilities(&mut self, utility_sum: &[f64]) {
        let n = self.iterations.max(1) as f64;
        self.average_utilities = utility_sum.iter().map(|u| u / n).collect();
        self.mean_absolute_error = if self.average_utilities.is_empty() {
            0.0
        } else {
            self.average_utilities.iter().map(|u| u.abs()).sum::<f64>()
                / self.average_utilities.len() as f64
        };
    }

    /// Append the current utilities to the history.
    pub fn record_point(&mut self) {
        self.history.push(UtilityPoint {
            iteration: self.iterations,
            average_utilities: self.average_utilities.clone(),
            mean_absolute_error: self.mean_absolute_error,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TrainerConfig::default();
        assert_eq!(config.seed, None);
        assert_eq!(config.batch_size, 64);
        assert_eq!(config.log_interval, 10_000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_and_validation() {
        let config = TrainerConfig::new()
            .with_seed(7)
            .with_threads(2)
            .with_batch_size(16)
            .with_log_interval(100);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.num_threads, Some(2));
        assert!(config.validate().is_ok());

        assert!(TrainerConfig::new().with_batch_size(0).validate().is_err());
        assert!(TrainerConfig::new().with_log_interval(0).validate().is_err());
        assert!(TrainerConfig::new().with_threads(0).validate().is_err());
    }

    #[test]
    fn test_config_json() {
        let config = TrainerConfig::new().with_seed(3);
        let json = serde_json::to_string(&config).unwrap();
        let parsed: TrainerConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_stats_utilities() {
        let mut stats = TrainingStats::new();
        stats.iterations = 4;
        stats.update_utilities(&[2.0, -2.0, 4.0, -4.0]);
        assert_eq!(stats.average_utilities, vec![0.5, -0.5, 1.0, -1.0]);
        assert!((stats.mean_absolute_error - 0.75).abs() < 1e-12);

        stats.record_point();
        assert_eq!(stats.history.len(), 1);
        assert_eq!(stats.history[0].iteration, 4);
    }

    #[test]
    fn test_update_rate() {
        let mut stats = TrainingStats::new();
        stats.iterations = 100;
        stats.elapsed_seconds = 2.0;
        stats.update_rate();
        assert_eq!(stats.iterations_per_second, 50.0);
    }
}
