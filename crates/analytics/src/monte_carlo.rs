//! Bootstrap stress test of the strategy's total return.
//!
//! Each path draws as many growth factors as there are trades, uniformly and
//! with replacement from the observed factors, and compounds them. The
//! spread of the simulated total returns shows how much of the realized
//! result depends on the particular sequence of trades.

use crate::error::AnalyticsError;
use crate::stats;
use configuration::MonteCarloConfig;
use rand::SeedableRng;
use rand::distributions::{Distribution, Uniform};
use rand::rngs::StdRng;
use serde::Serialize;
use tracing::{debug, info};

/// Summary of the simulated total-return distribution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonteCarloResult {
    pub simulations: usize,
    /// Draws per path (the trade count).
    pub sample_size: usize,
    /// 1st percentile of the simulated total returns.
    pub p1: f64,
    /// 5th percentile of the simulated total returns.
    pub p5: f64,
    pub median: f64,
    pub mean: f64,
    /// Share of paths that end below the starting equity.
    pub prob_loss: f64,
    /// Every simulated total return, in simulation order.
    #[serde(skip)]
    pub outcomes: Vec<f64>,
}

#[derive(Debug, Clone)]
pub struct MonteCarloSimulator {
    config: MonteCarloConfig,
}

impl MonteCarloSimulator {
    pub fn new(config: MonteCarloConfig) -> Self {
        Self { config }
    }

    /// Runs the configured number of resampled paths over `factors`.
    ///
    /// With a fixed seed the result is identical for identical input.
    pub fn run(&self, factors: &[f64]) -> Result<MonteCarloResult, AnalyticsError> {
        if factors.is_empty() {
            return Err(AnalyticsError::NotEnoughData(
                "cannot resample an empty set of growth factors".to_string(),
            ));
        }
        if self.config.simulations == 0 {
            return Err(AnalyticsError::InvalidParameter(
                "at least one simulation is required".to_string(),
            ));
        }

        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let index = Uniform::new(0, factors.len());
        let sample_size = factors.len();

        let mut outcomes = Vec::with_capacity(self.config.simulations);
        for _ in 0..self.config.simulations {
            let mut equity = 1.0;
            for _ in 0..sample_size {
                equity *= factors[index.sample(&mut rng)];
            }
            outcomes.push(equity - 1.0);
        }

        let ordered = stats::sorted(&outcomes);
        let quantile = |q: f64| {
            stats::quantile(&ordered, q)
                .ok_or_else(|| AnalyticsError::Calculation("empty simulation output".to_string()))
        };

        let result = MonteCarloResult {
            simulations: self.config.simulations,
            sample_size,
            p1: quantile(0.01)?,
            p5: quantile(0.05)?,
            median: quantile(0.5)?,
            mean: stats::mean(&outcomes).unwrap_or_default(),
            prob_loss: outcomes.iter().filter(|r| **r < 0.0).count() as f64
                / outcomes.len() as f64,
            outcomes,
        };

        debug!(seed = ?self.config.seed, mean = result.mean, "Monte Carlo paths complete.");
        info!(
            simulations = result.simulations,
            p1 = result.p1,
            p5 = result.p5,
            median = result.median,
            "Monte Carlo stress test finished."
        );
        Ok(result)
    }
}
