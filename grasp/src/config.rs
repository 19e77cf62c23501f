use anyhow::{Result, ensure};
use curenest::io::svg::SvgDrawOptions;
use serde::{Deserialize, Serialize};

/// Configuration for the GRASP optimizer
#[derive(Debug, Serialize, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct GraspConfig {
    /// Seed for the PRNG. If undefined, the algorithm will run in non-deterministic mode using entropy
    pub prng_seed: Option<u64>,
    /// Number of randomized reconstructions per autoclave, on top of the deterministic first construction
    pub n_restarts: usize,
    /// Standard deviation of the multiplicative noise applied to the area key during restarts
    pub perturbation_stddev: f64,
    /// Fraction of an autoclave's area the distributor assumes can be covered by tools
    pub area_fill_target: f64,
    pub time_budget: TimeBudgetConfig,
    /// Fraction of the time budget available to the ground level construction
    pub level_0_share: f64,
    /// Fraction of the time budget available to the raised levels, after the ground level
    pub level_1_share: f64,
    /// Upper bound on the number of full compaction sweeps per autoclave
    pub max_compaction_sweeps: usize,
    /// Offer tools left out of their autoclave to the other autoclaves running the same cure cycle
    pub cross_bin_retry: bool,
    /// Optional SVG drawing options
    pub svg_draw_options: SvgDrawOptions,
}

/// Wall-clock budget of a solve.
/// `base_ms + per_item_bin_ms × #items × #autoclaves`, times 1.5 when raised levels are in use, capped at `max_ms`.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct TimeBudgetConfig {
    pub base_ms: f64,
    pub per_item_bin_ms: f64,
    pub max_ms: f64,
    /// Replaces the computed budget entirely
    pub override_ms: Option<f64>,
}

impl Default for GraspConfig {
    fn default() -> Self {
        Self {
            prng_seed: Some(0),
            n_restarts: 8,
            perturbation_stddev: 0.15,
            area_fill_target: 0.85,
            time_budget: TimeBudgetConfig::default(),
            level_0_share: 0.7,
            level_1_share: 0.15,
            max_compaction_sweeps: 16,
            cross_bin_retry: false,
            svg_draw_options: SvgDrawOptions::default(),
        }
    }
}

impl Default for TimeBudgetConfig {
    fn default() -> Self {
        Self {
            base_ms: 1_000.0,
            per_item_bin_ms: 5.0,
            max_ms: 30_000.0,
            override_ms: None,
        }
    }
}

impl TimeBudgetConfig {
    pub fn budget_ms(&self, n_items: usize, n_bins: usize, two_level: bool) -> f64 {
        if let Some(override_ms) = self.override_ms {
            return override_ms;
        }
        let factor = if two_level { 1.5 } else { 1.0 };
        let scaled = self.base_ms + self.per_item_bin_ms * (n_items * n_bins) as f64 * factor;
        f64::min(scaled, self.max_ms)
    }
}

impl GraspConfig {
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.perturbation_stddev.is_finite() && self.perturbation_stddev >= 0.0,
            "perturbation_stddev must be a non-negative number, got {}",
            self.perturbation_stddev
        );
        ensure!(
            self.area_fill_target > 0.0 && self.area_fill_target <= 1.0,
            "area_fill_target must lie in (0, 1], got {}",
            self.area_fill_target
        );
        ensure!(
            self.level_0_share >= 0.0
                && self.level_1_share >= 0.0
                && self.level_0_share + self.level_1_share <= 1.0,
            "level shares must be non-negative and sum to at most 1, got {} and {}",
            self.level_0_share,
            self.level_1_share
        );
        let tb = &self.time_budget;
        ensure!(
            [tb.base_ms, tb.per_item_bin_ms, tb.max_ms]
                .iter()
                .chain(tb.override_ms.iter())
                .all(|ms| *ms >= 0.0),
            "time budget values must be non-negative: {tb:?}"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn budget_scales_with_instance_size() {
        let tb = TimeBudgetConfig {
            base_ms: 100.0,
            per_item_bin_ms: 2.0,
            max_ms: 10_000.0,
            override_ms: None,
        };
        assert_eq!(tb.budget_ms(10, 3, false), 160.0);
        assert_eq!(tb.budget_ms(10, 3, true), 190.0);
        assert_eq!(tb.budget_ms(10_000, 3, true), 10_000.0);
    }

    #[test]
    fn override_replaces_budget() {
        let tb = TimeBudgetConfig {
            override_ms: Some(0.0),
            ..Default::default()
        };
        assert_eq!(tb.budget_ms(100, 100, true), 0.0);
    }

    #[test]
    fn partial_config_falls_back_to_defaults() {
        let config: GraspConfig =
            serde_json::from_str(r#"{"n_restarts": 2, "time_budget": {"max_ms": 50.0}}"#)
                .expect("valid config");
        assert_eq!(config.n_restarts, 2);
        assert_eq!(config.time_budget.max_ms, 50.0);
        assert_eq!(config.time_budget.base_ms, 1_000.0);
        assert_eq!(config.prng_seed, Some(0));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn invalid_shares_are_rejected() {
        let config = GraspConfig {
            level_0_share: 0.9,
            level_1_share: 0.2,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
