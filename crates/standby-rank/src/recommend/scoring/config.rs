use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

/// Tunable knobs for scoring, ranking and reason-code thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    pub buffer_max_minutes: u32,
    pub base_weight: f64,
    pub bonus_weight: f64,
    pub tie_epsilon: f64,
    pub min_eligible_returns: usize,
    pub hard_buffer_threshold_minutes: u32,
    pub exclude_negative_margin: bool,
    pub stale_after_minutes: u32,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            buffer_max_minutes: 120,
            base_weight: 0.7,
            bonus_weight: 0.3,
            tie_epsilon: 0.005,
            min_eligible_returns: 2,
            hard_buffer_threshold_minutes: 100,
            exclude_negative_margin: true,
            stale_after_minutes: 15,
        }
    }
}

impl ScoringConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.buffer_max_minutes == 0 {
            return Err(ConfigError::ZeroBufferMax);
        }

        for (name, value) in [
            ("base_weight", self.base_weight),
            ("bonus_weight", self.bonus_weight),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidWeight { name, value });
            }
        }

        if !self.tie_epsilon.is_finite() || self.tie_epsilon < 0.0 {
            return Err(ConfigError::InvalidEpsilon(self.tie_epsilon));
        }

        Ok(())
    }

    /// Seat counts taken at `snapshot_time` are too old to trust at `now`.
    pub fn is_stale(&self, snapshot_time: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        now - snapshot_time > Duration::minutes(i64::from(self.stale_after_minutes))
    }
}
