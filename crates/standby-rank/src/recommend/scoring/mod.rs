mod aggregate;
mod buffer;
mod config;
mod eligibility;
mod margin;
mod trip;

pub use aggregate::{aggregate_return_success_probability, clamp_probability, ClampedProbability};
pub use buffer::required_buffer_minutes;
pub use config::ScoringConfig;
pub use eligibility::EligibilityFilter;
pub use margin::outbound_margin_bonus;
pub use trip::{compute_trip_score, ScoreBreakdown};

use super::domain::ReturnWindow;

/// Stateless scorer applying one configuration to every candidate of a request.
#[derive(Debug, Clone)]
pub struct ScoringEngine {
    config: ScoringConfig,
}

impl ScoringEngine {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    pub fn required_buffer(&self, window: &ReturnWindow) -> u32 {
        required_buffer_minutes(window.return_flex_minutes, self.config.buffer_max_minutes)
    }

    pub fn eligibility(&self, window: &ReturnWindow) -> EligibilityFilter {
        EligibilityFilter::new(window.latest, self.required_buffer(window))
    }

    pub fn score(&self, return_success_probability: f64, seat_margin: i64) -> ScoreBreakdown {
        ScoreBreakdown::new(
            return_success_probability,
            outbound_margin_bonus(seat_margin),
            self.config.base_weight,
            self.config.bonus_weight,
        )
    }
}
