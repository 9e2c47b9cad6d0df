use chrono::{DateTime, Duration, Utc};

use super::aggregate::clamp_probability;
use crate::recommend::domain::{PricedReturn, ReturnOption};

/// Buffered return deadline for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EligibilityFilter {
    deadline: DateTime<Utc>,
}

impl EligibilityFilter {
    pub fn new(latest: DateTime<Utc>, required_buffer_minutes: u32) -> Self {
        Self {
            deadline: latest - Duration::minutes(i64::from(required_buffer_minutes)),
        }
    }

    pub fn deadline(&self) -> DateTime<Utc> {
        self.deadline
    }

    /// Arriving exactly on the deadline still counts.
    pub fn admits(&self, arrival_time: DateTime<Utc>) -> bool {
        arrival_time <= self.deadline
    }

    /// Flag every candidate, keeping ineligible ones so near misses can be reported.
    pub fn evaluate(&self, returns: &[PricedReturn]) -> Vec<ReturnOption> {
        returns
            .iter()
            .map(|priced| {
                let candidate = &priced.candidate;
                ReturnOption {
                    flight_id: candidate.flight_id.clone(),
                    departure_time: candidate.departure_time,
                    arrival_time: candidate.arrival_time,
                    success_probability: clamp_probability(priced.success_probability).value,
                    eligible: self.admits(candidate.arrival_time),
                }
            })
            .collect()
    }
}
