use chrono::{DateTime, Utc};

use super::domain::{Party, ReturnCandidate};

pub const BASELINE_MODEL_VERSION: &str = "baseline-v1";

/// Request-level facts a probability source may condition on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbabilityContext {
    pub now: DateTime<Utc>,
    pub seats_required: u32,
}

/// Anything able to estimate the chance the party clears standby on a return flight.
///
/// The baseline heuristic and a trained model are interchangeable here; the scoring
/// pipeline only sees the numbers they produce.
pub trait ProbabilitySource: Send + Sync {
    fn estimate(
        &self,
        candidate: &ReturnCandidate,
        party: &Party,
        context: &ProbabilityContext,
    ) -> f64;
}

/// Deterministic rule-of-thumb estimator used whenever no model is available.
#[derive(Debug, Clone, Copy, Default)]
pub struct BaselineHeuristic;

impl ProbabilitySource for BaselineHeuristic {
    fn estimate(
        &self,
        candidate: &ReturnCandidate,
        _party: &Party,
        context: &ProbabilityContext,
    ) -> f64 {
        let hours_to_departure =
            (candidate.departure_time - context.now).num_seconds() as f64 / 3600.0;
        baseline_return_probability(
            context.seats_required,
            candidate.capacity,
            Some(hours_to_departure),
        )
    }
}

const BASELINE_PRIOR: f64 = 0.5;
const PENALTY_PER_SEAT: f64 = 0.05;
const LARGE_AIRCRAFT_SEATS: u32 = 100;
const LARGE_AIRCRAFT_BONUS: f64 = 0.1;
const ADVANCE_HOURS: f64 = 4.0;
const ADVANCE_BONUS: f64 = 0.1;
const BASELINE_FLOOR: f64 = 0.1;
const BASELINE_CEILING: f64 = 0.9;

/// 0.5, minus 0.05 per seat needed, plus 0.1 for aircraft over 100 seats, plus 0.1 when
/// more than four hours remain before departure; kept within `[0.1, 0.9]`.
pub fn baseline_return_probability(
    seats_required: u32,
    capacity: Option<u32>,
    hours_to_departure: Option<f64>,
) -> f64 {
    let party_penalty = f64::from(seats_required) * PENALTY_PER_SEAT;
    let capacity_bonus = match capacity {
        Some(seats) if seats > LARGE_AIRCRAFT_SEATS => LARGE_AIRCRAFT_BONUS,
        _ => 0.0,
    };
    let advance_bonus = match hours_to_departure {
        Some(hours) if hours > ADVANCE_HOURS => ADVANCE_BONUS,
        _ => 0.0,
    };

    (BASELINE_PRIOR - party_penalty + capacity_bonus + advance_bonus)
        .clamp(BASELINE_FLOOR, BASELINE_CEILING)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn baseline_stays_within_bounds() {
        for (seats, capacity, hours) in [
            (1, None, None),
            (5, None, None),
            (1, Some(50), Some(2.0)),
            (10, Some(200), Some(10.0)),
            (0, Some(300), Some(48.0)),
            (40, None, Some(0.5)),
        ] {
            let p = baseline_return_probability(seats, capacity, hours);
            assert!((0.1..=0.9).contains(&p), "{p} out of bounds");
        }
    }

    #[test]
    fn baseline_never_improves_with_party_size() {
        let probs: Vec<f64> = (1..8)
            .map(|seats| baseline_return_probability(seats, Some(150), Some(4.0)))
            .collect();
        assert!(probs.windows(2).all(|pair| pair[1] <= pair[0]), "{probs:?}");
    }

    #[test]
    fn baseline_applies_capacity_and_advance_bonuses() {
        let plain = baseline_return_probability(2, Some(90), Some(3.0));
        let large = baseline_return_probability(2, Some(150), Some(3.0));
        let early = baseline_return_probability(2, Some(150), Some(6.0));

        assert!((plain - 0.4).abs() < 1e-12);
        assert!((large - 0.5).abs() < 1e-12);
        assert!((early - 0.6).abs() < 1e-12);
    }

    #[test]
    fn heuristic_measures_lead_time_from_context_now() {
        let now = Utc.with_ymd_and_hms(2026, 1, 15, 8, 0, 0).unwrap();
        let candidate = ReturnCandidate {
            flight_id: "AS5001".to_string(),
            departure_time: now + Duration::hours(5),
            arrival_time: now + Duration::hours(7),
            open_seats_now: None,
            capacity: Some(160),
        };
        let party = Party::from_buckets(&[super::super::domain::AgeBucket::Adult]);
        let context = ProbabilityContext {
            now,
            seats_required: 1,
        };

        let p = BaselineHeuristic.estimate(&candidate, &party, &context);
        assert!((p - 0.65).abs() < 1e-12);

        let late = ProbabilityContext {
            now: now + Duration::hours(2),
            ..context
        };
        let p_late = BaselineHeuristic.estimate(&candidate, &party, &late);
        assert!((p_late - 0.55).abs() < 1e-12);
    }
}
