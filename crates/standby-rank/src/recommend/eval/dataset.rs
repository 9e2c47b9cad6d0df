use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Difficulty band of a labelled standby attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scenario {
    /// Solo traveler, large aircraft, plenty of notice.
    Easy,
    /// Small group, mid-size aircraft, a few hours of notice.
    Medium,
    /// Large group, small aircraft, departing within the hour or two.
    Hard,
}

impl Scenario {
    pub const ALL: [Scenario; 3] = [Scenario::Easy, Scenario::Medium, Scenario::Hard];

    pub fn label(self) -> &'static str {
        match self {
            Scenario::Easy => "easy",
            Scenario::Medium => "medium",
            Scenario::Hard => "hard",
        }
    }

    /// Chance that a generated example of this band is labelled as cleared.
    pub fn clear_rate(self) -> f64 {
        match self {
            Scenario::Easy => 0.8,
            Scenario::Medium => 0.5,
            Scenario::Hard => 0.2,
        }
    }
}

/// One historical (or synthetic) standby attempt with its outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvalExample {
    pub example_id: String,
    pub scenario: Scenario,
    pub seats_required: u32,
    pub capacity: u32,
    pub hours_to_departure: f64,
    pub cleared: bool,
}

/// Synthetic labelled examples split into thirds by scenario; hard takes the remainder.
/// The same `seed` always yields the same dataset.
pub fn generate_dataset(size: usize, seed: u64) -> Vec<EvalExample> {
    let mut rng = StdRng::seed_from_u64(seed);
    let third = size / 3;
    let bands = [
        (Scenario::Easy, third),
        (Scenario::Medium, third),
        (Scenario::Hard, size - 2 * third),
    ];

    let mut examples = Vec::with_capacity(size);
    for (scenario, count) in bands {
        for index in 0..count {
            examples.push(sample(&mut rng, scenario, index));
        }
    }
    examples
}

fn sample(rng: &mut StdRng, scenario: Scenario, index: usize) -> EvalExample {
    let (seats_required, capacity, hours_to_departure): (u32, u32, f64) = match scenario {
        Scenario::Easy => (1, rng.gen_range(150..200), rng.gen_range(4.0..8.0)),
        Scenario::Medium => (
            rng.gen_range(2..=3),
            rng.gen_range(100..130),
            rng.gen_range(2.0..5.0),
        ),
        Scenario::Hard => (
            rng.gen_range(4..=7),
            rng.gen_range(80..100),
            rng.gen_range(1.0..1.5),
        ),
    };

    EvalExample {
        example_id: format!("{}_{index:03}", scenario.label()),
        scenario,
        seats_required,
        capacity,
        hours_to_departure,
        cleared: rng.gen_bool(scenario.clear_rate()),
    }
}
