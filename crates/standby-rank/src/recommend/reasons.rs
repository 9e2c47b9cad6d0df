use std::fmt;

use serde::{Deserialize, Serialize};

use super::domain::DependencyHealth;
use super::scoring::{ScoreBreakdown, ScoringConfig};

pub const HIGH_RETURN_PROBABILITY: f64 = 0.7;
pub const MODERATE_RETURN_PROBABILITY: f64 = 0.4;

/// Stable machine-readable explanation codes. The serialized spelling is part of the
/// public contract; explanation text is not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReasonCode {
    HardBufferApplied,
    NoEligibleReturns,
    LowReturnCoverage,
    MissingEmpties,
    StaleEmpties,
    FallbackBaselineUsed,
    ProbabilityClamped,
    NegativeSeatMargin,
    HighReturnProbability,
    ModerateReturnProbability,
    LowReturnProbability,
}

impl ReasonCode {
    pub const fn as_str(self) -> &'static str {
        match self {
            ReasonCode::HardBufferApplied => "HARD_BUFFER_APPLIED",
            ReasonCode::NoEligibleReturns => "NO_ELIGIBLE_RETURNS",
            ReasonCode::LowReturnCoverage => "LOW_RETURN_COVERAGE",
            ReasonCode::MissingEmpties => "MISSING_EMPTIES",
            ReasonCode::StaleEmpties => "STALE_EMPTIES",
            ReasonCode::FallbackBaselineUsed => "FALLBACK_BASELINE_USED",
            ReasonCode::ProbabilityClamped => "PROBABILITY_CLAMPED",
            ReasonCode::NegativeSeatMargin => "NEGATIVE_SEAT_MARGIN",
            ReasonCode::HighReturnProbability => "HIGH_RETURN_PROBABILITY",
            ReasonCode::ModerateReturnProbability => "MODERATE_RETURN_PROBABILITY",
            ReasonCode::LowReturnProbability => "LOW_RETURN_PROBABILITY",
        }
    }
}

impl fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inputs the rules are evaluated against; the same values used for scoring.
#[derive(Debug, Clone, Copy)]
pub struct ReasonInputs<'a> {
    pub breakdown: &'a ScoreBreakdown,
    pub seat_margin: i64,
    pub eligible_return_count: usize,
    pub required_buffer_minutes: u32,
    pub return_flex_minutes: i64,
    pub probability_clamped: bool,
    pub health: DependencyHealth,
    pub config: &'a ScoringConfig,
}

impl ReasonInputs<'_> {
    fn return_probability(&self) -> f64 {
        self.breakdown.return_success_probability
    }

    fn percent(&self) -> String {
        format!("{:.0}%", self.return_probability() * 100.0)
    }
}

struct ReasonRule {
    code: ReasonCode,
    applies: fn(&ReasonInputs<'_>) -> bool,
    explain: fn(&ReasonInputs<'_>) -> String,
}

/// Evaluated top to bottom; output order follows this table.
const RULES: &[ReasonRule] = &[
    ReasonRule {
        code: ReasonCode::HardBufferApplied,
        applies: |inputs| {
            inputs.required_buffer_minutes >= inputs.config.hard_buffer_threshold_minutes
        },
        explain: |inputs| {
            format!(
                "Strict return deadline ({} min flexibility) requires arriving {} min early",
                inputs.return_flex_minutes.max(0),
                inputs.required_buffer_minutes
            )
        },
    },
    ReasonRule {
        code: ReasonCode::NoEligibleReturns,
        applies: |inputs| inputs.eligible_return_count == 0,
        explain: |_| "No return flight arrives before the buffered deadline".to_string(),
    },
    ReasonRule {
        code: ReasonCode::LowReturnCoverage,
        applies: |inputs| inputs.eligible_return_count < inputs.config.min_eligible_returns,
        explain: |inputs| {
            format!(
                "Few eligible return flights within time window ({} of at least {})",
                inputs.eligible_return_count, inputs.config.min_eligible_returns
            )
        },
    },
    ReasonRule {
        code: ReasonCode::MissingEmpties,
        applies: |inputs| !inputs.health.empties_available,
        explain: |_| "Seat availability data was unavailable".to_string(),
    },
    ReasonRule {
        code: ReasonCode::StaleEmpties,
        applies: |inputs| inputs.health.empties_stale,
        explain: |_| "Seat availability data may be out of date".to_string(),
    },
    ReasonRule {
        code: ReasonCode::FallbackBaselineUsed,
        applies: |inputs| inputs.health.fallback_used,
        explain: |_| "Using baseline estimates (ML model unavailable)".to_string(),
    },
    ReasonRule {
        code: ReasonCode::ProbabilityClamped,
        applies: |inputs| inputs.probability_clamped,
        explain: |_| "Some return estimates were outside 0-100% and were clamped".to_string(),
    },
    ReasonRule {
        code: ReasonCode::NegativeSeatMargin,
        applies: |inputs| inputs.seat_margin < 0,
        explain: |inputs| {
            format!(
                "Outbound flight is short {} open seat(s) for this party",
                inputs.seat_margin.unsigned_abs()
            )
        },
    },
    ReasonRule {
        code: ReasonCode::HighReturnProbability,
        applies: |inputs| inputs.return_probability() >= HIGH_RETURN_PROBABILITY,
        explain: |inputs| {
            format!(
                "High return probability ({}) across {} eligible flight(s)",
                inputs.percent(),
                inputs.eligible_return_count
            )
        },
    },
    ReasonRule {
        code: ReasonCode::ModerateReturnProbability,
        applies: |inputs| {
            (MODERATE_RETURN_PROBABILITY..HIGH_RETURN_PROBABILITY)
                .contains(&inputs.return_probability())
        },
        explain: |inputs| format!("Moderate return probability ({})", inputs.percent()),
    },
    ReasonRule {
        code: ReasonCode::LowReturnProbability,
        applies: |inputs| inputs.return_probability() < MODERATE_RETURN_PROBABILITY,
        explain: |inputs| format!("Limited return options ({} probability)", inputs.percent()),
    },
];

/// Codes with their parallel human-readable explanations.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Reasons {
    pub codes: Vec<ReasonCode>,
    pub explanations: Vec<String>,
}

pub fn derive_reasons(inputs: &ReasonInputs<'_>) -> Reasons {
    let mut reasons = Reasons::default();
    for rule in RULES.iter().filter(|rule| (rule.applies)(inputs)) {
        reasons.codes.push(rule.code);
        reasons.explanations.push((rule.explain)(inputs));
    }
    reasons
}
