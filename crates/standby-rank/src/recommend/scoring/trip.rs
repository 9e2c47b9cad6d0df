use serde::{Deserialize, Serialize};

/// Every term that went into a trip score, enough to recompute it offline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub formula: String,
    pub return_success_probability: f64,
    pub outbound_margin_bonus: f64,
    pub base_weight: f64,
    pub bonus_weight: f64,
    pub trip_score: f64,
}

impl ScoreBreakdown {
    pub fn new(
        return_success_probability: f64,
        outbound_margin_bonus: f64,
        base_weight: f64,
        bonus_weight: f64,
    ) -> Self {
        let trip_score = compute_trip_score(
            return_success_probability,
            outbound_margin_bonus,
            base_weight,
            bonus_weight,
        );

        Self {
            formula: format!(
                "trip_score = return_success_probability * ({base_weight} + {bonus_weight} * outbound_margin_bonus)"
            ),
            return_success_probability,
            outbound_margin_bonus,
            base_weight,
            bonus_weight,
            trip_score,
        }
    }

    /// Re-run the formula from the recorded terms.
    pub fn recompute(&self) -> f64 {
        compute_trip_score(
            self.return_success_probability,
            self.outbound_margin_bonus,
            self.base_weight,
            self.bonus_weight,
        )
    }
}

/// `p_return * (base_weight + bonus_weight * bonus)`.
///
/// The weights need not sum to one; the score never exceeds
/// `p_return * (base_weight + bonus_weight)`.
pub fn compute_trip_score(
    return_success_probability: f64,
    outbound_margin_bonus: f64,
    base_weight: f64,
    bonus_weight: f64,
) -> f64 {
    return_success_probability * (base_weight + bonus_weight * outbound_margin_bonus)
}
