use chrono::{DateTime, Utc};
use tracing::debug;

use super::domain::{
    DependencyHealth, OutboundPlan, Party, Recommendation, RecommendationSet, ReturnWindow,
    ScoringRequest,
};
use super::ranking::rank_recommendations;
use super::reasons::{derive_reasons, ReasonInputs};
use super::scoring::{
    aggregate_return_success_probability, clamp_probability, EligibilityFilter, ScoringConfig,
    ScoringEngine,
};
use super::seats::SeatRequirementPolicy;
use crate::config::ConfigError;

/// Structural problems with a request, detected before any scoring happens.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InvalidRequest {
    #[error("return window latest ({latest}) must be after earliest ({earliest})")]
    InvertedReturnWindow {
        earliest: DateTime<Utc>,
        latest: DateTime<Utc>,
    },
    #[error("party must include at least one traveler")]
    EmptyParty,
    #[error("outbound flight {flight_id} reports negative open seats ({open_seats})")]
    NegativeOpenSeats { flight_id: String, open_seats: i32 },
    #[error("{field} must be a three-letter IATA code, got '{value}'")]
    InvalidAirportCode { field: &'static str, value: String },
    #[error("lookahead_minutes must be within 1..=180, got {0}")]
    LookaheadOutOfRange(u32),
}

/// Failure modes of a recommendation run.
#[derive(Debug, thiserror::Error)]
pub enum RecommendError {
    #[error(transparent)]
    Invalid(#[from] InvalidRequest),
    #[error("scoring interrupted after {} of {total} outbound candidates", .completed.len())]
    Interrupted {
        /// Recommendations finished before the interruption, unranked.
        completed: Vec<Recommendation>,
        total: usize,
    },
}

impl ReturnWindow {
    pub fn validate(&self) -> Result<(), InvalidRequest> {
        if self.latest <= self.earliest {
            return Err(InvalidRequest::InvertedReturnWindow {
                earliest: self.earliest,
                latest: self.latest,
            });
        }
        Ok(())
    }
}

/// Request-scoped values shared by every candidate of one run.
struct RequestFrame<'a> {
    party: &'a Party,
    window: &'a ReturnWindow,
    seats_required: u32,
    required_buffer_minutes: u32,
    eligibility: EligibilityFilter,
    health: DependencyHealth,
    as_of: Option<DateTime<Utc>>,
}

/// Turns outbound plans into ranked, explained recommendations.
#[derive(Debug, Clone)]
pub struct RecommendationAssembler {
    seat_policy: SeatRequirementPolicy,
    engine: ScoringEngine,
}

impl RecommendationAssembler {
    /// Fails when the scoring configuration is unusable.
    pub fn new(
        seat_policy: SeatRequirementPolicy,
        config: ScoringConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            seat_policy,
            engine: ScoringEngine::new(config),
        })
    }

    pub fn config(&self) -> &ScoringConfig {
        self.engine.config()
    }

    pub fn seat_policy(&self) -> &SeatRequirementPolicy {
        &self.seat_policy
    }

    pub fn seats_required(&self, party: &Party) -> u32 {
        self.seat_policy.seats_required(party)
    }

    pub fn required_buffer(&self, window: &ReturnWindow) -> u32 {
        self.engine.required_buffer(window)
    }

    /// Score and rank every plan in the request.
    pub fn assemble(&self, request: &ScoringRequest) -> Result<RecommendationSet, RecommendError> {
        self.assemble_until(request, || false)
    }

    /// Like [`assemble`](Self::assemble), polling `should_stop` before each candidate.
    ///
    /// When it returns `true` the run ends with [`RecommendError::Interrupted`] carrying
    /// the recommendations completed so far. Ranking only ever sees a complete set.
    pub fn assemble_until<F>(
        &self,
        request: &ScoringRequest,
        mut should_stop: F,
    ) -> Result<RecommendationSet, RecommendError>
    where
        F: FnMut() -> bool,
    {
        self.validate(request)?;

        let window = &request.return_window;
        let required_buffer_minutes = self.engine.required_buffer(window);
        let frame = RequestFrame {
            party: &request.party,
            window,
            seats_required: self.seats_required(&request.party),
            required_buffer_minutes,
            eligibility: self.engine.eligibility(window),
            health: request.health,
            as_of: request.as_of,
        };

        let mut completed = Vec::with_capacity(request.plans.len());
        for plan in &request.plans {
            if should_stop() {
                return Err(RecommendError::Interrupted {
                    completed,
                    total: request.plans.len(),
                });
            }

            let seat_margin = plan.outbound.seat_margin(frame.seats_required);
            if seat_margin < 0 && self.config().exclude_negative_margin {
                debug!(
                    flight_id = %plan.outbound.flight_id,
                    seat_margin,
                    "skipping outbound candidate without enough open seats"
                );
                continue;
            }

            completed.push(self.recommend_one(plan, seat_margin, &frame));
        }

        Ok(RecommendationSet {
            seats_required: frame.seats_required,
            required_return_buffer_minutes: frame.required_buffer_minutes,
            fallback_used: frame.health.fallback_used,
            recommendations: rank_recommendations(completed, self.config().tie_epsilon),
        })
    }

    fn validate(&self, request: &ScoringRequest) -> Result<(), InvalidRequest> {
        request.return_window.validate()?;

        if request.party.is_empty() {
            return Err(InvalidRequest::EmptyParty);
        }

        if let Some(plan) = request
            .plans
            .iter()
            .find(|plan| plan.outbound.open_seats_now < 0)
        {
            return Err(InvalidRequest::NegativeOpenSeats {
                flight_id: plan.outbound.flight_id.clone(),
                open_seats: plan.outbound.open_seats_now,
            });
        }

        Ok(())
    }

    fn recommend_one(
        &self,
        plan: &OutboundPlan,
        seat_margin: i64,
        frame: &RequestFrame<'_>,
    ) -> Recommendation {
        let return_options = frame.eligibility.evaluate(&plan.returns);
        let probability_clamped = plan
            .returns
            .iter()
            .any(|priced| clamp_probability(priced.success_probability).out_of_range);

        let eligible = || return_options.iter().filter(|option| option.eligible);
        let eligible_return_count = eligible().count();
        let return_success_probability = aggregate_return_success_probability(
            eligible().map(|option| option.success_probability),
        );

        let mut health = frame.health;
        if let Some(as_of) = frame.as_of {
            health.empties_stale |= self.config().is_stale(plan.outbound.snapshot_time, as_of);
        }

        let score_breakdown = self.engine.score(return_success_probability, seat_margin);
        let reasons = derive_reasons(&ReasonInputs {
            breakdown: &score_breakdown,
            seat_margin,
            eligible_return_count,
            required_buffer_minutes: frame.required_buffer_minutes,
            return_flex_minutes: frame.window.return_flex_minutes,
            probability_clamped,
            health,
            config: self.config(),
        });

        debug!(
            flight_id = %plan.outbound.flight_id,
            party_size = frame.party.len(),
            seat_margin,
            eligible_return_count,
            return_success_probability,
            trip_score = score_breakdown.trip_score,
            "scored outbound candidate"
        );

        Recommendation {
            outbound: plan.outbound.clone(),
            seat_margin,
            return_options,
            eligible_return_count,
            trip_score: score_breakdown.trip_score,
            score_breakdown,
            reason_codes: reasons.codes,
            explanations: reasons.explanations,
        }
    }
}
