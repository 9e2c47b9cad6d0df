use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::assembler::{InvalidRequest, RecommendError, RecommendationAssembler};
use super::domain::{
    DependencyHealth, OutboundPlan, Party, PricedReturn, Recommendation, ReturnCandidate,
    ReturnWindow, ScoringRequest, Traveler,
};
use super::probability::{
    BaselineHeuristic, ProbabilityContext, ProbabilitySource, BASELINE_MODEL_VERSION,
};
use super::sources::{
    Clock, EmptiesSnapshot, EmptiesSource, OutboundQuery, ReturnQuery, ScheduleSource,
    SystemClock,
};

const DEFAULT_LOOKAHEAD_MINUTES: u32 = 60;
const MAX_LOOKAHEAD_MINUTES: u32 = 180;

fn default_lookahead_minutes() -> u32 {
    DEFAULT_LOOKAHEAD_MINUTES
}

/// Inbound request as accepted by the HTTP and CLI surfaces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendRequest {
    pub request_id: String,
    pub origin: String,
    pub destination: String,
    #[serde(default = "default_lookahead_minutes")]
    pub lookahead_minutes: u32,
    pub return_window: ReturnWindow,
    pub travelers: Vec<Traveler>,
}

impl RecommendRequest {
    pub fn validate(&self) -> Result<(), InvalidRequest> {
        for (field, value) in [("origin", &self.origin), ("destination", &self.destination)] {
            if value.len() != 3 || !value.chars().all(|c| c.is_ascii_alphabetic()) {
                return Err(InvalidRequest::InvalidAirportCode {
                    field,
                    value: value.clone(),
                });
            }
        }

        if !(1..=MAX_LOOKAHEAD_MINUTES).contains(&self.lookahead_minutes) {
            return Err(InvalidRequest::LookaheadOutOfRange(self.lookahead_minutes));
        }

        if self.travelers.is_empty() {
            return Err(InvalidRequest::EmptyParty);
        }

        self.return_window.validate()
    }
}

/// Per-stage latency, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TimingMs {
    pub total: u64,
    pub validation: u64,
    pub fetch_outbound: u64,
    pub fetch_return: u64,
    pub scoring: u64,
}

/// Response envelope around the ranked recommendations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendResponse {
    pub request_id: String,
    pub model_version: String,
    pub generated_at: DateTime<Utc>,
    pub seats_required: u32,
    pub required_return_buffer_minutes: u32,
    pub recommendations: Vec<Recommendation>,
    pub fallback_used: bool,
    pub timing_ms: TimingMs,
}

/// A trained predictor plugged in ahead of the baseline heuristic.
#[derive(Clone)]
pub struct ModelBinding {
    pub version: String,
    pub source: Arc<dyn ProbabilitySource>,
}

/// Service composing the data sources, probability source and scoring assembler.
pub struct RecommendationService<E, S> {
    empties: Arc<E>,
    schedule: Arc<S>,
    assembler: Arc<RecommendationAssembler>,
    model: Option<ModelBinding>,
    baseline: BaselineHeuristic,
    clock: Arc<dyn Clock>,
    budget: Option<Duration>,
}

impl<E, S> RecommendationService<E, S>
where
    E: EmptiesSource + 'static,
    S: ScheduleSource + 'static,
{
    pub fn new(empties: Arc<E>, schedule: Arc<S>, assembler: RecommendationAssembler) -> Self {
        Self {
            empties,
            schedule,
            assembler: Arc::new(assembler),
            model: None,
            baseline: BaselineHeuristic,
            clock: Arc::new(SystemClock),
            budget: None,
        }
    }

    pub fn with_model(mut self, model: ModelBinding) -> Self {
        self.model = Some(model);
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Abort scoring once this much time has passed since the request arrived.
    pub fn with_budget(mut self, budget: Duration) -> Self {
        self.budget = Some(budget);
        self
    }

    pub fn assembler(&self) -> &RecommendationAssembler {
        &self.assembler
    }

    /// Fetch data, price return flights, then score and rank every outbound option.
    pub fn recommend(
        &self,
        request: RecommendRequest,
    ) -> Result<RecommendResponse, RecommendError> {
        let started = Instant::now();
        let mut timing = TimingMs::default();

        if let Err(err) = request.validate() {
            record_failure("invalid_request");
            warn!(
                request_id = %request.request_id,
                error = %err,
                "rejected recommendation request"
            );
            return Err(err.into());
        }

        let party = Party::new(request.travelers.clone());
        let seats_required = self.assembler.seats_required(&party);
        let now = self.clock.now();
        timing.validation = elapsed_ms(started);

        let stage = Instant::now();
        let snapshot = self.fetch_outbound(&request, now);
        timing.fetch_outbound = elapsed_ms(stage);
        metrics::histogram!("standby_dependency_latency_ms", "dependency" => "empties")
            .record(timing.fetch_outbound as f64);

        let stage = Instant::now();
        let returns = self.fetch_returns(&request);
        timing.fetch_return = elapsed_ms(stage);
        metrics::histogram!("standby_dependency_latency_ms", "dependency" => "schedule")
            .record(timing.fetch_return as f64);

        let stage = Instant::now();
        let schedule_available = returns.is_some();
        let (source, model_version, fallback_used): (&dyn ProbabilitySource, &str, bool) =
            match &self.model {
                Some(model) if schedule_available => {
                    (model.source.as_ref(), model.version.as_str(), false)
                }
                _ => (
                    &self.baseline as &dyn ProbabilitySource,
                    BASELINE_MODEL_VERSION,
                    true,
                ),
            };

        let health = DependencyHealth {
            empties_available: snapshot.is_some(),
            empties_stale: snapshot
                .as_ref()
                .is_some_and(|snapshot| self.is_stale(snapshot, now)),
            fallback_used,
        };

        let context = ProbabilityContext {
            now,
            seats_required,
        };
        let priced: Vec<PricedReturn> = returns
            .unwrap_or_default()
            .into_iter()
            .map(|candidate| PricedReturn {
                success_probability: source.estimate(&candidate, &party, &context),
                candidate,
            })
            .collect();

        let plans = snapshot
            .map(|snapshot| snapshot.flights)
            .unwrap_or_default()
            .into_iter()
            .map(|outbound| OutboundPlan {
                outbound,
                returns: priced.clone(),
            })
            .collect();

        let scoring_request = ScoringRequest {
            party,
            return_window: request.return_window,
            plans,
            health,
            as_of: Some(now),
        };

        let deadline = self.budget.map(|budget| started + budget);
        let set = match self.assembler.assemble_until(&scoring_request, || {
            deadline.is_some_and(|deadline| Instant::now() >= deadline)
        }) {
            Ok(set) => set,
            Err(err) => {
                record_failure(match err {
                    RecommendError::Invalid(_) => "invalid_request",
                    RecommendError::Interrupted { .. } => "budget_exhausted",
                });
                warn!(
                    request_id = %request.request_id,
                    error = %err,
                    "recommendation run failed"
                );
                return Err(err);
            }
        };
        timing.scoring = elapsed_ms(stage);
        timing.total = elapsed_ms(started);

        let response = RecommendResponse {
            request_id: request.request_id.clone(),
            model_version: model_version.to_string(),
            generated_at: now,
            seats_required: set.seats_required,
            required_return_buffer_minutes: set.required_return_buffer_minutes,
            recommendations: set.recommendations,
            fallback_used: set.fallback_used,
            timing_ms: timing,
        };

        record_success(&response);
        log_predictions(&response, &request);

        Ok(response)
    }

    fn fetch_outbound(
        &self,
        request: &RecommendRequest,
        now: DateTime<Utc>,
    ) -> Option<EmptiesSnapshot> {
        let query = OutboundQuery {
            origin: request.origin.clone(),
            destination: request.destination.clone(),
            lookahead_minutes: request.lookahead_minutes,
            now,
        };

        match self.empties.outbound_snapshot(&query) {
            Ok(snapshot) => snapshot,
            Err(err) => {
                warn!(
                    request_id = %request.request_id,
                    error = %err,
                    "seat availability unavailable"
                );
                None
            }
        }
    }

    fn fetch_returns(&self, request: &RecommendRequest) -> Option<Vec<ReturnCandidate>> {
        let query = ReturnQuery {
            origin: request.destination.clone(),
            destination: request.origin.clone(),
            earliest: request.return_window.earliest,
            latest: request.return_window.latest,
        };

        match self.schedule.return_flights(&query) {
            Ok(flights) => flights,
            Err(err) => {
                warn!(
                    request_id = %request.request_id,
                    error = %err,
                    "return schedule unavailable"
                );
                None
            }
        }
    }

    fn is_stale(&self, snapshot: &EmptiesSnapshot, now: DateTime<Utc>) -> bool {
        let config = self.assembler.config();
        snapshot.is_stale || config.is_stale(snapshot.snapshot_time, now)
    }
}

fn elapsed_ms(since: Instant) -> u64 {
    u64::try_from(since.elapsed().as_millis()).unwrap_or(u64::MAX)
}

fn record_failure(kind: &'static str) {
    metrics::counter!("standby_recommend_errors_total", "kind" => kind).increment(1);
}

fn record_success(response: &RecommendResponse) {
    metrics::counter!("standby_recommend_requests_total").increment(1);
    metrics::histogram!("standby_recommend_latency_ms").record(response.timing_ms.total as f64);
    if response.fallback_used {
        metrics::counter!("standby_fallback_total").increment(1);
    }
    for recommendation in &response.recommendations {
        metrics::histogram!("standby_return_coverage")
            .record(recommendation.eligible_return_count as f64);
    }
}

/// One structured event per recommendation. Only identifiers, counts and scores are
/// logged, never traveler details. List-valued fields are comma separated.
fn log_predictions(response: &RecommendResponse, request: &RecommendRequest) {
    let return_deadline_ts = request.return_window.latest.to_rfc3339();

    for (rank, recommendation) in response.recommendations.iter().enumerate() {
        let reason_codes = join(recommendation.reason_codes.iter().map(|code| code.as_str()));
        let eligible = || {
            recommendation
                .return_options
                .iter()
                .filter(|option| option.eligible)
        };
        let return_flight_ids = join(eligible().map(|option| option.flight_id.as_str()));
        let return_probs = join(
            eligible().map(|option| option.success_probability.to_string()),
        );

        info!(
            request_id = %response.request_id,
            model_version = %response.model_version,
            origin = %request.origin,
            destination = %request.destination,
            lookahead_minutes = request.lookahead_minutes,
            rank = rank + 1,
            seats_required = response.seats_required,
            return_deadline_ts = %return_deadline_ts,
            return_flex_minutes = request.return_window.return_flex_minutes,
            required_return_buffer_minutes = response.required_return_buffer_minutes,
            outbound_flight_id = %recommendation.outbound.flight_id,
            outbound_open_seats_now = recommendation.outbound.open_seats_now,
            outbound_seat_margin = recommendation.seat_margin,
            eligible_return_count = recommendation.eligible_return_count,
            return_flight_ids = %return_flight_ids,
            return_probs = %return_probs,
            return_success_probability = recommendation.score_breakdown.return_success_probability,
            outbound_margin_bonus = recommendation.score_breakdown.outbound_margin_bonus,
            trip_score = recommendation.trip_score,
            fallback_used = response.fallback_used,
            reason_codes = %reason_codes,
            timing_total_ms = response.timing_ms.total,
            "prediction"
        );
    }
}

fn join<I, T>(items: I) -> String
where
    I: IntoIterator<Item = T>,
    T: AsRef<str>,
{
    items
        .into_iter()
        .map(|item| item.as_ref().to_owned())
        .collect::<Vec<_>>()
        .join(",")
}
