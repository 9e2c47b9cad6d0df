use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::Value;

use crate::recommend::domain::{
    AgeBucket, OutboundCandidate, OutboundPlan, Party, PricedReturn, Recommendation,
    ReturnCandidate, ReturnWindow, ScoringRequest, Traveler,
};
use crate::recommend::probability::{ProbabilityContext, ProbabilitySource};
use crate::recommend::scoring::{ScoreBreakdown, ScoringConfig};
use crate::recommend::seats::SeatRequirementPolicy;
use crate::recommend::service::{RecommendRequest, RecommendationService};
use crate::recommend::sources::{
    EmptiesSnapshot, EmptiesSource, FixedClock, OutboundQuery, ReturnQuery, ScheduleSource,
    SourceError,
};
use crate::recommend::RecommendationAssembler;

pub(super) fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0)
        .single()
        .expect("valid timestamp")
}

/// Minutes after [`base_time`].
pub(super) fn at(minutes: i64) -> DateTime<Utc> {
    base_time() + Duration::minutes(minutes)
}

pub(super) fn adults(count: usize) -> Party {
    Party::from_buckets(&vec![AgeBucket::Adult; count])
}

/// Return window from +4h to +12h after [`base_time`].
pub(super) fn window(return_flex_minutes: i64) -> ReturnWindow {
    ReturnWindow {
        earliest: at(240),
        latest: at(720),
        return_flex_minutes,
    }
}

pub(super) fn outbound(flight_id: &str, open_seats_now: i32, departs_in: i64) -> OutboundCandidate {
    OutboundCandidate {
        flight_id: flight_id.to_string(),
        departure_time: at(departs_in),
        arrival_time: at(departs_in + 90),
        open_seats_now,
        snapshot_time: base_time(),
    }
}

pub(super) fn return_flight(flight_id: &str, arrives_at: i64) -> ReturnCandidate {
    ReturnCandidate {
        flight_id: flight_id.to_string(),
        departure_time: at(arrives_at - 90),
        arrival_time: at(arrives_at),
        open_seats_now: Some(4),
        capacity: Some(150),
    }
}

pub(super) fn priced(flight_id: &str, arrives_at: i64, success_probability: f64) -> PricedReturn {
    PricedReturn {
        candidate: return_flight(flight_id, arrives_at),
        success_probability,
    }
}

pub(super) fn plan(outbound: OutboundCandidate, returns: Vec<PricedReturn>) -> OutboundPlan {
    OutboundPlan { outbound, returns }
}

pub(super) fn scoring_request(
    party: Party,
    return_window: ReturnWindow,
    plans: Vec<OutboundPlan>,
) -> ScoringRequest {
    ScoringRequest {
        party,
        return_window,
        plans,
        health: Default::default(),
        as_of: None,
    }
}

pub(super) fn assembler() -> RecommendationAssembler {
    RecommendationAssembler::new(SeatRequirementPolicy::default(), ScoringConfig::default())
        .expect("default config is valid")
}

/// Ranking fixture with a hand-picked score.
pub(super) fn scored(
    flight_id: &str,
    trip_score: f64,
    return_success_probability: f64,
    seat_margin: i64,
    departs_in: i64,
) -> Recommendation {
    let mut breakdown = ScoreBreakdown::new(return_success_probability, 0.5, 0.7, 0.3);
    breakdown.trip_score = trip_score;
    Recommendation {
        outbound: outbound(flight_id, 10, departs_in),
        seat_margin,
        return_options: Vec::new(),
        eligible_return_count: 0,
        score_breakdown: breakdown,
        trip_score,
        reason_codes: Vec::new(),
        explanations: Vec::new(),
    }
}

pub(super) fn flight_ids(recommendations: &[Recommendation]) -> Vec<&str> {
    recommendations
        .iter()
        .map(|recommendation| recommendation.outbound.flight_id.as_str())
        .collect()
}

#[derive(Default)]
pub(super) struct MemoryEmpties {
    pub(super) snapshot: Option<EmptiesSnapshot>,
    pub(super) failing: bool,
    pub(super) queries: Mutex<Vec<OutboundQuery>>,
}

impl MemoryEmpties {
    pub(super) fn with_flights(flights: Vec<OutboundCandidate>) -> Self {
        Self {
            snapshot: Some(EmptiesSnapshot {
                snapshot_time: base_time(),
                flights,
                is_stale: false,
            }),
            ..Self::default()
        }
    }
}

impl EmptiesSource for MemoryEmpties {
    fn outbound_snapshot(
        &self,
        query: &OutboundQuery,
    ) -> Result<Option<EmptiesSnapshot>, SourceError> {
        self.queries.lock().expect("lock").push(query.clone());
        if self.failing {
            return Err(SourceError::Timeout(500));
        }
        Ok(self.snapshot.clone())
    }
}

#[derive(Default)]
pub(super) struct MemorySchedule {
    pub(super) flights: Option<Vec<ReturnCandidate>>,
    pub(super) queries: Mutex<Vec<ReturnQuery>>,
}

impl MemorySchedule {
    pub(super) fn with_flights(flights: Vec<ReturnCandidate>) -> Self {
        Self {
            flights: Some(flights),
            ..Self::default()
        }
    }
}

impl ScheduleSource for MemorySchedule {
    fn return_flights(
        &self,
        query: &ReturnQuery,
    ) -> Result<Option<Vec<ReturnCandidate>>, SourceError> {
        self.queries.lock().expect("lock").push(query.clone());
        Ok(self.flights.clone())
    }
}

/// Model stand-in returning the same estimate for every flight.
pub(super) struct ConstantModel(pub(super) f64);

impl ProbabilitySource for ConstantModel {
    fn estimate(
        &self,
        _candidate: &ReturnCandidate,
        _party: &Party,
        _context: &ProbabilityContext,
    ) -> f64 {
        self.0
    }
}

pub(super) fn recommend_request() -> RecommendRequest {
    RecommendRequest {
        request_id: "req-1".to_string(),
        origin: "SFO".to_string(),
        destination: "LAX".to_string(),
        lookahead_minutes: 60,
        return_window: window(0),
        travelers: vec![Traveler::new(AgeBucket::Adult); 2],
    }
}

pub(super) fn build_service(
    empties: MemoryEmpties,
    schedule: MemorySchedule,
) -> (
    RecommendationService<MemoryEmpties, MemorySchedule>,
    Arc<MemoryEmpties>,
    Arc<MemorySchedule>,
) {
    let empties = Arc::new(empties);
    let schedule = Arc::new(schedule);
    let service = RecommendationService::new(empties.clone(), schedule.clone(), assembler())
        .with_clock(Arc::new(FixedClock(base_time())));
    (service, empties, schedule)
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
