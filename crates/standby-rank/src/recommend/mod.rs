//! Standby trip recommendations: seat requirements, return buffers, probability
//! aggregation, trip scoring, ranking and reason codes, plus the service and HTTP
//! surface that feed them. `eval` scores the baseline heuristic offline.

pub mod assembler;
pub mod domain;
pub mod eval;
pub mod probability;
pub mod ranking;
pub mod reasons;
pub mod router;
pub mod scoring;
pub mod seats;
pub mod service;
pub mod sources;

#[cfg(test)]
mod tests;

pub use assembler::{InvalidRequest, RecommendError, RecommendationAssembler};
pub use domain::{
    AgeBucket, DependencyHealth, OutboundCandidate, OutboundPlan, Party, PricedReturn,
    Recommendation, RecommendationSet, ReturnCandidate, ReturnOption, ReturnWindow,
    ScoringRequest, Traveler,
};
pub use probability::{
    BaselineHeuristic, ProbabilityContext, ProbabilitySource, BASELINE_MODEL_VERSION,
};
pub use ranking::rank_recommendations;
pub use reasons::{ReasonCode, Reasons};
pub use router::recommendation_router;
pub use scoring::{ScoreBreakdown, ScoringConfig, ScoringEngine};
pub use seats::SeatRequirementPolicy;
pub use service::{
    ModelBinding, RecommendRequest, RecommendResponse, RecommendationService, TimingMs,
};
pub use sources::{
    Clock, EmptiesSnapshot, EmptiesSource, FixedClock, OutboundQuery, ReturnQuery,
    ScheduleSource, SourceError, SystemClock,
};
