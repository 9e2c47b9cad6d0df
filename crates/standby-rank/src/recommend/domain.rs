use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::reasons::ReasonCode;
use super::scoring::ScoreBreakdown;

/// Age bucket reported for each traveler. No other personal data enters the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgeBucket {
    Infant,
    Child,
    Adult,
}

impl AgeBucket {
    pub const ALL: [AgeBucket; 3] = [AgeBucket::Infant, AgeBucket::Child, AgeBucket::Adult];

    pub const fn label(self) -> &'static str {
        match self {
            AgeBucket::Infant => "infant",
            AgeBucket::Child => "child",
            AgeBucket::Adult => "adult",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        Self::ALL
            .into_iter()
            .find(|bucket| bucket.label().eq_ignore_ascii_case(raw))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Traveler {
    pub age_bucket: AgeBucket,
}

impl Traveler {
    pub const fn new(age_bucket: AgeBucket) -> Self {
        Self { age_bucket }
    }
}

/// Ordered traveling party.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Party {
    travelers: Vec<Traveler>,
}

impl Party {
    pub fn new(travelers: Vec<Traveler>) -> Self {
        Self { travelers }
    }

    pub fn from_buckets(buckets: &[AgeBucket]) -> Self {
        Self::new(buckets.iter().copied().map(Traveler::new).collect())
    }

    pub fn travelers(&self) -> &[Traveler] {
        &self.travelers
    }

    pub fn len(&self) -> usize {
        self.travelers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.travelers.is_empty()
    }
}

/// When the party needs to be back, and how much slack they can tolerate.
///
/// `return_flex_minutes == 0` is a hard deadline. Negative values are accepted and
/// treated as zero by the buffer calculation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnWindow {
    pub earliest: DateTime<Utc>,
    pub latest: DateTime<Utc>,
    pub return_flex_minutes: i64,
}

/// Outbound flight as seen in a seat-availability snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundCandidate {
    pub flight_id: String,
    pub departure_time: DateTime<Utc>,
    pub arrival_time: DateTime<Utc>,
    pub open_seats_now: i32,
    pub snapshot_time: DateTime<Utc>,
}

impl OutboundCandidate {
    pub fn seat_margin(&self, seats_required: u32) -> i64 {
        i64::from(self.open_seats_now) - i64::from(seats_required)
    }
}

/// Scheduled return flight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnCandidate {
    pub flight_id: String,
    pub departure_time: DateTime<Utc>,
    pub arrival_time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open_seats_now: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity: Option<u32>,
}

/// A return candidate paired with the success probability a probability source
/// assigned to it. The value is taken as given; the engine clamps it on use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricedReturn {
    pub candidate: ReturnCandidate,
    pub success_probability: f64,
}

/// One outbound flight and the return flights that could bring the party back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutboundPlan {
    pub outbound: OutboundCandidate,
    pub returns: Vec<PricedReturn>,
}

/// Health of the collaborators that fed this request, relayed into reason codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyHealth {
    pub empties_available: bool,
    pub empties_stale: bool,
    pub fallback_used: bool,
}

impl Default for DependencyHealth {
    fn default() -> Self {
        Self {
            empties_available: true,
            empties_stale: false,
            fallback_used: false,
        }
    }
}

/// Everything the assembler needs to score one request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringRequest {
    pub party: Party,
    pub return_window: ReturnWindow,
    pub plans: Vec<OutboundPlan>,
    #[serde(default)]
    pub health: DependencyHealth,
    /// When set, each outbound flight's own `snapshot_time` is checked for staleness
    /// against this instant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub as_of: Option<DateTime<Utc>>,
}

/// Return flight as reported back to the caller, including near misses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnOption {
    pub flight_id: String,
    pub departure_time: DateTime<Utc>,
    pub arrival_time: DateTime<Utc>,
    pub success_probability: f64,
    pub eligible: bool,
}

/// Scored, explained trip option.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub outbound: OutboundCandidate,
    pub seat_margin: i64,
    pub return_options: Vec<ReturnOption>,
    pub eligible_return_count: usize,
    pub score_breakdown: ScoreBreakdown,
    pub trip_score: f64,
    pub reason_codes: Vec<ReasonCode>,
    pub explanations: Vec<String>,
}

impl Recommendation {
    pub fn return_success_probability(&self) -> f64 {
        self.score_breakdown.return_success_probability
    }

    pub fn has_reason(&self, code: ReasonCode) -> bool {
        self.reason_codes.contains(&code)
    }
}

/// Ranked output plus the request-level values the response envelope needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationSet {
    pub seats_required: u32,
    pub required_return_buffer_minutes: u32,
    pub fallback_used: bool,
    pub recommendations: Vec<Recommendation>,
}
