use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{OutboundCandidate, ReturnCandidate};

/// Seat-availability ("empties") snapshot for outbound flights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmptiesSnapshot {
    pub snapshot_time: DateTime<Utc>,
    pub flights: Vec<OutboundCandidate>,
    #[serde(default)]
    pub is_stale: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundQuery {
    pub origin: String,
    pub destination: String,
    pub lookahead_minutes: u32,
    pub now: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReturnQuery {
    pub origin: String,
    pub destination: String,
    pub earliest: DateTime<Utc>,
    pub latest: DateTime<Utc>,
}

/// Seat-availability collaborator. `Ok(None)` means no snapshot could be produced.
pub trait EmptiesSource: Send + Sync {
    fn outbound_snapshot(
        &self,
        query: &OutboundQuery,
    ) -> Result<Option<EmptiesSnapshot>, SourceError>;
}

/// Flight-schedule collaborator. `Ok(None)` means the schedule is unavailable.
pub trait ScheduleSource: Send + Sync {
    fn return_flights(
        &self,
        query: &ReturnQuery,
    ) -> Result<Option<Vec<ReturnCandidate>>, SourceError>;
}

/// Error enumeration for collaborator failures.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("source unavailable: {0}")]
    Unavailable(String),
    #[error("source timed out after {0} ms")]
    Timeout(u64),
}

/// Injectable notion of "now" so runs can be replayed exactly.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
