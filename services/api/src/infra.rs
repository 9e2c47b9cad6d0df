use chrono::Duration;
use metrics_exporter_prometheus::PrometheusHandle;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use standby_rank::recommend::{
    EmptiesSnapshot, EmptiesSource, OutboundCandidate, OutboundQuery, ReturnCandidate,
    ReturnQuery, ScheduleSource, SourceError,
};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

pub(crate) const DEFAULT_DEMO_SEED: u64 = 42;

const AIRCRAFT_CAPACITIES: [u32; 4] = [76, 128, 150, 180];

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Seat availability generated from a seed and the route, so identical queries
/// always see identical flights.
#[derive(Debug, Clone, Copy)]
pub(crate) struct DemoEmptiesSource {
    seed: u64,
}

impl DemoEmptiesSource {
    pub(crate) fn new(seed: u64) -> Self {
        Self { seed }
    }
}

impl EmptiesSource for DemoEmptiesSource {
    fn outbound_snapshot(
        &self,
        query: &OutboundQuery,
    ) -> Result<Option<EmptiesSnapshot>, SourceError> {
        check_route(&query.origin, &query.destination)?;
        let mut rng = route_rng(self.seed, &query.origin, &query.destination);
        let lookahead = i64::from(query.lookahead_minutes.max(1));
        let count = rng.gen_range(3..=6);

        let mut flights: Vec<OutboundCandidate> = (0..count)
            .map(|_| {
                let departure_time = query.now + Duration::minutes(rng.gen_range(1..=lookahead));
                OutboundCandidate {
                    flight_id: format!("SB{}", rng.gen_range(100..1000)),
                    departure_time,
                    arrival_time: departure_time + Duration::minutes(rng.gen_range(55..=240)),
                    open_seats_now: rng.gen_range(0..=12),
                    snapshot_time: query.now - Duration::minutes(rng.gen_range(0..=5)),
                }
            })
            .collect();
        flights.sort_by_key(|flight| flight.departure_time);

        Ok(Some(EmptiesSnapshot {
            snapshot_time: query.now,
            flights,
            is_stale: false,
        }))
    }
}

/// Return schedule generated the same way as [`DemoEmptiesSource`].
#[derive(Debug, Clone, Copy)]
pub(crate) struct DemoScheduleSource {
    seed: u64,
}

impl DemoScheduleSource {
    pub(crate) fn new(seed: u64) -> Self {
        Self { seed }
    }
}

impl ScheduleSource for DemoScheduleSource {
    fn return_flights(
        &self,
        query: &ReturnQuery,
    ) -> Result<Option<Vec<ReturnCandidate>>, SourceError> {
        check_route(&query.origin, &query.destination)?;
        let mut rng = route_rng(self.seed, &query.origin, &query.destination);
        let span = (query.latest - query.earliest).num_minutes().max(1);
        let count = rng.gen_range(4..=8);

        let mut flights: Vec<ReturnCandidate> = (0..count)
            .map(|_| {
                let departure_time = query.earliest + Duration::minutes(rng.gen_range(0..span));
                let capacity = AIRCRAFT_CAPACITIES[rng.gen_range(0..AIRCRAFT_CAPACITIES.len())];
                ReturnCandidate {
                    flight_id: format!("SB{}", rng.gen_range(1000..10000)),
                    departure_time,
                    arrival_time: departure_time + Duration::minutes(rng.gen_range(55..=240)),
                    open_seats_now: Some(rng.gen_range(0..=20)),
                    capacity: Some(capacity),
                }
            })
            .collect();
        flights.sort_by_key(|flight| flight.departure_time);

        Ok(Some(flights))
    }
}

fn check_route(origin: &str, destination: &str) -> Result<(), SourceError> {
    if origin.eq_ignore_ascii_case(destination) {
        return Err(SourceError::Unavailable(format!(
            "no demo flights from {origin} to itself"
        )));
    }
    Ok(())
}

fn route_rng(seed: u64, origin: &str, destination: &str) -> StdRng {
    StdRng::seed_from_u64(seed ^ route_hash(origin, destination))
}

/// FNV-1a over `ORIGIN-DESTINATION`; stable across runs and platforms.
fn route_hash(origin: &str, destination: &str) -> u64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;

    format!("{origin}-{destination}")
        .to_ascii_uppercase()
        .bytes()
        .fold(OFFSET, |hash, byte| (hash ^ u64::from(byte)).wrapping_mul(PRIME))
}
