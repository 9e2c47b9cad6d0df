use serde::{Deserialize, Serialize};

use super::domain::{AgeBucket, Party};
use crate::config::ConfigError;

/// Seat weight per age bucket.
///
/// Every bucket always has a weight, so lookups are total. Tables built from
/// configuration are checked for unknown and missing buckets before they are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatRequirementPolicy {
    infant: u32,
    child: u32,
    adult: u32,
}

impl Default for SeatRequirementPolicy {
    /// Lap infants, seated children and adults.
    fn default() -> Self {
        Self {
            infant: 0,
            child: 1,
            adult: 1,
        }
    }
}

impl SeatRequirementPolicy {
    pub const fn new(infant: u32, child: u32, adult: u32) -> Self {
        Self {
            infant,
            child,
            adult,
        }
    }

    /// Build a policy from `(bucket name, seats)` pairs.
    pub fn from_entries<I, S>(entries: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (S, u32)>,
        S: AsRef<str>,
    {
        let mut infant = None;
        let mut child = None;
        let mut adult = None;

        for (name, seats) in entries {
            let name = name.as_ref();
            let bucket = AgeBucket::parse(name)
                .ok_or_else(|| ConfigError::UnknownAgeBucket(name.trim().to_string()))?;
            let slot = match bucket {
                AgeBucket::Infant => &mut infant,
                AgeBucket::Child => &mut child,
                AgeBucket::Adult => &mut adult,
            };
            if slot.replace(seats).is_some() {
                return Err(ConfigError::DuplicateSeatWeight(bucket));
            }
        }

        Ok(Self {
            infant: infant.ok_or(ConfigError::MissingSeatWeight(AgeBucket::Infant))?,
            child: child.ok_or(ConfigError::MissingSeatWeight(AgeBucket::Child))?,
            adult: adult.ok_or(ConfigError::MissingSeatWeight(AgeBucket::Adult))?,
        })
    }

    /// Parse the `infant=0,child=1,adult=1` form used by `STANDBY_SEAT_TABLE`.
    pub fn parse(table: &str) -> Result<Self, ConfigError> {
        let mut entries = Vec::new();
        for entry in table.split(',').filter(|entry| !entry.trim().is_empty()) {
            let (name, seats) = entry
                .split_once('=')
                .ok_or_else(|| ConfigError::MalformedSeatEntry(entry.trim().to_string()))?;
            let seats = seats
                .trim()
                .parse::<u32>()
                .map_err(|_| ConfigError::MalformedSeatEntry(entry.trim().to_string()))?;
            entries.push((name.to_string(), seats));
        }
        Self::from_entries(entries)
    }

    pub const fn weight(&self, bucket: AgeBucket) -> u32 {
        match bucket {
            AgeBucket::Infant => self.infant,
            AgeBucket::Child => self.child,
            AgeBucket::Adult => self.adult,
        }
    }

    pub fn seats_required(&self, party: &Party) -> u32 {
        party
            .travelers()
            .iter()
            .map(|traveler| self.weight(traveler.age_bucket))
            .sum()
    }
}
