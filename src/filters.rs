//! Event filtering logic.
//!
//! An event survives when it lies inside the bounding region and occurred
//! within the recency window. Filtering is a pure selection: records are
//! never altered and their feed order is kept.

use crate::models::EventRecord;

/// One day in milliseconds.
pub const DAY_MS: i64 = 24 * 60 * 60 * 1000;

/// Length of the recency window in days.
pub const RECENCY_DAYS: i64 = 14;

/// Recency window in milliseconds.
pub const RECENCY_WINDOW_MS: i64 = RECENCY_DAYS * DAY_MS;

/// Rectangular latitude/longitude window used as the geographic filter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingRegion {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

/// Default region: roughly Canada and its margins.
pub const CANADA: BoundingRegion = BoundingRegion {
    south: 40.0,
    west: -140.0,
    north: 70.0,
    east: -50.0,
};

impl Default for BoundingRegion {
    fn default() -> Self {
        CANADA
    }
}

impl std::str::FromStr for BoundingRegion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(',').collect();
        let [south, west, north, east] = parts.as_slice() else {
            return Err(format!(
                "region requires 4 values (south,west,north,east), got {}",
                parts.len()
            ));
        };

        let parse = |p: &str| {
            p.trim()
                .parse::<f64>()
                .map_err(|e| format!("invalid number in region: {e}"))
        };

        let region = Self {
            south: parse(*south)?,
            west: parse(*west)?,
            north: parse(*north)?,
            east: parse(*east)?,
        };

        for (name, lat) in [("south", region.south), ("north", region.north)] {
            if !(-90.0..=90.0).contains(&lat) {
                return Err(format!("{name} {lat} out of range [-90, 90]"));
            }
        }
        for (name, lon) in [("west", region.west), ("east", region.east)] {
            if !(-180.0..=180.0).contains(&lon) {
                return Err(format!("{name} {lon} out of range [-180, 180]"));
            }
        }
        if region.south > region.north {
            return Err(format!(
                "south {} must be <= north {}",
                region.south, region.north
            ));
        }

        Ok(region)
    }
}

impl std::fmt::Display for BoundingRegion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{},{},{}", self.south, self.west, self.north, self.east)
    }
}

impl BoundingRegion {
    /// Check if a point is within the region. All bounds are inclusive.
    #[must_use]
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        lat >= self.south && lat <= self.north && lon >= self.west && lon <= self.east
    }
}

/// Check whether `occurred_at` falls inside the recency window ending at `now_ms`.
#[must_use]
pub fn is_recent(occurred_at: i64, now_ms: i64) -> bool {
    occurred_at >= now_ms - RECENCY_WINDOW_MS
}

/// Select the events inside `region` that occurred within the recency window.
#[must_use]
pub fn filter_events(
    all_events: &[EventRecord],
    region: &BoundingRegion,
    now_ms: i64,
) -> Vec<EventRecord> {
    all_events
        .iter()
        .filter(|e| region.contains(e.latitude, e.longitude) && is_recent(e.occurred_at, now_ms))
        .cloned()
        .collect()
}
