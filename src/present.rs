//! Display attributes derived from filtered events.
//!
//! Everything here is recomputed per render from the render-time clock;
//! nothing is cached on the events themselves.

use serde::Serialize;

use crate::filters::DAY_MS;
use crate::models::EventRecord;

/// One hour in milliseconds.
pub const HOUR_MS: i64 = 60 * 60 * 1000;

/// Circle radius in metres per unit of magnitude.
pub const RADIUS_PER_MAGNITUDE_M: f64 = 10_000.0;

/// Initial map centre as [lat, lon].
pub const MAP_CENTER: [f64; 2] = [56.0, -106.0];

/// Initial map zoom level.
pub const MAP_ZOOM: u8 = 4;

/// Tile source URL template handed to the map widget.
pub const TILE_URL: &str = "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png";

/// Relative age of an event, e.g. `"3 days ago"` or `"5 hours ago"`.
///
/// The wording is literal: no singular forms, and events under an hour
/// old read `"0 hours ago"`.
#[must_use]
pub fn age_label(occurred_at: i64, now_ms: i64) -> String {
    let diff = now_ms - occurred_at;
    let days = diff.div_euclid(DAY_MS);
    if days > 0 {
        format!("{days} days ago")
    } else {
        let hours = diff.div_euclid(HOUR_MS) % 24;
        format!("{hours} hours ago")
    }
}

/// Map circle radius in metres. Not clamped.
#[must_use]
pub fn circle_radius(magnitude: f64) -> f64 {
    magnitude * RADIUS_PER_MAGNITUDE_M
}

/// A line in the list pane.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListEntry {
    pub id: String,
    pub magnitude: f64,
    pub place: String,
    pub age: String,
}

impl ListEntry {
    #[must_use]
    pub fn new(event: &EventRecord, now_ms: i64) -> Self {
        Self {
            id: event.id.clone(),
            magnitude: event.magnitude,
            place: event.place.clone(),
            age: age_label(event.occurred_at, now_ms),
        }
    }
}

impl std::fmt::Display for ListEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Magnitude {} - {} - {}", self.magnitude, self.place, self.age)
    }
}

/// Fill and stroke style for a map circle.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CircleStyle {
    pub fill_color: &'static str,
    pub color: &'static str,
    pub fill_opacity: f64,
}

/// Style shared by every event circle.
pub const CIRCLE_STYLE: CircleStyle = CircleStyle {
    fill_color: "red",
    color: "darkred",
    fill_opacity: 0.6,
};

/// Popup content attached to a map circle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Popup {
    pub magnitude: f64,
    pub location: String,
    pub time: String,
}

/// A circle overlay for one event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapMarker {
    pub id: String,
    /// [lat, lon], the order the map widget expects
    pub center: [f64; 2],
    /// Metres
    pub radius: f64,
    pub style: CircleStyle,
    pub popup: Popup,
}

impl MapMarker {
    #[must_use]
    pub fn new(event: &EventRecord, now_ms: i64) -> Self {
        Self {
            id: event.id.clone(),
            center: [event.latitude, event.longitude],
            radius: circle_radius(event.magnitude),
            style: CIRCLE_STYLE,
            popup: Popup {
                magnitude: event.magnitude,
                location: event.place.clone(),
                time: age_label(event.occurred_at, now_ms),
            },
        }
    }
}

/// Initial map viewport and tile source.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapView {
    pub center: [f64; 2],
    pub zoom: u8,
    pub tile_url: &'static str,
}

impl Default for MapView {
    fn default() -> Self {
        Self {
            center: MAP_CENTER,
            zoom: MAP_ZOOM,
            tile_url: TILE_URL,
        }
    }
}

/// Everything a view needs to draw both panes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Presentation {
    pub list: Vec<ListEntry>,
    pub markers: Vec<MapMarker>,
    pub map: MapView,
}

/// Build the list pane and map annotations for already filtered events.
#[must_use]
pub fn present(events: &[EventRecord], now_ms: i64) -> Presentation {
    Presentation {
        list: events.iter().map(|e| ListEntry::new(e, now_ms)).collect(),
        markers: events.iter().map(|e| MapMarker::new(e, now_ms)).collect(),
        map: MapView::default(),
    }
}
