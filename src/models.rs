//! Data models for the USGS GeoJSON summary feed.
//!
//! The raw feed types are deliberately lenient: every field the pipeline
//! relies on is optional here, and `RawFeature::validate` turns an entry
//! into an [`EventRecord`] or rejects it. Nothing downstream of
//! validation ever sees a partially populated event.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::errors::QuakeError;

/// Top-level GeoJSON response from the feed.
#[derive(Debug, Clone, Deserialize)]
pub struct Feed {
    /// Always "FeatureCollection"
    #[serde(rename = "type")]
    pub type_: String,

    /// Feed metadata, when present
    #[serde(default)]
    pub metadata: Option<Metadata>,

    /// Earthquake entries, untyped until each is validated on its own
    pub features: Vec<serde_json::Value>,
}

impl Feed {
    /// Validate the response structure.
    ///
    /// # Errors
    ///
    /// Returns `InvalidResponse` if the document is not a feature collection.
    pub fn validate(&self) -> Result<(), QuakeError> {
        if self.type_ != "FeatureCollection" {
            return Err(QuakeError::InvalidResponse(format!(
                "expected type 'FeatureCollection', got '{}'",
                self.type_
            )));
        }
        Ok(())
    }

    /// Validate every entry, keeping feed order.
    ///
    /// Malformed entries are logged and dropped.
    #[must_use]
    pub fn into_events(self) -> Vec<EventRecord> {
        let total = self.features.len();
        let events: Vec<EventRecord> = self
            .features
            .into_iter()
            .enumerate()
            .filter_map(|(index, value)| match RawFeature::from_value(value) {
                Ok(event) => Some(event),
                Err(e) => {
                    warn!(index, "dropping feed entry: {e}");
                    None
                }
            })
            .collect();

        debug!("{} of {} feed entries passed validation", events.len(), total);
        events
    }
}

/// Metadata about the feed response.
#[derive(Debug, Clone, Deserialize)]
pub struct Metadata {
    /// Human-readable title
    pub title: Option<String>,

    /// Number of events in response
    pub count: Option<usize>,
}

/// A single feed entry as delivered, before validation.
#[derive(Debug, Clone, Deserialize)]
pub struct RawFeature {
    /// Unique event ID
    pub id: Option<String>,

    /// Geographic location
    pub geometry: Option<Geometry>,

    /// Event properties
    pub properties: Option<Properties>,
}

/// Geographic geometry for an entry.
#[derive(Debug, Clone, Deserialize)]
pub struct Geometry {
    /// Coordinates: [longitude, latitude, depth_km]
    #[serde(default)]
    pub coordinates: Vec<f64>,
}

/// The subset of feed properties the tracker reads.
#[derive(Debug, Clone, Deserialize)]
pub struct Properties {
    /// Magnitude value
    pub mag: Option<f64>,

    /// Human-readable place description
    pub place: Option<String>,

    /// Event time (ms since epoch)
    pub time: Option<i64>,
}

impl RawFeature {
    /// Decode one untyped feed entry and validate it.
    ///
    /// A wrongly typed field fails this entry only.
    ///
    /// # Errors
    ///
    /// Returns `Validation` if the entry does not decode or fails
    /// [`RawFeature::validate`].
    pub fn from_value(value: serde_json::Value) -> Result<EventRecord, QuakeError> {
        let raw: Self = serde_json::from_value(value)
            .map_err(|e| QuakeError::Validation(format!("malformed entry: {e}")))?;
        raw.validate()
    }

    /// Check required attributes and build an [`EventRecord`].
    ///
    /// # Errors
    ///
    /// Returns `Validation` when the id, location, magnitude or time is
    /// missing, or a coordinate is not finite.
    pub fn validate(self) -> Result<EventRecord, QuakeError> {
        let id = self
            .id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| QuakeError::Validation("missing event ID".into()))?;

        let coordinates = self
            .geometry
            .map(|g| g.coordinates)
            .ok_or_else(|| QuakeError::Validation(format!("{id}: missing geometry")))?;
        let (longitude, latitude) = match coordinates.as_slice() {
            [lon, lat, ..] => (*lon, *lat),
            _ => {
                return Err(QuakeError::Validation(format!(
                    "{id}: expected at least 2 coordinates, got {}",
                    coordinates.len()
                )));
            }
        };
        if !longitude.is_finite() || !latitude.is_finite() {
            return Err(QuakeError::Validation(format!(
                "{id}: non-finite coordinates"
            )));
        }

        let properties = self
            .properties
            .ok_or_else(|| QuakeError::Validation(format!("{id}: missing properties")))?;
        let magnitude = properties
            .mag
            .ok_or_else(|| QuakeError::Validation(format!("{id}: missing magnitude")))?;
        let occurred_at = properties
            .time
            .ok_or_else(|| QuakeError::Validation(format!("{id}: missing time")))?;

        Ok(EventRecord {
            id,
            longitude,
            latitude,
            magnitude,
            place: properties.place.unwrap_or_default(),
            occurred_at,
        })
    }
}

/// One validated seismic event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventRecord {
    /// Opaque, stable identifier
    pub id: String,
    /// Degrees east
    pub longitude: f64,
    /// Degrees north
    pub latitude: f64,
    pub magnitude: f64,
    /// Free-text location description
    pub place: String,
    /// Milliseconds since the Unix epoch
    pub occurred_at: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> RawFeature {
        serde_json::from_str(json).expect("failed to parse feature")
    }

    #[test]
    fn test_parse_sample_feed() {
        let json = include_str!("../tools/sample_2.5_week.json");
        let feed: Feed = serde_json::from_str(json).expect("failed to parse sample feed");

        feed.validate().expect("invalid feed");
        assert_eq!(feed.features.len(), 6);

        let events = feed.into_events();
        let ids: Vec<&str> = events.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, ["ak0251", "us7000a", "ci4012", "nc7315"]);
    }

    #[test]
    fn test_wrongly_typed_entry_dropped_alone() {
        let json = r#"{"type": "FeatureCollection", "features": [
            {"id": "good", "geometry": {"coordinates": [-100.0, 50.0, 3.0]},
             "properties": {"mag": 2.8, "place": "Saskatchewan", "time": 1760000000000}},
            {"id": "nullcoord", "geometry": {"coordinates": [-100.0, 50.0, null]},
             "properties": {"mag": 3.0, "place": "x", "time": 1760000000000}},
            {"id": "strmag", "geometry": {"coordinates": [-100.0, 50.0]},
             "properties": {"mag": "3.1", "place": "x", "time": 1760000000000}},
            42
        ]}"#;
        let feed: Feed = serde_json::from_str(json).expect("document still parses");
        assert_eq!(feed.features.len(), 4);

        let events = feed.into_events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].id, "good");
    }

    #[test]
    fn test_from_value_reports_validation() {
        let value = serde_json::json!({"id": "a", "properties": {"mag": "big", "time": 5}});
        assert!(matches!(
            RawFeature::from_value(value),
            Err(QuakeError::Validation(_))
        ));
    }

    #[test]
    fn test_rejects_wrong_collection_type() {
        let feed: Feed = serde_json::from_str(r#"{"type": "Feature", "features": []}"#)
            .expect("failed to parse");
        assert!(matches!(feed.validate(), Err(QuakeError::InvalidResponse(_))));
    }

    #[test]
    fn test_validate_complete_feature() {
        let raw = parse(
            r#"{"id": "ak1", "geometry": {"coordinates": [-150.1, 61.2, 10.0]},
                "properties": {"mag": 3.1, "place": "Anchorage", "time": 1700000000000}}"#,
        );
        let event = raw.validate().expect("valid feature");
        assert_eq!(event.id, "ak1");
        assert!((event.longitude - (-150.1)).abs() < f64::EPSILON);
        assert!((event.latitude - 61.2).abs() < f64::EPSILON);
        assert_eq!(event.place, "Anchorage");
        assert_eq!(event.occurred_at, 1_700_000_000_000);
    }

    #[test]
    fn test_missing_place_is_empty() {
        let raw = parse(
            r#"{"id": "x", "geometry": {"coordinates": [1.0, 2.0]},
                "properties": {"mag": 1.0, "place": null, "time": 5}}"#,
        );
        assert_eq!(raw.validate().expect("valid feature").place, "");
    }

    #[test]
    fn test_validate_rejects_missing_fields() {
        let cases = [
            r#"{"geometry": {"coordinates": [1.0, 2.0]}, "properties": {"mag": 1.0, "time": 5}}"#,
            r#"{"id": "", "geometry": {"coordinates": [1.0, 2.0]}, "properties": {"mag": 1.0, "time": 5}}"#,
            r#"{"id": "a", "properties": {"mag": 1.0, "time": 5}}"#,
            r#"{"id": "a", "geometry": {"coordinates": [1.0]}, "properties": {"mag": 1.0, "time": 5}}"#,
            r#"{"id": "a", "geometry": {"coordinates": [1.0, 2.0]}}"#,
            r#"{"id": "a", "geometry": {"coordinates": [1.0, 2.0]}, "properties": {"mag": null, "time": 5}}"#,
            r#"{"id": "a", "geometry": {"coordinates": [1.0, 2.0]}, "properties": {"mag": 1.0}}"#,
        ];

        for json in cases {
            let result = parse(json).validate();
            assert!(
                matches!(result, Err(QuakeError::Validation(_))),
                "expected rejection for {json}"
            );
        }
    }
}
