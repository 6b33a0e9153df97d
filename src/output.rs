//! Terminal renderers for the list and map panes.
//!
//! The list pane supports human-readable (with colors), JSON, and NDJSON
//! formats. The map pane is always JSON, ready for a map widget.

use std::io::{self, Write};

use serde::Serialize;

use crate::present::{ListEntry, MapMarker, MapView};

// ANSI color codes
const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";

// Magnitude-based colors
const RED: &str = "\x1b[91m"; // mag >= 6.0
const YELLOW: &str = "\x1b[93m"; // mag >= 4.5
const GREEN: &str = "\x1b[92m"; // mag >= 3.0
const WHITE: &str = "\x1b[97m";

/// Output format selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    /// Human-readable terminal output (default)
    #[default]
    Human,
    /// JSON array
    Json,
    /// Newline-delimited JSON (one object per line)
    Ndjson,
}

impl std::str::FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "human" => Ok(Self::Human),
            "json" => Ok(Self::Json),
            "ndjson" => Ok(Self::Ndjson),
            _ => Err(format!("unknown format: {s} (expected: human, json, ndjson)")),
        }
    }
}

fn magnitude_color(mag: f64) -> &'static str {
    match mag {
        m if m >= 6.0 => RED,
        m if m >= 4.5 => YELLOW,
        m if m >= 3.0 => GREEN,
        _ => WHITE,
    }
}

fn to_io<E: std::error::Error + Send + Sync + 'static>(e: E) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, e)
}

/// Write the list pane with colors.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_human<W: Write>(writer: &mut W, entries: &[ListEntry]) -> io::Result<()> {
    if entries.is_empty() {
        writeln!(writer, "{DIM}No earthquakes in the region over the last 14 days{RESET}")?;
        return Ok(());
    }

    for entry in entries {
        let color = magnitude_color(entry.magnitude);
        writeln!(
            writer,
            "{color}{BOLD}Magnitude {}{RESET} - {} - {DIM}{}{RESET}",
            entry.magnitude, entry.place, entry.age
        )?;
    }
    Ok(())
}

/// Write the list pane as a JSON array.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn write_json<W: Write>(writer: &mut W, entries: &[ListEntry]) -> io::Result<()> {
    let json = serde_json::to_string_pretty(entries).map_err(to_io)?;
    writeln!(writer, "{json}")
}

/// Write the list pane as newline-delimited JSON.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn write_ndjson<W: Write>(writer: &mut W, entries: &[ListEntry]) -> io::Result<()> {
    for entry in entries {
        let json = serde_json::to_string(entry).map_err(to_io)?;
        writeln!(writer, "{json}")?;
    }
    Ok(())
}

/// Write the list pane in the specified format.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_list<W: Write>(writer: &mut W, entries: &[ListEntry], format: Format) -> io::Result<()> {
    match format {
        Format::Human => write_human(writer, entries),
        Format::Json => write_json(writer, entries),
        Format::Ndjson => write_ndjson(writer, entries),
    }
}

#[derive(Serialize)]
struct MapPane<'a> {
    map: &'a MapView,
    markers: &'a [MapMarker],
}

/// Write the map pane (viewport plus circles) as pretty JSON.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn write_markers<W: Write>(writer: &mut W, map: &MapView, markers: &[MapMarker]) -> io::Result<()> {
    let json = serde_json::to_string_pretty(&MapPane { map, markers }).map_err(to_io)?;
    writeln!(writer, "{json}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EventRecord;
    use crate::present::present;

    const NOW: i64 = 1_760_000_000_000;

    fn entries() -> Vec<ListEntry> {
        let events = [
            EventRecord {
                id: "a".into(),
                longitude: -120.0,
                latitude: 50.0,
                magnitude: 3.5,
                place: "Kamloops".into(),
                occurred_at: NOW - 2 * 60 * 60 * 1000,
            },
            EventRecord {
                id: "b".into(),
                longitude: -66.0,
                latitude: 45.0,
                magnitude: 2.5,
                place: "Bay of Fundy".into(),
                occurred_at: NOW - 3 * 24 * 60 * 60 * 1000,
            },
        ];
        present(&events, NOW).list
    }

    #[test]
    fn test_format_parse() {
        assert_eq!("human".parse::<Format>().unwrap(), Format::Human);
        assert_eq!("JSON".parse::<Format>().unwrap(), Format::Json);
        assert_eq!("ndjson".parse::<Format>().unwrap(), Format::Ndjson);
        assert!("invalid".parse::<Format>().is_err());
    }

    #[test]
    fn test_human_output() {
        let mut buf = Vec::new();
        write_list(&mut buf, &entries(), Format::Human).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text.lines().count(), 2);
        assert!(text.contains("Magnitude 3.5"));
        assert!(text.contains("Kamloops"));
        assert!(text.contains("2 hours ago"));
        assert!(text.contains("3 days ago"));
    }

    #[test]
    fn test_human_empty() {
        let mut buf = Vec::new();
        write_human(&mut buf, &[]).unwrap();
        assert!(String::from_utf8(buf).unwrap().contains("No earthquakes"));
    }

    #[test]
    fn test_ndjson_one_line_per_entry() {
        let mut buf = Vec::new();
        write_list(&mut buf, &entries(), Format::Ndjson).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["id"], "a");
        assert_eq!(first["age"], "2 hours ago");
    }

    #[test]
    fn test_markers_json() {
        let mut buf = Vec::new();
        let presentation = present(&[], NOW);
        write_markers(&mut buf, &presentation.map, &presentation.markers).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(value["map"]["zoom"], 4);
        assert_eq!(value["markers"].as_array().map(Vec::len), Some(0));
    }
}
