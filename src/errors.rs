//! Error types for quaketrack.
//!
//! Uses `thiserror` for library-style error definitions.

use thiserror::Error;

/// Ways fetching the feed, or reading one of its entries, can fail.
#[derive(Error, Debug)]
pub enum QuakeError {
    /// Feed endpoint unreachable, timed out, or the body could not be read
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Feed body is not JSON, or not shaped like a feature collection
    #[error("Failed to parse feed: {0}")]
    Parse(#[from] serde_json::Error),

    /// Feed endpoint answered with a non-success status
    #[error("feed error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// Document parsed but its top-level `type` is wrong
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// One feed entry is missing a required attribute or has one of the
    /// wrong type; the entry is dropped, the feed is kept
    #[error("Invalid event data: {0}")]
    Validation(String),
}
