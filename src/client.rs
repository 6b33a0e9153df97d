//! USGS earthquake feed client.
//!
//! Provides blocking HTTP access to the summary GeoJSON feed.
//! Uses reqwest with rustls for TLS.

use std::time::Duration;

use reqwest::blocking::Client;
use tracing::{debug, instrument};

use crate::errors::QuakeError;
use crate::filters::{BoundingRegion, filter_events};
use crate::models::{EventRecord, Feed};

/// Default request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 10;

/// User agent string for feed requests.
const USER_AGENT: &str = concat!("quaketrack/", env!("CARGO_PKG_VERSION"));

/// Magnitude 2.5+ events from the past week.
pub const DEFAULT_FEED_URL: &str =
    "https://earthquake.usgs.gov/earthquakes/feed/v1.0/summary/2.5_week.geojson";

/// Client for a single GeoJSON feed endpoint.
pub struct FeedClient {
    client: Client,
    url: String,
}

impl FeedClient {
    /// Create a client for `url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn new(url: impl Into<String>) -> Result<Self, QuakeError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }

    /// The endpoint this client fetches.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetch and parse the feed once.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the status is not a success,
    /// or the body is not a feature collection.
    #[instrument(skip(self), fields(url = %self.url))]
    pub fn fetch_feed(&self) -> Result<Feed, QuakeError> {
        debug!("fetching feed");

        let response = self.client.get(&self.url).send()?;

        // Check status before parsing
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(QuakeError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response.text()?;
        let feed = parse_feed(&body)?;

        if let Some(meta) = &feed.metadata {
            debug!(
                "feed {:?} reports {:?} events",
                meta.title.as_deref().unwrap_or("untitled"),
                meta.count
            );
        }
        debug!("fetched {} entries", feed.features.len());
        Ok(feed)
    }

    /// Fetch the feed, validate its entries and keep those inside
    /// `region` within the recency window ending at `now_ms`.
    ///
    /// # Errors
    ///
    /// Returns an error if the fetch fails. Individual malformed entries
    /// are dropped, not reported.
    pub fn fetch_events(
        &self,
        region: &BoundingRegion,
        now_ms: i64,
    ) -> Result<Vec<EventRecord>, QuakeError> {
        let events = self.fetch_feed()?.into_events();
        let filtered = filter_events(&events, region, now_ms);
        debug!(region = %region, "{} of {} events selected", filtered.len(), events.len());
        Ok(filtered)
    }
}

/// Parse and structurally validate a feed body.
///
/// # Errors
///
/// Returns `Parse` for malformed JSON and `InvalidResponse` for a
/// document that is not a feature collection.
pub fn parse_feed(body: &str) -> Result<Feed, QuakeError> {
    let feed: Feed = serde_json::from_str(body)?;
    feed.validate()?;
    Ok(feed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::CANADA;

    use axum::{Router, http::StatusCode, routing::get};

    const SAMPLE: &str = include_str!("../tools/sample_2.5_week.json");

    /// Clock a few hours after the newest sample entry.
    const SAMPLE_NOW: i64 = 1_760_000_000_000;

    /// Serve `body` with `status` on a local port; returns the feed URL.
    async fn serve(status: StatusCode, body: &'static str) -> String {
        let app = Router::new().route("/feed.geojson", get(move || async move { (status, body) }));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}/feed.geojson")
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_fetch_events_from_local_feed() {
        let url = serve(StatusCode::OK, SAMPLE).await;

        let events = tokio::task::spawn_blocking(move || {
            FeedClient::new(url)?.fetch_events(&CANADA, SAMPLE_NOW)
        })
        .await
        .unwrap()
        .expect("fetch succeeds");

        let ids: Vec<&str> = events.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, ["ak0251"]);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_error_status_maps_to_api() {
        let url = serve(StatusCode::INTERNAL_SERVER_ERROR, "feed unavailable").await;

        let result = tokio::task::spawn_blocking(move || {
            FeedClient::new(url)?.fetch_events(&CANADA, SAMPLE_NOW)
        })
        .await
        .unwrap();

        match result {
            Err(QuakeError::Api { status, message }) => {
                assert_eq!(status, 500);
                assert_eq!(message, "feed unavailable");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[test]
    fn test_closed_port_maps_to_http() {
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };

        let client = FeedClient::new(format!("http://127.0.0.1:{port}/feed.geojson")).unwrap();
        assert!(matches!(client.fetch_feed(), Err(QuakeError::Http(_))));
    }

    #[test]
    fn test_client_keeps_url() {
        let client = FeedClient::new(DEFAULT_FEED_URL).expect("client");
        assert_eq!(client.url(), DEFAULT_FEED_URL);
    }

    #[test]
    fn test_parse_feed_errors() {
        assert!(matches!(parse_feed("not json"), Err(QuakeError::Parse(_))));
        assert!(matches!(
            parse_feed(r#"{"type": "Feature", "features": []}"#),
            Err(QuakeError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_parse_sample_body() {
        let feed = parse_feed(include_str!("../tools/sample_2.5_week.json")).expect("feed");
        assert_eq!(feed.metadata.and_then(|m| m.count), Some(6));
    }
}
