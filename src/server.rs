//! Web server for the browser view.
//!
//! Serves a two-pane page: the event list on the left, a Leaflet map on
//! the right. The page uses:
//! - Axum for HTTP
//! - HTMX to poll the list pane until the view state settles
//! - Leaflet for the map, drawn from marker JSON embedded in the list pane
//!
//! The feed is fetched exactly once, when the server (the view) starts.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse},
    routing::get,
};
use serde::Serialize;

use crate::client::FeedClient;
use crate::filters::BoundingRegion;
use crate::present::{MapView, Presentation, present};
use crate::state::{EventStore, ViewState};

/// Status that tells htmx to stop polling.
const HTMX_STOP_POLLING: u16 = 286;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
    pub feed_url: String,
    pub region: BoundingRegion,
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// The view's single event collection
    store: EventStore,
    /// Server configuration
    config: ServerConfig,
}

/// Create the Axum router with all routes.
pub fn create_router(store: EventStore, config: ServerConfig) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/quakes/list", get(list_handler))
        .route("/api/quakes", get(api_handler))
        .route("/health", get(health_handler))
        .with_state(AppState { store, config })
}

/// Start the web server.
///
/// # Errors
///
/// Returns an error if the listener cannot be bound or serving fails.
pub async fn run_server(config: ServerConfig) -> anyhow::Result<()> {
    let store = EventStore::new();

    activate(store.clone(), config.feed_url.clone(), config.region);

    let app = create_router(store, config.clone());

    let addr = format!("{}:{}", config.host, config.port);
    tracing::info!("quaketrack UI starting at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

/// Run the one activation fetch and settle `store` with its outcome.
fn activate(store: EventStore, feed_url: String, region: BoundingRegion) {
    tokio::spawn(async move {
        let fetch = tokio::task::spawn_blocking(move || {
            let client = FeedClient::new(feed_url)?;
            client.fetch_events(&region, chrono::Utc::now().timestamp_millis())
        })
        .await;

        let outcome = match fetch {
            Ok(result) => result.map_err(anyhow::Error::from),
            Err(e) => Err(anyhow::anyhow!("fetch task failed: {e}")),
        };
        store.settle(outcome).await;
    });
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
}

// ============================================================================
// Rendering
// ============================================================================

/// Escape text for inclusion in HTML content or attributes.
fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Render the list pane for a state snapshot.
fn render_list_fragment(state: &ViewState, now_ms: i64) -> String {
    match state {
        ViewState::Loading => {
            r#"<p class="loading">Loading earthquakes...</p>"#.to_string()
        }
        ViewState::Failed(reason) => format!(
            r#"<p class="error">Could not load earthquakes: {}</p>"#,
            escape_html(reason)
        ),
        ViewState::Ready(events) => {
            let presentation = present(events, now_ms);

            let list = if presentation.list.is_empty() {
                r#"<p class="empty">No earthquakes in this region over the last 14 days.</p>"#
                    .to_string()
            } else {
                let items: Vec<String> = presentation
                    .list
                    .iter()
                    .map(|entry| {
                        format!(
                            r#"<li id="quake-{id}">Magnitude {mag} - {place} - <em>{age}</em></li>"#,
                            id = escape_html(&entry.id),
                            mag = entry.magnitude,
                            place = escape_html(&entry.place),
                            age = entry.age,
                        )
                    })
                    .collect();
                format!("<ul>\n{}\n</ul>", items.join("\n"))
            };

            let markers = serde_json::to_string(&presentation.markers).unwrap_or_else(|e| {
                tracing::warn!("failed to serialize markers: {}", e);
                "[]".to_string()
            });

            format!(
                "{list}\n<script type=\"application/json\" id=\"markers-data\">{}</script>",
                markers.replace("</", "<\\/")
            )
        }
    }
}

/// Render the page shell for the configured map view.
fn render_index(map: &MapView, region: &BoundingRegion) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Earthquake Tracker</title>
    <script src="https://unpkg.com/htmx.org@1.9.10"></script>
    <link rel="stylesheet" href="https://unpkg.com/leaflet@1.9.4/dist/leaflet.css" />
    <script src="https://unpkg.com/leaflet@1.9.4/dist/leaflet.js"></script>
    <style>{style}</style>
</head>
<body>
    <div class="list-pane">
        <h1>Earthquake Tracker</h1>
        <p class="subtitle">Region {region} &middot; last 14 days</p>
        <div id="quake-list" hx-get="/quakes/list" hx-trigger="load, every 2s">
            <p class="loading">Loading earthquakes...</p>
        </div>
    </div>
    <div id="map" class="map-pane"
         data-lat="{lat}" data-lon="{lon}" data-zoom="{zoom}"
         data-tiles="{tiles}"></div>
    <script>{script}</script>
</body>
</html>
"#,
        style = STYLE,
        script = SCRIPT,
        region = region,
        lat = map.center[0],
        lon = map.center[1],
        zoom = map.zoom,
        tiles = escape_html(map.tile_url),
    )
}

// ============================================================================
// Route Handlers
// ============================================================================

/// Main page handler - serves the HTML shell.
async fn index_handler(State(state): State<AppState>) -> Html<String> {
    Html(render_index(&MapView::default(), &state.config.region))
}

/// List pane handler. Responds with the htmx stop-polling status once
/// the view state has settled.
async fn list_handler(State(state): State<AppState>) -> impl IntoResponse {
    let snapshot = state.store.snapshot().await;
    let html = render_list_fragment(&snapshot, chrono::Utc::now().timestamp_millis());

    let status = if snapshot.is_settled() {
        StatusCode::from_u16(HTMX_STOP_POLLING).unwrap_or(StatusCode::OK)
    } else {
        StatusCode::OK
    };

    (status, Html(html))
}

/// JSON view of the current state.
#[derive(Debug, Serialize)]
struct ApiResponse {
    status: &'static str,
    region: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    presentation: Option<Presentation>,
}

fn api_response(state: &ViewState, region: &BoundingRegion, now_ms: i64) -> ApiResponse {
    let (error, presentation) = match state {
        ViewState::Loading => (None, None),
        ViewState::Failed(reason) => (Some(reason.clone()), None),
        ViewState::Ready(events) => (None, Some(present(events, now_ms))),
    };

    ApiResponse {
        status: state.as_str(),
        region: region.to_string(),
        error,
        presentation,
    }
}

/// Full presentation as JSON.
async fn api_handler(State(state): State<AppState>) -> Json<ApiResponse> {
    let snapshot = state.store.snapshot().await;
    Json(api_response(
        &snapshot,
        &state.config.region,
        chrono::Utc::now().timestamp_millis(),
    ))
}

/// Health check endpoint.
async fn health_handler() -> &'static str {
    "OK"
}

// ============================================================================
// Static assets (embedded for single-binary deployment)
// ============================================================================

const STYLE: &str = r"
        body {
            font-family: Arial, sans-serif;
            padding: 10px;
            display: flex;
            gap: 20px;
            margin: 0;
        }
        .list-pane {
            flex: 1;
            max-height: 80vh;
            overflow-y: auto;
            border: 1px solid #ddd;
            padding: 10px;
        }
        .list-pane h1 { text-align: center; font-size: 24px; }
        .subtitle { text-align: center; color: #666; font-size: 14px; }
        .list-pane li { margin-bottom: 15px; font-size: 18px; }
        .loading, .empty { font-size: 18px; }
        .error { font-size: 18px; color: darkred; }
        .map-pane { flex: 2; height: 80vh; }
";

const SCRIPT: &str = r"
        (function () {
            var el = document.getElementById('map');
            var map = L.map('map').setView([+el.dataset.lat, +el.dataset.lon], +el.dataset.zoom);
            L.tileLayer(el.dataset.tiles).addTo(map);

            function esc(s) {
                var d = document.createElement('div');
                d.textContent = s;
                return d.innerHTML;
            }

            document.body.addEventListener('htmx:afterSwap', function (e) {
                if (e.detail.target.id !== 'quake-list') return;
                var data = document.getElementById('markers-data');
                if (!data) return;
                JSON.parse(data.textContent).forEach(function (m) {
                    L.circle(m.center, Object.assign({ radius: m.radius }, m.style))
                        .bindPopup(
                            '<strong>Magnitude:</strong> ' + m.popup.magnitude + '<br>' +
                            '<strong>Location:</strong> ' + esc(m.popup.location) + '<br>' +
                            '<strong>Time:</strong> ' + esc(m.popup.time)
                        )
                        .addTo(map);
                });
            });
        })();
";
