//! quaketrack - recent earthquakes in a fixed region.
//!
//! Fetches the USGS summary feed once, keeps events inside a bounding
//! region from the last 14 days, and shows them as a list and as map
//! circles, either in the terminal or in a browser view.

use std::io;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::error;

mod cli;
mod client;
mod errors;
mod filters;
mod models;
mod output;
mod present;
mod server;
mod state;

use cli::{Cli, Command, SourceArgs};
use client::FeedClient;
use models::EventRecord;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing based on verbosity
    init_tracing(cli.verbose, cli.quiet);

    match cli.command {
        Command::List(args) => cmd_list(&cli.source, args),
        Command::Markers => cmd_markers(&cli.source),
        Command::Ui(args) => cmd_ui(cli.source, args),
    }
}

/// Initialize tracing subscriber.
fn init_tracing(verbose: bool, quiet: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if quiet {
        EnvFilter::new("error")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

/// Fetch once and keep the events the view should show.
fn load_events(source: &SourceArgs, now_ms: i64) -> Result<Vec<EventRecord>> {
    let client = FeedClient::new(source.feed_url.as_str()).context("failed to create feed client")?;
    tracing::debug!("using feed {}", client.url());

    client
        .fetch_events(&source.region, now_ms)
        .context("failed to fetch earthquake feed")
}

/// Execute the `list` command - print the list pane.
fn cmd_list(source: &SourceArgs, args: cli::ListArgs) -> Result<()> {
    let now_ms = chrono::Utc::now().timestamp_millis();
    let events = load_events(source, now_ms)?;
    let presentation = present::present(&events, now_ms);

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    output::write_list(&mut handle, &presentation.list, args.format)?;

    Ok(())
}

/// Execute the `markers` command - print the map pane as JSON.
fn cmd_markers(source: &SourceArgs) -> Result<()> {
    let now_ms = chrono::Utc::now().timestamp_millis();
    let events = load_events(source, now_ms)?;
    let presentation = present::present(&events, now_ms);

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    output::write_markers(&mut handle, &presentation.map, &presentation.markers)?;

    Ok(())
}

/// Execute the `ui` command - start the web server.
fn cmd_ui(source: SourceArgs, args: cli::UiArgs) -> Result<()> {
    let config = server::ServerConfig {
        port: args.port,
        host: args.host.clone(),
        feed_url: source.feed_url,
        region: source.region,
    };

    let url = format!("http://{}:{}", args.host, args.port);
    println!("\x1b[1mquaketrack\x1b[0m");
    println!("\x1b[2m───────────────────────────────────────\x1b[0m");
    println!("  Local:   \x1b[96m{url}\x1b[0m");
    println!("  Region:  {}", config.region);
    println!("\x1b[2m───────────────────────────────────────\x1b[0m");
    println!("\x1b[2mPress Ctrl+C to stop\x1b[0m\n");

    // Open browser if requested (using xdg-open/open command)
    if args.open {
        #[cfg(target_os = "linux")]
        let _ = std::process::Command::new("xdg-open").arg(&url).spawn();
        #[cfg(target_os = "macos")]
        let _ = std::process::Command::new("open").arg(&url).spawn();
        #[cfg(target_os = "windows")]
        let _ = std::process::Command::new("cmd").args(["/c", "start", &url]).spawn();
    }

    // Run the async server on tokio runtime
    tokio::runtime::Runtime::new()
        .context("failed to create tokio runtime")?
        .block_on(server::run_server(config))
}
