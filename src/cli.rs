//! Command-line interface definitions.
//!
//! Uses clap derive API for argument parsing.

use clap::{Args, Parser, Subcommand};

use crate::client::DEFAULT_FEED_URL;
use crate::filters::BoundingRegion;
use crate::output::Format;

/// Recent earthquakes in a fixed region, as a list and a map.
#[derive(Parser, Debug)]
#[command(name = "quaketrack")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Command to run
    #[command(subcommand)]
    pub command: Command,

    #[command(flatten)]
    pub source: SourceArgs,

    /// Enable verbose debug logging
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(long, global = true)]
    pub quiet: bool,
}

/// Where events come from and which of them are kept.
#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
    /// GeoJSON feed to fetch
    #[arg(long, global = true, default_value = DEFAULT_FEED_URL)]
    pub feed_url: String,

    /// Bounding region: south,west,north,east
    #[arg(
        long,
        global = true,
        default_value = "40,-140,70,-50",
        allow_hyphen_values = true,
        value_parser = parse_region
    )]
    pub region: BoundingRegion,
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the event list (one-shot fetch and exit)
    List(ListArgs),

    /// Print the map annotations as JSON (one-shot fetch and exit)
    Markers,

    /// Start the browser view
    Ui(UiArgs),
}

/// Arguments for the `list` command.
#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Output format
    #[arg(long, short = 'f', default_value = "human", value_parser = parse_format)]
    pub format: Format,
}

/// Arguments for the `ui` command.
#[derive(Parser, Debug)]
pub struct UiArgs {
    /// Port to listen on
    #[arg(long, short = 'p', default_value = "8080")]
    pub port: u16,

    /// Host to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Open browser automatically
    #[arg(long)]
    pub open: bool,
}

/// Parse an output format from string.
fn parse_format(s: &str) -> Result<Format, String> {
    s.parse()
}

/// Parse a bounding region from string.
fn parse_region(s: &str) -> Result<BoundingRegion, String> {
    s.parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::CANADA;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["quaketrack", "list"]).unwrap();
        assert_eq!(cli.source.region, CANADA);
        assert_eq!(cli.source.feed_url, DEFAULT_FEED_URL);
        assert!(matches!(cli.command, Command::List(ListArgs { format: Format::Human })));
    }

    #[test]
    fn test_global_region_after_subcommand() {
        let cli = Cli::try_parse_from(["quaketrack", "markers", "--region", "30,-130,50,-100"])
            .unwrap();
        assert!((cli.source.region.south - 30.0).abs() < f64::EPSILON);
        assert!(matches!(cli.command, Command::Markers));
    }

    #[test]
    fn test_region_with_negative_south() {
        let cli = Cli::try_parse_from(["quaketrack", "list", "--region", "-10,-80,10,-60"])
            .unwrap();
        assert!((cli.source.region.south - (-10.0)).abs() < f64::EPSILON);
        assert!((cli.source.region.east - (-60.0)).abs() < f64::EPSILON);
    }

    #[test]
    fn test_rejects_bad_region() {
        assert!(Cli::try_parse_from(["quaketrack", "list", "--region", "1,2,3"]).is_err());
    }

    #[test]
    fn test_ui_args() {
        let cli = Cli::try_parse_from(["quaketrack", "ui", "-p", "9000"]).unwrap();
        match cli.command {
            Command::Ui(args) => {
                assert_eq!(args.port, 9000);
                assert_eq!(args.host, "127.0.0.1");
                assert!(!args.open);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
