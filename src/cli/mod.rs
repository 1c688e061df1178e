//! Command-line parsing for the rating form.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the workflow code.

use clap::{Args, Parser, Subcommand};

use crate::config::LocatorKind;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "rate", version, about = "Rate your energy 1-10 and log it to a spreadsheet")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Submit one rating without the interactive form (useful for scripting).
    Submit(SubmitArgs),
    /// Open the interactive rating form.
    Tui(FormArgs),
}

/// Options shared by every way of submitting.
///
/// Each flag overrides the matching `RATE_*` environment variable.
#[derive(Debug, Args, Clone, Default)]
pub struct FormArgs {
    /// Endpoint URL that receives submissions (overrides RATE_ENDPOINT_URL).
    #[arg(long, value_name = "URL")]
    pub endpoint: Option<String>,

    /// Where the position comes from (default: deny, nothing is shared).
    #[arg(long, value_enum)]
    pub locator: Option<LocatorKind>,

    /// Latitude for `--locator fixed`.
    #[arg(long, allow_negative_numbers = true)]
    pub lat: Option<f64>,

    /// Longitude for `--locator fixed`.
    #[arg(long, allow_negative_numbers = true)]
    pub lng: Option<f64>,

    /// Give up on geolocation after this many milliseconds.
    #[arg(long = "geo-timeout-ms", value_name = "MS")]
    pub geo_timeout_ms: Option<u64>,

    /// How long status notices stay visible.
    #[arg(long = "notice-ms", value_name = "MS")]
    pub notice_ms: Option<u64>,
}

#[derive(Debug, Args, Clone)]
pub struct SubmitArgs {
    /// Rating from 1 (drained) to 10 (buzzing).
    ///
    /// Kept as text so the form's own validation reports bad input.
    #[arg(short = 'r', long, allow_negative_numbers = true)]
    pub rating: Option<String>,

    #[command(flatten)]
    pub form: FormArgs,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_submit_flags() {
        let cli = Cli::parse_from([
            "rate", "submit", "-r", "7", "--locator", "fixed", "--lat", "37.7749", "--lng",
            "-122.4194",
        ]);
        let Command::Submit(args) = cli.command else {
            panic!("expected submit");
        };
        assert_eq!(args.rating.as_deref(), Some("7"));
        assert_eq!(args.form.locator, Some(LocatorKind::Fixed));
        assert_eq!(args.form.lng, Some(-122.4194));
    }

    #[test]
    fn rating_is_optional_at_parse_time() {
        let cli = Cli::parse_from(["rate", "submit"]);
        let Command::Submit(args) = cli.command else {
            panic!("expected submit");
        };
        assert_eq!(args.rating, None);
    }

    #[test]
    fn clap_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
