//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - resolves configuration
//! - wires the locator and endpoint into a workflow
//! - hands off to the TUI or runs a single scripted submission

use clap::Parser;
use log::info;

use crate::cli::{Command, FormArgs, SubmitArgs};
use crate::config::Config;
use crate::domain::Rating;
use crate::error::AppError;
use crate::geo::{Locator, locator_from_config};
use crate::remote::ScriptClient;
use crate::workflow::{NoticeSlot, Outcome, StatusBoard, Workflow};

/// Workflow wired to the configured locator and the real endpoint.
pub type LiveWorkflow = Workflow<Box<dyn Locator>, ScriptClient>;

/// Entry point for the `rate` binary.
pub fn run() -> Result<(), AppError> {
    // `rate` alone (or `rate --locator deny`) opens the form.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Submit(args) => handle_submit(args),
        Command::Tui(args) => handle_tui(args),
    }
}

/// Build the workflow and an empty status board from configuration.
pub fn build_workflow(config: &Config) -> Result<(LiveWorkflow, StatusBoard), AppError> {
    let endpoint = ScriptClient::new(config.endpoint_url.clone(), config.submit_timeout)?;
    info!(
        "endpoint {} locator {:?} geo timeout {} ms",
        endpoint.url(),
        config.locator,
        config.position.timeout.as_millis()
    );
    let workflow = Workflow::new(locator_from_config(config), endpoint, config.position);
    Ok((workflow, StatusBoard::new(config.notice_duration)))
}

fn handle_submit(args: SubmitArgs) -> Result<(), AppError> {
    // Validation comes first: a bad rating never needs configuration.
    let rating = Rating::parse(args.rating.as_deref())
        .map_err(|e| AppError::usage(format!("rating: {e}")))?;

    let config = Config::resolve(&args.form)?;
    let (workflow, mut board) = build_workflow(&config)?;

    let outcome = workflow.submit(rating, &mut board);

    if let Some(geo) = board.notice(NoticeSlot::GeoError) {
        println!("⚠️ {}", geo.message);
    }
    match outcome {
        Outcome::Submitted(_) => {
            if let Some(ok) = board.notice(NoticeSlot::Success) {
                println!("{}", ok.message);
            }
            Ok(())
        }
        Outcome::Failed(err) => Err(AppError::runtime(format!("⚠️ {err}"))),
    }
}

fn handle_tui(args: FormArgs) -> Result<(), AppError> {
    let config = Config::resolve(&args)?;
    crate::tui::run(&config)
}

/// Rewrite argv so `rate` defaults to `rate tui`.
///
/// Rules:
/// - `rate`                       -> `rate tui`
/// - `rate --locator deny ...`    -> `rate tui --locator deny ...`
/// - `rate --help/--version/-h`   -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "submit" | "tui");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    argv
}
