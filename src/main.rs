//! u-caseload command-line front end.
//!
//! Reads a JSON request from a file or stdin, runs the engine once, and
//! writes the JSON response to stdout. Logs go to stderr.

use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use u_caseload::config::EngineConfig;
use u_caseload::scheduler::CaseloadEngine;
use u_caseload::wire::{ErrorBody, PlanBody, RequestBody, ScheduleBody, SummaryBody};
use u_caseload::Error;

/// Daily caseload allocation engine
#[derive(Parser, Debug)]
#[command(name = "u-caseload")]
#[command(version, about, long_about = None)]
#[command(after_help = "ENVIRONMENT:\n    U_CASELOAD_CONFIG   Engine config file (alternative to --config)\n    RUST_LOG            Log filter (default: u_caseload=info)")]
struct Cli {
    /// Engine configuration file (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Pretty-print JSON output
    #[arg(short, long, global = true)]
    pretty: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
enum Command {
    /// Per-worker assignment
    Schedule {
        /// Request file (reads stdin if omitted)
        #[arg(short, long)]
        input: Option<PathBuf>,
    },

    /// Workload metrics
    Summary {
        /// Request file (reads stdin if omitted)
        #[arg(short, long)]
        input: Option<PathBuf>,
    },

    /// Assignment and metrics from one pass
    Plan {
        /// Request file (reads stdin if omitted)
        #[arg(short, long)]
        input: Option<PathBuf>,
    },

    /// Print the active task catalog in scheduling order
    Catalog,
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "u_caseload=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            let code: u8 = match err.downcast_ref::<Error>() {
                Some(e) if e.is_validation() => 2,
                _ => 1,
            };
            let message = format!("{err:#}");
            match serde_json::to_string(&ErrorBody::new(message.as_str())) {
                Ok(body) => eprintln!("{body}"),
                Err(_) => eprintln!("{message}"),
            }
            ExitCode::from(code)
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<String> {
    let config = EngineConfig::resolve(cli.config.as_deref()).context("loading engine config")?;
    let engine = CaseloadEngine::new(config)?;
    info!(
        task_types = engine.config().catalog.len(),
        rules = engine.config().reservations.rules().len(),
        "engine ready"
    );

    match &cli.command {
        Command::Schedule { input } => {
            let outcome = engine.run(&read_request(input.as_deref())?)?;
            render(&ScheduleBody::from(&outcome.plan), cli.pretty)
        }
        Command::Summary { input } => {
            let outcome = engine.run(&read_request(input.as_deref())?)?;
            render(&SummaryBody::from(&outcome.metrics), cli.pretty)
        }
        Command::Plan { input } => {
            let outcome = engine.run(&read_request(input.as_deref())?)?;
            render(&PlanBody::from(&outcome), cli.pretty)
        }
        Command::Catalog => render(&engine.config().catalog.ordered(), cli.pretty),
    }
}

fn read_request(input: Option<&Path>) -> anyhow::Result<u_caseload::scheduler::ScheduleRequest> {
    let text = match input {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("reading request from {}", path.display()))?,
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("reading request from stdin")?;
            buf
        }
    };
    debug!(bytes = text.len(), "request read");

    let body: RequestBody = serde_json::from_str(&text).map_err(Error::from)?;
    Ok(body.to_request().map_err(Error::Validation)?)
}

fn render<T: Serialize + ?Sized>(value: &T, pretty: bool) -> anyhow::Result<String> {
    let text = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(text)
}
