//! # Newswire Sim
//!
//! Simulates a set of independent news sources. Each source periodically
//! emits an article in one of three wire formats (JSON, XML-like, HTML-like);
//! the article is normalized into a canonical `{title, date, content}` record
//! and forwarded to a central sink that logs it.
//!
//! ## Usage
//!
//! ```sh
//! newswire_sim --sources Madrid,Londres,"Sao Paulo" --run-for 30
//! ```
//!
//! ## Architecture
//!
//! 1. **Configuration**: defaults, optional YAML file, CLI overrides
//! 2. **Fan-out**: one tokio task per source ([`orchestrator::run`])
//! 3. **Per source**: wait → maybe fail → generate → standardize → sink
//! 4. **Sink**: a single drain task writes one record per delivered article
//!
//! The run stops on Ctrl-C, after `--run-for` seconds, or when every source
//! has reached `--max-cycles`.

use clap::Parser;
use std::error::Error;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod config;
mod generator;
mod models;
mod orchestrator;
mod randomness;
mod simulator;
mod sink;
mod standardizer;
mod utils;

use cli::Cli;
use config::SimulationConfig;
use sink::CentralSink;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("newswire_sim starting up");

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    let config = SimulationConfig::load(args.config.as_deref())
        .await?
        .with_overrides(&args);
    if let Err(e) = config.validate() {
        error!(error = %e, "Refusing to start with invalid configuration");
        return Err(e.into());
    }
    let sources = config.source_identities();
    info!(
        sources = ?sources.iter().map(|s| s.as_str()).collect::<Vec<_>>(),
        min_delay_ms = config.min_delay_ms,
        max_delay_ms = config.max_delay_ms,
        failure_probability = config.failure_probability,
        sink = %config.sink_name,
        "Configuration loaded"
    );

    // ---- Cancellation: Ctrl-C and optional deadline ----
    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => info!("Interrupt received; stopping sources"),
                Err(e) => warn!(error = %e, "Could not listen for Ctrl-C"),
            }
            cancel.cancel();
        });
    }
    if let Some(secs) = args.run_for {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(secs)).await;
            info!(secs, "Run duration elapsed; stopping sources");
            cancel.cancel();
        });
    }

    // ---- Sink + sources ----
    let (sink, rx) = CentralSink::channel();
    let drain = tokio::spawn(sink::drain(rx, config.sink_name.clone(), config.output));

    let reports = orchestrator::run(&sources, Arc::new(config), sink, cancel).await;
    let written = drain.await?;

    let attempts: u64 = reports.iter().map(|r| r.attempts).sum();
    let delivered: u64 = reports.iter().map(|r| r.delivered).sum();
    for report in &reports {
        debug!(report = %serde_json::to_string(report)?, "Source report");
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        sources = reports.len(),
        attempts,
        delivered,
        written,
        "Execution complete"
    );

    Ok(())
}
