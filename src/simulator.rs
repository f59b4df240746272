//! Per-source simulation loop.
//!
//! Each source cycles through a small state machine until it is cancelled
//! or reaches its configured cycle limit:
//!
//! ```text
//! Idle ─▶ Waiting ─▶ Fetching ─┬─▶ Succeeded ─┐
//!            ▲                 └─▶ Failed ────┤
//!            └────────────────────────────────┘
//! ```
//!
//! - **Waiting**: sleep for a random delay within the configured interval
//! - **Fetching**: with the configured probability the source is down;
//!   otherwise pick a format, generate, and standardize
//! - **Succeeded**: the canonical article went to the sink
//! - **Failed**: outage or parse failure, logged and forgotten
//!
//! Cycles are independent. There is no retry and no backoff; the next cycle
//! simply tries again.

use crate::config::SimulationConfig;
use crate::generator::ArticleGenerator;
use crate::models::SourceIdentity;
use crate::randomness::Randomness;
use crate::sink::ArticleSink;
use crate::standardizer::standardize_or_log;
use serde::Serialize;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceState {
    Idle,
    Waiting,
    Fetching,
    Succeeded,
    Failed,
}

/// What a single fetch cycle produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    Delivered,
    FetchFailed,
    ParseFailed,
}

/// Per-source counters, returned when the source stops.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceReport {
    pub source: SourceIdentity,
    pub attempts: u64,
    pub delivered: u64,
    pub fetch_failures: u64,
    pub parse_failures: u64,
}

impl SourceReport {
    pub fn new(source: SourceIdentity) -> Self {
        Self {
            source,
            attempts: 0,
            delivered: 0,
            fetch_failures: 0,
            parse_failures: 0,
        }
    }

    pub fn record(&mut self, outcome: CycleOutcome) {
        self.attempts += 1;
        match outcome {
            CycleOutcome::Delivered => self.delivered += 1,
            CycleOutcome::FetchFailed => self.fetch_failures += 1,
            CycleOutcome::ParseFailed => self.parse_failures += 1,
        }
    }
}

/// One simulated news source.
pub struct SourceSimulator<R, G, S> {
    source: SourceIdentity,
    config: Arc<SimulationConfig>,
    rng: R,
    generator: G,
    sink: S,
    state: SourceState,
}

impl<R, G, S> SourceSimulator<R, G, S>
where
    R: Randomness,
    G: ArticleGenerator + Send,
    S: ArticleSink,
{
    pub fn new(
        source: SourceIdentity,
        config: Arc<SimulationConfig>,
        rng: R,
        generator: G,
        sink: S,
    ) -> Self {
        Self {
            source,
            config,
            rng,
            generator,
            sink,
            state: SourceState::Idle,
        }
    }

    pub fn state(&self) -> SourceState {
        self.state
    }

    /// Run the Fetching step once and settle in Succeeded or Failed.
    pub fn fetch_once(&mut self) -> CycleOutcome {
        self.state = SourceState::Fetching;

        if self.rng.fetch_fails(self.config.failure_probability) {
            warn!(source = %self.source, reason = "source unavailable", "No data obtained from source");
            self.state = SourceState::Failed;
            return CycleOutcome::FetchFailed;
        }

        let format = self.rng.format();
        let raw = self.generator.generate(&self.source, format);
        debug!(source = %self.source, %format, bytes = raw.payload.len(), "Generated article");

        match standardize_or_log(&raw, &self.source) {
            Some(article) => {
                self.sink.receive(article, &self.source);
                self.state = SourceState::Succeeded;
                CycleOutcome::Delivered
            }
            None => {
                self.state = SourceState::Failed;
                CycleOutcome::ParseFailed
            }
        }
    }

    /// Cycle until `cancel` fires or the cycle limit is reached.
    #[instrument(level = "info", skip_all, fields(source = %self.source))]
    pub async fn run(mut self, cancel: CancellationToken) -> SourceReport {
        let mut report = SourceReport::new(self.source.clone());
        let (min, max) = (self.config.min_delay(), self.config.max_delay());
        info!("Source started");

        loop {
            if self.config.max_cycles.is_some_and(|limit| report.attempts >= limit) {
                debug!(attempts = report.attempts, "Cycle limit reached");
                break;
            }

            self.state = SourceState::Waiting;
            let delay = self.rng.delay(min, max);
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    debug!("Cancellation received");
                    break;
                }
                _ = tokio::time::sleep(delay) => {}
            }

            let outcome = self.fetch_once();
            debug!(state = ?self.state(), ?outcome, "Cycle finished");
            report.record(outcome);
        }

        self.state = SourceState::Idle;
        info!(
            attempts = report.attempts,
            delivered = report.delivered,
            fetch_failures = report.fetch_failures,
            parse_failures = report.parse_failures,
            "Source stopped"
        );
        report
    }
}
