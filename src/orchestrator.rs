//! Fan-out of one simulator task per source.
//!
//! Each source gets its own tokio task, its own randomness, and a clone of
//! the sink handle. Sources share nothing else. [`run`] returns once every
//! task has stopped, either through the shared cancellation token or the
//! per-source cycle limit.

use crate::config::SimulationConfig;
use crate::generator::SyntheticGenerator;
use crate::models::SourceIdentity;
use crate::randomness::SeededRandomness;
use crate::simulator::{SourceReport, SourceSimulator};
use crate::sink::ArticleSink;
use futures::future::join_all;
use itertools::Itertools;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, instrument};

/// Simulate every unique source in `sources` concurrently.
///
/// A source task that panics is logged and left out of the returned
/// reports; the other sources keep running.
#[instrument(level = "info", skip_all, fields(sources = sources.len()))]
pub async fn run<S>(
    sources: &[SourceIdentity],
    config: Arc<SimulationConfig>,
    sink: S,
    cancel: CancellationToken,
) -> Vec<SourceReport>
where
    S: ArticleSink + Clone + 'static,
{
    let tasks: Vec<_> = sources
        .iter()
        .unique()
        .enumerate()
        .map(|(i, source)| {
            let rng = SeededRandomness::new(config.seed.map(|seed| seed.wrapping_add(i as u64)));
            let sim = SourceSimulator::new(
                source.clone(),
                Arc::clone(&config),
                rng,
                SyntheticGenerator,
                sink.clone(),
            );
            (source.clone(), tokio::spawn(sim.run(cancel.child_token())))
        })
        .collect();
    drop(sink);
    info!(count = tasks.len(), "Spawned source tasks");

    let results = join_all(
        tasks
            .into_iter()
            .map(|(source, task)| async move { (source, task.await) }),
    )
    .await;

    results
        .into_iter()
        .filter_map(|(source, result)| match result {
            Ok(report) => Some(report),
            Err(e) => {
                error!(%source, error = %e, "Source task failed");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Delivery;
    use crate::sink::{CentralSink, MemorySink, OutputStyle, render};
    use std::time::Duration;

    fn names(list: &[&str]) -> Vec<SourceIdentity> {
        list.iter().map(|s| SourceIdentity::new(*s)).collect()
    }

    #[tokio::test]
    async fn test_run_delivers_complete_records_from_all_sources() {
        let config = Arc::new(SimulationConfig {
            min_delay_ms: 0,
            max_delay_ms: 2,
            max_cycles: Some(25),
            seed: Some(11),
            ..SimulationConfig::default()
        });
        let sources = names(&["Madrid", "Londres", "Sao Paulo", "Lisboa"]);
        let (sink, mut rx) = CentralSink::channel();

        let reports = run(&sources, config, sink, CancellationToken::new()).await;
        assert_eq!(reports.len(), 4);
        assert!(reports.iter().all(|r| r.attempts == 25));

        let mut deliveries: Vec<Delivery> = Vec::new();
        while let Ok(d) = rx.try_recv() {
            deliveries.push(d);
        }
        let delivered: u64 = reports.iter().map(|r| r.delivered).sum();
        assert_eq!(deliveries.len() as u64, delivered);

        for d in &deliveries {
            let record = render(d, "Frankfurt", OutputStyle::Json);
            let value: serde_json::Value = serde_json::from_str(&record).unwrap();
            let source = value["source"].as_str().unwrap();
            assert!(sources.iter().any(|s| s.as_str() == source));
            assert_eq!(value["article"]["title"], format!("News from {source}"));
            assert_eq!(
                value["article"]["content"],
                format!("Content generated from {source}.")
            );
        }
    }

    #[tokio::test]
    async fn test_run_returns_on_cancellation() {
        let config = Arc::new(SimulationConfig {
            min_delay_ms: 60_000,
            max_delay_ms: 60_000,
            ..SimulationConfig::default()
        });
        let cancel = CancellationToken::new();
        let stopper = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            stopper.cancel();
        });

        let sources = names(&["Madrid", "Londres", "Sao Paulo"]);
        let reports = tokio::time::timeout(
            Duration::from_secs(5),
            run(&sources, config, MemorySink::default(), cancel),
        )
        .await
        .expect("orchestrator did not stop");

        assert_eq!(reports.len(), 3);
        assert!(reports.iter().all(|r| r.attempts == 0));
    }

    #[tokio::test]
    async fn test_duplicate_sources_run_once() {
        let config = Arc::new(SimulationConfig {
            min_delay_ms: 0,
            max_delay_ms: 0,
            max_cycles: Some(1),
            ..SimulationConfig::default()
        });
        let sources = names(&["Madrid", "Madrid", "Londres"]);
        let reports = run(&sources, config, MemorySink::default(), CancellationToken::new()).await;

        let mut ran: Vec<String> = reports.iter().map(|r| r.source.to_string()).collect();
        ran.sort();
        assert_eq!(ran, ["Londres", "Madrid"]);
    }
}
