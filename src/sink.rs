//! The central sink standing in for the remote aggregator.
//!
//! Sources never write output themselves. [`CentralSink::receive`] hands the
//! attributed article to an unbounded channel and returns immediately; a
//! single [`drain`] task owns the output and renders one record per
//! delivery, so records from concurrent sources cannot interleave.
//!
//! # Record Layout
//!
//! ```text
//! [Madrid → Frankfurt] Article received:
//! {
//!   "title": "News from Madrid",
//!   "date": "2025-05-06T14:30:00.123456",
//!   "content": "Content generated from Madrid."
//! }
//! ```
//!
//! With [`OutputStyle::Json`] the same record is a single line:
//! `{"source":"Madrid","sink":"Frankfurt","article":{…}}`.

use crate::models::{CanonicalArticle, Delivery, SourceIdentity};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, info, instrument};

/// Destination for canonical articles.
///
/// Implementations must return promptly and never fail back into the source.
pub trait ArticleSink: Send + Sync {
    fn receive(&self, article: CanonicalArticle, source: &SourceIdentity);
}

/// How the drain task renders each record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputStyle {
    /// Header line followed by the indented article.
    #[default]
    Pretty,
    /// One compact JSON object per record.
    Json,
}

/// Channel-backed sink handle. Cheap to clone; one clone per source task.
#[derive(Debug, Clone)]
pub struct CentralSink {
    tx: mpsc::UnboundedSender<Delivery>,
}

impl CentralSink {
    /// Create a sink and the receiver its [`drain`] task consumes.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Delivery>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl ArticleSink for CentralSink {
    fn receive(&self, article: CanonicalArticle, source: &SourceIdentity) {
        let delivery = Delivery {
            source: source.clone(),
            article,
        };
        if self.tx.send(delivery).is_err() {
            debug!(%source, "Central sink closed; dropping article");
        }
    }
}

#[derive(Serialize)]
struct JsonRecord<'a> {
    source: &'a SourceIdentity,
    sink: &'a str,
    article: &'a CanonicalArticle,
}

/// Render one delivery as a complete output record.
pub fn render(delivery: &Delivery, sink_name: &str, style: OutputStyle) -> String {
    match style {
        OutputStyle::Pretty => {
            let body = serde_json::to_string_pretty(&delivery.article).unwrap_or_default();
            format!(
                "[{} → {}] Article received:\n{}",
                delivery.source, sink_name, body
            )
        }
        OutputStyle::Json => serde_json::to_string(&JsonRecord {
            source: &delivery.source,
            sink: sink_name,
            article: &delivery.article,
        })
        .unwrap_or_default(),
    }
}

/// Consume deliveries until every [`CentralSink`] clone is dropped.
///
/// Returns the number of records written.
#[instrument(level = "info", skip_all, fields(sink = %sink_name, ?style))]
pub async fn drain(
    mut rx: mpsc::UnboundedReceiver<Delivery>,
    sink_name: String,
    style: OutputStyle,
) -> u64 {
    let mut written = 0u64;
    while let Some(delivery) = rx.recv().await {
        let record = render(&delivery, &sink_name, style);
        info!(target: "central", source = %delivery.source, "{record}");
        written += 1;
    }
    info!(written, "Central sink drained");
    written
}

/// In-memory sink used by tests to observe what the sources deliver.
#[cfg(test)]
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    pub deliveries: std::sync::Arc<std::sync::Mutex<Vec<Delivery>>>,
}

#[cfg(test)]
impl MemorySink {
    pub fn taken(&self) -> Vec<Delivery> {
        self.deliveries.lock().unwrap().clone()
    }
}

#[cfg(test)]
impl ArticleSink for MemorySink {
    fn receive(&self, article: CanonicalArticle, source: &SourceIdentity) {
        self.deliveries.lock().unwrap().push(Delivery {
            source: source.clone(),
            article,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn delivery(source: &str) -> Delivery {
        Delivery {
            source: SourceIdentity::new(source),
            article: CanonicalArticle {
                title: format!("News from {source}"),
                date: "2024-01-01T00:00:00".to_string(),
                content: format!("Content generated from {source}."),
            },
        }
    }

    #[test]
    fn test_render_pretty_has_header_and_fields() {
        let record = render(&delivery("Madrid"), "Frankfurt", OutputStyle::Pretty);
        let (header, body) = record.split_once('\n').unwrap();
        assert_eq!(header, "[Madrid → Frankfurt] Article received:");

        let article: CanonicalArticle = serde_json::from_str(body).unwrap();
        assert_eq!(article.title, "News from Madrid");
    }

    #[test]
    fn test_render_json_is_single_line() {
        let record = render(&delivery("Sao Paulo"), "Frankfurt", OutputStyle::Json);
        assert!(!record.contains('\n'));

        let value: serde_json::Value = serde_json::from_str(&record).unwrap();
        assert_eq!(value["source"], "Sao Paulo");
        assert_eq!(value["sink"], "Frankfurt");
        assert_eq!(value["article"]["content"], "Content generated from Sao Paulo.");
    }

    #[tokio::test]
    async fn test_drain_counts_until_senders_dropped() {
        let (sink, rx) = CentralSink::channel();
        let drain_task = tokio::spawn(drain(rx, "Frankfurt".to_string(), OutputStyle::Json));

        let other = sink.clone();
        let d = delivery("Londres");
        sink.receive(d.article.clone(), &d.source);
        other.receive(d.article.clone(), &d.source);
        drop(sink);
        drop(other);

        assert_eq!(drain_task.await.unwrap(), 2);
    }

    #[test]
    fn test_receive_after_close_is_silent() {
        let (sink, rx) = CentralSink::channel();
        drop(rx);
        let d = delivery("Madrid");
        sink.receive(d.article, &d.source);
    }
}
