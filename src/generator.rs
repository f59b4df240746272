//! Synthetic article generation.
//!
//! Each simulated source writes an [`ArticleDraft`] and puts it on the wire in
//! one of the three [`FormatTag`] encodings. The XML-like and HTML-like
//! encodings are flat templates: nothing is escaped, so a title containing
//! `<` ends up verbatim in the payload.

use crate::models::{ArticleDraft, FormatTag, RawArticle, SourceIdentity};
use chrono::Utc;

/// Timestamp layout used for the `date` field: naive UTC with microseconds.
pub const DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

/// Produces encoded articles for a source.
///
/// The simulator only depends on this trait, so tests can feed it payloads
/// that a well-behaved source would never emit.
pub trait ArticleGenerator {
    fn generate(&self, source: &SourceIdentity, format: FormatTag) -> RawArticle;
}

/// The default generator: deterministic title and body, current UTC date.
#[derive(Debug, Clone, Copy, Default)]
pub struct SyntheticGenerator;

impl ArticleGenerator for SyntheticGenerator {
    fn generate(&self, source: &SourceIdentity, format: FormatTag) -> RawArticle {
        generate(source, format)
    }
}

/// Generate an article for `source` stamped with the current UTC time.
pub fn generate(source: &SourceIdentity, format: FormatTag) -> RawArticle {
    let date = Utc::now().naive_utc().format(DATE_FORMAT).to_string();
    encode(&draft_for(source, date), format)
}

/// Build the content triple for `source` with an explicit `date`.
pub fn draft_for(source: &SourceIdentity, date: impl Into<String>) -> ArticleDraft {
    ArticleDraft {
        title: format!("News from {source}"),
        date: date.into(),
        body: format!("Content generated from {source}."),
    }
}

/// Encode a draft in the requested wire format.
pub fn encode(draft: &ArticleDraft, format: FormatTag) -> RawArticle {
    let payload = match format {
        // A struct of three Strings always serializes.
        FormatTag::Json => serde_json::to_string(draft).unwrap_or_default(),
        FormatTag::Xml => format!(
            "<news><title>{}</title><date>{}</date><body>{}</body></news>",
            draft.title, draft.date, draft.body
        ),
        FormatTag::Html => format!(
            "<html><h1>{}</h1><p>{}</p><div>{}</div></html>",
            draft.title, draft.date, draft.body
        ),
    };
    RawArticle::new(format, payload)
}
