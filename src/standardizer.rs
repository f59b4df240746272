//! Normalization of wire articles into [`CanonicalArticle`] records.
//!
//! JSON payloads are decoded with `serde_json`. The XML-like and HTML-like
//! payloads are not parsed as markup: each field is the text between the
//! first occurrence of its opening marker and the first occurrence of the
//! closing marker after it.
//!
//! | Format | title | date | content |
//! |--------|-------|------|---------|
//! | JSON | `title` | `date` | `body` |
//! | XML | `<title>` | `<date>` | `<body>` |
//! | HTML | `<h1>` | `<p>` | `<div>` |

use crate::models::{ArticleDraft, CanonicalArticle, FormatTag, RawArticle, SourceIdentity};
use crate::utils::truncate_for_log;
use tracing::{instrument, warn};

/// Why a payload could not be normalized.
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum ParseError {
    /// The JSON payload is malformed or lacks one of the required keys.
    #[error("invalid json payload: {0}")]
    Json(#[from] serde_json::Error),
    /// A marker pair is absent from an XML-like or HTML-like payload.
    #[error("missing {open}…{close} in {format} payload")]
    MissingMarker {
        format: FormatTag,
        open: &'static str,
        close: &'static str,
    },
}

/// Normalize `raw` according to its format tag.
pub fn standardize(raw: &RawArticle) -> Result<CanonicalArticle, ParseError> {
    match raw.format {
        FormatTag::Json => {
            let draft: ArticleDraft = serde_json::from_str(&raw.payload)?;
            Ok(CanonicalArticle {
                title: draft.title,
                date: draft.date,
                content: draft.body,
            })
        }
        FormatTag::Xml => Ok(CanonicalArticle {
            title: extract(raw, "<title>", "</title>")?,
            date: extract(raw, "<date>", "</date>")?,
            content: extract(raw, "<body>", "</body>")?,
        }),
        FormatTag::Html => Ok(CanonicalArticle {
            title: extract(raw, "<h1>", "</h1>")?,
            date: extract(raw, "<p>", "</p>")?,
            content: extract(raw, "<div>", "</div>")?,
        }),
    }
}

/// Normalize `raw`, logging a failure instead of returning it.
///
/// `None` means the cycle produced nothing for the sink.
#[instrument(level = "debug", skip_all, fields(%source, format = %raw.format))]
pub fn standardize_or_log(raw: &RawArticle, source: &SourceIdentity) -> Option<CanonicalArticle> {
    match standardize(raw) {
        Ok(article) => Some(article),
        Err(e) => {
            warn!(
                %source,
                reason = %e,
                payload_preview = %truncate_for_log(&raw.payload, 120),
                "Failed to standardize article"
            );
            None
        }
    }
}

/// Text after the first `open` and before the first `close` that follows it.
fn extract(
    raw: &RawArticle,
    open: &'static str,
    close: &'static str,
) -> Result<String, ParseError> {
    let missing = || ParseError::MissingMarker {
        format: raw.format,
        open,
        close,
    };
    let (_, after_open) = raw.payload.split_once(open).ok_or_else(missing)?;
    let (value, _) = after_open.split_once(close).ok_or_else(missing)?;
    Ok(value.to_string())
}
