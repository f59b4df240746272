//! Data models for simulated wire articles and their normalized representation.
//!
//! This module defines the core data structures used throughout the application:
//! - [`FormatTag`]: The wire encoding of a raw article (JSON, XML-like, HTML-like)
//! - [`SourceIdentity`]: The name of a simulated news source
//! - [`ArticleDraft`]: The title/date/body triple a source writes before encoding
//! - [`RawArticle`]: An encoded payload tagged with its format
//! - [`CanonicalArticle`]: The normalized record delivered to the central sink
//! - [`Delivery`]: A canonical article attributed to the source that produced it

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The wire format a [`RawArticle`] is encoded in.
///
/// The tag decides which extraction strategy the standardizer applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatTag {
    /// `{"title": …, "date": …, "body": …}`
    Json,
    /// `<news><title>…</title><date>…</date><body>…</body></news>`
    Xml,
    /// `<html><h1>…</h1><p>…</p><div>…</div></html>`
    Html,
}

impl FormatTag {
    /// Every supported format, in a stable order.
    pub const ALL: [FormatTag; 3] = [FormatTag::Json, FormatTag::Xml, FormatTag::Html];

    pub fn as_str(&self) -> &'static str {
        match self {
            FormatTag::Json => "json",
            FormatTag::Xml => "xml",
            FormatTag::Html => "html",
        }
    }
}

impl fmt::Display for FormatTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FormatTag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(FormatTag::Json),
            "xml" => Ok(FormatTag::Xml),
            "html" => Ok(FormatTag::Html),
            other => Err(format!("unknown format tag: {other}")),
        }
    }
}

/// Stable name of a simulated news source (a city in the default setup).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceIdentity(String);

impl SourceIdentity {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SourceIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SourceIdentity {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// The content triple a source writes before it is put on the wire.
///
/// Field names match the JSON wire keys.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ArticleDraft {
    pub title: String,
    /// ISO-8601 timestamp, UTC, no offset suffix.
    pub date: String,
    pub body: String,
}

/// An encoded, not-yet-parsed article.
///
/// Consumed exactly once by the standardizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawArticle {
    /// Encoding of `payload`.
    pub format: FormatTag,
    /// The encoded text as it came off the wire.
    pub payload: String,
}

impl RawArticle {
    pub fn new(format: FormatTag, payload: impl Into<String>) -> Self {
        Self {
            format,
            payload: payload.into(),
        }
    }
}

/// A normalized article.
///
/// All three fields are always populated; a payload that cannot provide
/// them never becomes a `CanonicalArticle`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CanonicalArticle {
    pub title: String,
    pub date: String,
    pub content: String,
}

/// A canonical article on its way to the central sink, attributed to its source.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Delivery {
    pub source: SourceIdentity,
    pub article: CanonicalArticle,
}
