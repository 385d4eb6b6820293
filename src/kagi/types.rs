//! Kagi API request and result types

use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of results requested when the caller gives no usable limit
pub const DEFAULT_SEARCH_LIMIT: u32 = 5;

/// A bound `kagi_search` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    /// Query text, never empty
    pub text: String,
    /// Result limit; `0` leaves the limit to the API
    pub limit: u32,
}

impl SearchQuery {
    /// Query with the default limit
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            limit: DEFAULT_SEARCH_LIMIT,
        }
    }

    /// Override the limit
    #[must_use]
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }
}

/// One organic search result
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SearchResultItem {
    pub title: String,
    pub url: String,
    pub snippet: String,
    /// Publication date as sent by Kagi; empty when unknown
    pub published_at: String,
}

/// Everything a search returned, in API order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SearchOutcome {
    pub items: Vec<SearchResultItem>,
    pub related_terms: Vec<String>,
}

/// Universal Summarizer engine
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummaryEngine {
    /// Friendly, descriptive, fast summary
    Cecil,
    /// Formal, technical, analytical summary
    #[default]
    Agnes,
    /// Best-in-class summary using an enterprise-grade model
    Muriel,
}

impl SummaryEngine {
    /// Every engine, in schema order
    pub const ALL: [SummaryEngine; 3] = [Self::Cecil, Self::Agnes, Self::Muriel];

    /// Wire name
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cecil => "cecil",
            Self::Agnes => "agnes",
            Self::Muriel => "muriel",
        }
    }
}

impl FromStr for SummaryEngine {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|engine| engine.as_str() == s)
            .ok_or_else(|| {
                Error::InvalidParameter(format!(
                    "invalid engine parameter: {s} (expected one of cecil, agnes, muriel)"
                ))
            })
    }
}

impl fmt::Display for SummaryEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shape of the summarizer output
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummaryType {
    /// Paragraph(s) of prose
    #[default]
    Summary,
    /// Bulleted list of key points
    Takeaway,
}

impl SummaryType {
    /// Every summary type, in schema order
    pub const ALL: [SummaryType; 2] = [Self::Summary, Self::Takeaway];

    /// Wire name
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Summary => "summary",
            Self::Takeaway => "takeaway",
        }
    }
}

impl FromStr for SummaryType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| {
                Error::InvalidParameter(format!(
                    "invalid summary_type parameter: {s} (expected one of summary, takeaway)"
                ))
            })
    }
}

impl fmt::Display for SummaryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A bound `kagi_summarize` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummarizeRequest {
    pub target_url: String,
    pub engine: SummaryEngine,
    pub summary_type: SummaryType,
}

impl SummarizeRequest {
    /// Request with the default engine and summary type
    #[must_use]
    pub fn new(target_url: impl Into<String>) -> Self {
        Self {
            target_url: target_url.into(),
            engine: SummaryEngine::default(),
            summary_type: SummaryType::default(),
        }
    }
}

/// Summarizer output, verbatim
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SummaryOutcome {
    pub text: String,
}

/// `GET /api/v0/search` response body
#[derive(Debug, Deserialize)]
pub(crate) struct SearchEnvelope {
    #[serde(default)]
    pub data: Option<Vec<SearchEntry>>,
}

/// One entry of the flat `data` array, tagged by `t`
#[derive(Debug, Deserialize)]
pub(crate) struct SearchEntry {
    #[serde(default)]
    pub t: i64,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub snippet: Option<String>,
    #[serde(default)]
    pub published: Option<String>,
    #[serde(default)]
    pub list: Option<Vec<String>>,
}

/// Discriminant of an organic result
const ENTRY_RESULT: i64 = 0;
/// Discriminant of a related-searches list
const ENTRY_RELATED: i64 = 1;

impl From<SearchEnvelope> for SearchOutcome {
    fn from(envelope: SearchEnvelope) -> Self {
        let mut outcome = SearchOutcome::default();

        for entry in envelope.data.unwrap_or_default() {
            match entry.t {
                ENTRY_RESULT => outcome.items.push(SearchResultItem {
                    title: entry.title.unwrap_or_default(),
                    url: entry.url.unwrap_or_default(),
                    snippet: entry.snippet.unwrap_or_default(),
                    published_at: entry.published.unwrap_or_default(),
                }),
                // Last list wins when Kagi sends more than one.
                ENTRY_RELATED => outcome.related_terms = entry.list.unwrap_or_default(),
                other => tracing::debug!(discriminant = other, "skipping unknown search entry"),
            }
        }

        outcome
    }
}

/// `GET /api/v0/summarize` response body
#[derive(Debug, Deserialize)]
pub(crate) struct SummaryEnvelope {
    #[serde(default)]
    pub data: Option<SummaryData>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SummaryData {
    #[serde(default)]
    pub output: Option<String>,
}

impl From<SummaryEnvelope> for SummaryOutcome {
    fn from(envelope: SummaryEnvelope) -> Self {
        Self {
            text: envelope
                .data
                .and_then(|data| data.output)
                .unwrap_or_default(),
        }
    }
}
