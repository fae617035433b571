//! Paper record model and normalization of raw search items.
//!
//! The search provider returns loosely-shaped JSON items. This module parses
//! them through typed structs and converts each item into a uniform
//! [`PaperRecord`], tolerating missing or malformed fields. Items that fail
//! deserialization entirely are skipped upstream, never fatal.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

/// Abstracts are truncated to this many characters.
pub const MAX_ABSTRACT_CHARS: usize = 500;

static ARXIV_ABS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"arxiv\.org/abs/([^?#]+)").expect("valid regex literal")
});

/// The search channel a record came from.
///
/// Affects link rewriting during normalization and the bibliography entry
/// shape during export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Source {
    /// General scholarly index
    #[serde(rename = "Google Scholar")]
    Scholar,
    /// Preprint archive (arXiv-restricted search)
    #[serde(rename = "arXiv")]
    Arxiv,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scholar => write!(f, "Google Scholar"),
            Self::Arxiv => write!(f, "arXiv"),
        }
    }
}

/// One normalized paper's metadata.
///
/// Title is the uniqueness key across the whole corpus. Year is 0 when no
/// plausible publication year could be extracted; such records never pass
/// the year filter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaperRecord {
    pub title: String,
    pub authors: String,
    pub year: i32,
    pub venue: String,
    pub citations: u32,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    pub pdf_link: String,
    pub source: Source,
}

impl PaperRecord {
    /// Whether the record survives the recency and citation thresholds.
    pub fn passes(&self, min_year: i32, min_citations: u32) -> bool {
        self.year >= min_year && self.citations >= min_citations
    }
}

/// One item of the provider's `organic_results` array.
///
/// Every field is optional; normalization supplies defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct RawItem {
    pub title: Option<String>,
    pub link: Option<String>,
    pub snippet: Option<String>,
    pub inline_links: Option<InlineLinks>,
    pub publication_info: Option<PublicationInfo>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InlineLinks {
    pub cited_by: Option<CitedBy>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CitedBy {
    /// May arrive as a JSON number or a display string like `"Cited by 1,234"`.
    pub total: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PublicationInfo {
    /// Free-text summary, usually `"Authors - Venue, Year - Publisher"`.
    /// Occasionally a bare number.
    pub summary: Option<serde_json::Value>,
}

/// Convert one raw item into a uniform record.
///
/// Missing title/authors/venue default to `"Unknown"`, missing snippet to an
/// empty abstract. For the arXiv channel, abstract-page links are rewritten
/// to the canonical PDF URL and the venue is fixed to `"arXiv"`.
pub fn normalize(item: &RawItem, source: Source) -> PaperRecord {
    let title = item
        .title
        .clone()
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| "Unknown".to_string());
    let link = item.link.clone().unwrap_or_default();
    let abstract_text: String = item
        .snippet
        .as_deref()
        .unwrap_or_default()
        .chars()
        .take(MAX_ABSTRACT_CHARS)
        .collect();

    let citations = parse_citations(
        item.inline_links
            .as_ref()
            .and_then(|l| l.cited_by.as_ref())
            .and_then(|c| c.total.as_ref()),
    );

    let summary = summary_text(item.publication_info.as_ref());
    let year = parse_year(&summary);
    let (authors, summary_venue) = split_summary(&summary);

    let (venue, pdf_link) = match source {
        Source::Scholar => (summary_venue, link),
        Source::Arxiv => ("arXiv".to_string(), rewrite_arxiv_link(&link)),
    };

    PaperRecord {
        title,
        authors,
        year,
        venue,
        citations,
        abstract_text,
        pdf_link,
        source,
    }
}

/// Extract a citation count by stripping all non-digit characters.
///
/// Absent or digit-free values yield 0.
fn parse_citations(total: Option<&serde_json::Value>) -> u32 {
    let Some(value) = total else { return 0 };
    let text = match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Number(n) => n.to_string(),
        _ => return 0,
    };
    let digits: String = text.chars().filter(|c| c.is_ascii_digit()).collect();
    digits.parse().unwrap_or(0)
}

/// Scan whitespace/comma-delimited tokens for the first plausible year.
///
/// Plausible means strictly between 1900 and 2100. Returns 0 when none is
/// found, which never passes the year filter.
fn parse_year(summary: &str) -> i32 {
    summary
        .replace(',', " ")
        .split_whitespace()
        .filter(|t| !t.is_empty() && t.chars().all(|c| c.is_ascii_digit()))
        .filter_map(|t| t.parse::<i32>().ok())
        .find(|y| *y > 1900 && *y < 2100)
        .unwrap_or(0)
}

/// The publication summary may itself be a bare JSON number.
fn summary_text(info: Option<&PublicationInfo>) -> String {
    let Some(value) = info.and_then(|i| i.summary.as_ref()) else {
        return String::new();
    };
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Number(n) => n.to_string(),
        _ => String::new(),
    }
}

/// Split `"Authors - Venue, Year - Publisher"` at the first `" - "`.
fn split_summary(summary: &str) -> (String, String) {
    let (authors, venue) = match summary.split_once(" - ") {
        Some((head, rest)) => (head.trim(), rest.trim()),
        None => (summary.trim(), ""),
    };
    let authors = if authors.is_empty() {
        "Unknown".to_string()
    } else {
        authors.to_string()
    };
    let venue = if venue.is_empty() {
        "Unknown".to_string()
    } else {
        venue.to_string()
    };
    (authors, venue)
}

/// Rewrite an arXiv abstract-page link to the canonical PDF URL.
///
/// `arxiv.org/pdf/` links and anything unrecognized are kept as-is.
fn rewrite_arxiv_link(link: &str) -> String {
    if link.contains("arxiv.org/pdf/") {
        return link.to_string();
    }
    if let Some(caps) = ARXIV_ABS_RE.captures(link) {
        return format!("https://arxiv.org/pdf/{}.pdf", &caps[1]);
    }
    link.to_string()
}
