//! Core domain types for leadpipe.

use serde::{Deserialize, Serialize};

/// Provenance tag stamped on every fetched lead. Kept byte-identical across
/// versions so downstream CRM tables keyed on it keep matching.
pub const SOURCE_TAG: &str = "PubMed Automated Script";

/// Affiliation used when an article carries no affiliation at all.
pub const DEFAULT_AFFILIATION: &str = "Independent Researcher";

/// Column order of the fetcher's CSV export.
pub const LEAD_COLUMNS: [&str; 4] = ["Name", "Paper Title", "Affiliation", "Source"];

// ---------------------------------------------------------------------------
// LeadRecord
// ---------------------------------------------------------------------------

/// A single lead extracted from a PubMed article.
///
/// Serde field names are the wire/CSV names: the webhook receives these keys
/// as a flat JSON object, and the CSV export uses them as the header row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadRecord {
    /// Last-listed author's given + family name, trimmed. May be empty.
    #[serde(rename = "Name")]
    pub name: String,

    /// Article title; absent in some records.
    #[serde(rename = "Paper Title")]
    pub paper_title: Option<String>,

    /// First affiliation found in the article, or [`DEFAULT_AFFILIATION`].
    #[serde(rename = "Affiliation")]
    pub affiliation: String,

    /// Constant provenance tag ([`SOURCE_TAG`]).
    #[serde(rename = "Source")]
    pub source: String,
}
