//! crates/seo_booster_core/src/domain.rs
//!
//! Defines the core data structures for the application: the single user
//! record, its bounded history log and the analysis results stored in it.
//!
//! Value types that cross the wire (modes, results) carry their serde names
//! here; the persisted layout of the record itself lives in `persisted.rs`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The maximum number of history entries retained on a user record.
pub const HISTORY_LIMIT: usize = 50;

/// The default number of requests a free-tier user may make.
pub const DEFAULT_FREE_TIER_LIMIT: u32 = 5;

//=========================================================================================
// Analysis Modes, Languages and Tones
//=========================================================================================

/// One of the four supported content-generation operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AnalysisType {
    Keywords,
    Improve,
    Competitor,
    Suggestion,
}

impl AnalysisType {
    /// Whether the generator answers this mode with free text rather than JSON.
    pub fn is_free_text(self) -> bool {
        matches!(self, AnalysisType::Improve | AnalysisType::Suggestion)
    }

    /// Competitor analysis is only offered to premium users.
    pub fn requires_premium(self) -> bool {
        matches!(self, AnalysisType::Competitor)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AnalysisType::Keywords => "KEYWORDS",
            AnalysisType::Improve => "IMPROVE",
            AnalysisType::Competitor => "COMPETITOR",
            AnalysisType::Suggestion => "SUGGESTION",
        }
    }
}

impl fmt::Display for AnalysisType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The language the generated content is written in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lang {
    #[default]
    En,
    Fr,
}

impl Lang {
    /// The language name as it appears inside model instructions.
    pub fn display_name(self) -> &'static str {
        match self {
            Lang::En => "English",
            Lang::Fr => "French",
        }
    }
}

/// The writing tone requested for the free-text modes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    #[default]
    Professional,
    Friendly,
    Persuasive,
}

impl Tone {
    pub fn as_str(self) -> &'static str {
        match self {
            Tone::Professional => "professional",
            Tone::Friendly => "friendly",
            Tone::Persuasive => "persuasive",
        }
    }
}

//=========================================================================================
// Analysis Results
//=========================================================================================

/// How central a suggested keyword is to the analysed text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeywordCategory {
    #[serde(rename = "primary", alias = "primaire")]
    Primary,
    #[serde(rename = "secondary", alias = "secondaire")]
    Secondary,
    #[serde(rename = "long-tail", alias = "longue traîne")]
    LongTail,
}

impl KeywordCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            KeywordCategory::Primary => "primary",
            KeywordCategory::Secondary => "secondary",
            KeywordCategory::LongTail => "long-tail",
        }
    }
}

/// A single suggested SEO keyword.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keyword {
    pub word: String,
    pub category: KeywordCategory,
    pub reason: String,
}

/// A competitor (or competitor archetype) and how to out-rank it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Competitor {
    pub name: String,
    pub strategy: String,
    pub keywords: Vec<String>,
    pub weakness: String,
}

/// The outcome of one analysis. Exactly one variant is ever populated.
///
/// Serialized as a single-key object: `{"keywords": [...]}`,
/// `{"improvedText": "..."}` or `{"competitors": [...]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AnalysisResult {
    Keywords(Vec<Keyword>),
    ImprovedText(String),
    Competitors(Vec<Competitor>),
}

//=========================================================================================
// User Record and History
//=========================================================================================

/// A retained record of one past request and its result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub id: String,
    pub analysis_type: AnalysisType,
    pub input_text: String,
    pub result: AnalysisResult,
    pub created_at: DateTime<Utc>,
}

/// The single user record: tier flag, request counter and bounded history.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserRecord {
    pub is_premium: bool,
    pub request_count: u32,
    /// Most recent first, never longer than [`HISTORY_LIMIT`].
    pub history: Vec<HistoryEntry>,
    pub email: Option<String>,
}
