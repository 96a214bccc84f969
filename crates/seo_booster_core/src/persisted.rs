//! crates/seo_booster_core/src/persisted.rs
//!
//! The on-disk layout of the user record and the validation step that turns
//! untrusted stored bytes back into a domain `UserRecord`.
//!
//! Layout: `{ isPremium, requestCount, history: [{id, type, input, result,
//! timestamp}], email? }` with `timestamp` in milliseconds since the epoch.

use chrono::{TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{AnalysisResult, AnalysisType, HistoryEntry, UserRecord, HISTORY_LIMIT};

/// Why a stored record could not be trusted.
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("stored record is not valid JSON of the expected shape: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("history entry '{id}' is invalid: {reason}")]
    InvalidEntry { id: String, reason: String },
}

//=========================================================================================
// "Impure" Persisted Record Structs
//=========================================================================================

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct PersistedUser {
    is_premium: bool,
    request_count: u32,
    history: Vec<PersistedEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    email: Option<String>,
}

#[derive(Serialize, Deserialize)]
struct PersistedEntry {
    id: String,
    #[serde(rename = "type")]
    analysis_type: AnalysisType,
    input: String,
    result: AnalysisResult,
    timestamp: i64,
}

impl PersistedEntry {
    fn from_domain(entry: &HistoryEntry) -> Self {
        Self {
            id: entry.id.clone(),
            analysis_type: entry.analysis_type,
            input: entry.input_text.clone(),
            result: entry.result.clone(),
            timestamp: entry.created_at.timestamp_millis(),
        }
    }

    fn to_domain(self) -> Result<HistoryEntry, RecordError> {
        let created_at = Utc
            .timestamp_millis_opt(self.timestamp)
            .single()
            .ok_or_else(|| RecordError::InvalidEntry {
                id: self.id.clone(),
                reason: format!("timestamp {} is out of range", self.timestamp),
            })?;

        if !result_matches_type(&self.result, self.analysis_type) {
            return Err(RecordError::InvalidEntry {
                id: self.id,
                reason: format!("result does not belong to a {} analysis", self.analysis_type),
            });
        }

        Ok(HistoryEntry {
            id: self.id,
            analysis_type: self.analysis_type,
            input_text: self.input,
            result: self.result,
            created_at,
        })
    }
}

impl PersistedUser {
    fn from_domain(record: &UserRecord) -> Self {
        Self {
            is_premium: record.is_premium,
            request_count: record.request_count,
            history: record.history.iter().map(PersistedEntry::from_domain).collect(),
            email: record.email.clone(),
        }
    }

    fn to_domain(self) -> Result<UserRecord, RecordError> {
        let history = self
            .history
            .into_iter()
            .take(HISTORY_LIMIT)
            .map(PersistedEntry::to_domain)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(UserRecord {
            is_premium: self.is_premium,
            request_count: self.request_count,
            history,
            email: self.email,
        })
    }
}

/// Whether `result` is the variant a given analysis mode produces.
pub fn result_matches_type(result: &AnalysisResult, analysis_type: AnalysisType) -> bool {
    match (analysis_type, result) {
        (AnalysisType::Keywords, AnalysisResult::Keywords(_)) => true,
        (AnalysisType::Competitor, AnalysisResult::Competitors(_)) => true,
        (AnalysisType::Improve | AnalysisType::Suggestion, AnalysisResult::ImprovedText(_)) => true,
        _ => false,
    }
}

/// Serializes a record into its persisted JSON form.
pub fn encode_record(record: &UserRecord) -> Result<Vec<u8>, serde_json::Error> {
    serde_json::to_vec(&PersistedUser::from_domain(record))
}

/// Parses and validates stored bytes. A history longer than the retention
/// limit is cut down to its most recent entries.
pub fn decode_record(bytes: &[u8]) -> Result<UserRecord, RecordError> {
    let persisted: PersistedUser = serde_json::from_slice(bytes)?;
    persisted.to_domain()
}
