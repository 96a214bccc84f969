//! services/api/src/web/protocol.rs
//!
//! Defines the JSON payloads exchanged between the browser UI and the local
//! API service.

use seo_booster_core::{
    AnalysisResult, AnalysisType, HistoryEntry, Lang, Quota, SessionStore, Submission, Tone,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

//=========================================================================================
// Payloads Sent FROM the Client (Browser) TO the Server
//=========================================================================================

/// A request to run one analysis.
#[derive(Deserialize, Debug, ToSchema)]
pub struct AnalyzeRequest {
    /// `KEYWORDS`, `IMPROVE`, `COMPETITOR` or `SUGGESTION`.
    #[serde(rename = "type")]
    #[schema(value_type = String, example = "KEYWORDS")]
    pub analysis_type: AnalysisType,
    pub text: String,
    /// `en` (default) or `fr`.
    #[serde(default)]
    #[schema(value_type = String, example = "en")]
    pub language: Lang,
    /// `professional` (default), `friendly` or `persuasive`. Ignored for free users.
    #[serde(default)]
    #[schema(value_type = String, example = "professional")]
    pub tone: Tone,
}

impl From<AnalyzeRequest> for Submission {
    fn from(req: AnalyzeRequest) -> Self {
        Submission {
            analysis_type: req.analysis_type,
            text: req.text,
            language: req.language,
            tone: req.tone,
        }
    }
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct UpgradeRequest {
    pub email: String,
}

//=========================================================================================
// Payloads Sent FROM the Server TO the Client (Browser)
//=========================================================================================

#[derive(Serialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuotaView {
    pub unlimited: bool,
    /// Absent for premium users.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining: Option<u32>,
    pub limit: u32,
}

#[derive(Serialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntryView {
    pub id: String,
    #[serde(rename = "type")]
    #[schema(value_type = String)]
    pub analysis_type: AnalysisType,
    pub input: String,
    /// Exactly one of `keywords`, `improvedText` or `competitors`.
    #[schema(value_type = Object)]
    pub result: AnalysisResult,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
}

impl From<&HistoryEntry> for HistoryEntryView {
    fn from(entry: &HistoryEntry) -> Self {
        Self {
            id: entry.id.clone(),
            analysis_type: entry.analysis_type,
            input: entry.input_text.clone(),
            result: entry.result.clone(),
            timestamp: entry.created_at.timestamp_millis(),
        }
    }
}

/// The full user record as the UI renders it.
#[derive(Serialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub is_premium: bool,
    pub request_count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub quota: QuotaView,
    pub history: Vec<HistoryEntryView>,
}

impl UserView {
    pub fn from_store(store: &SessionStore) -> Self {
        let record = store.record();
        let quota = match store.quota_remaining() {
            Quota::Unlimited => QuotaView {
                unlimited: true,
                remaining: None,
                limit: store.free_tier_limit(),
            },
            Quota::Remaining(n) => QuotaView {
                unlimited: false,
                remaining: Some(n),
                limit: store.free_tier_limit(),
            },
        };

        Self {
            is_premium: record.is_premium,
            request_count: record.request_count,
            email: record.email.clone(),
            quota,
            history: record.history.iter().map(HistoryEntryView::from).collect(),
        }
    }
}

/// The result of a successful analysis plus the updated record.
#[derive(Serialize, Debug, ToSchema)]
pub struct AnalyzeResponse {
    pub entry: HistoryEntryView,
    pub user: UserView,
}
