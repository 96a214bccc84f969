//! crates/seo_booster_core/src/session.rs
//!
//! The Session State Store: owns the single `UserRecord`, exposes its
//! mutation operations and writes the whole record back to storage after
//! each of them.
//!
//! Persistence is explicit. `load` reads once at startup and every mutating
//! method ends with `save`. The store itself is not synchronized; callers that
//! share it between tasks wrap it in a `tokio::sync::Mutex`.

use chrono::{SubsecRound, Utc};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::domain::{AnalysisResult, AnalysisType, HistoryEntry, UserRecord, HISTORY_LIMIT};
use crate::persisted::{decode_record, encode_record};
use crate::ports::RecordStorage;
use crate::quota::{self, Quota};

/// How the record came to be in memory after `load`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// A valid record was read back from storage.
    Restored,
    /// Nothing usable was stored; the default record is in use.
    Defaulted(DefaultReason),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefaultReason {
    Absent,
    ReadFailed(String),
    Invalid(String),
}

pub struct SessionStore {
    storage: Arc<dyn RecordStorage>,
    key: String,
    free_tier_limit: u32,
    record: UserRecord,
}

impl SessionStore {
    /// Reads the persisted record under `key`. Never fails: an absent,
    /// unreadable or invalid record is replaced by the default one.
    pub async fn load(
        storage: Arc<dyn RecordStorage>,
        key: impl Into<String>,
        free_tier_limit: u32,
    ) -> (Self, LoadOutcome) {
        let key = key.into();
        let (record, outcome) = match storage.read(&key).await {
            Ok(Some(bytes)) => match decode_record(&bytes) {
                Ok(record) => (record, LoadOutcome::Restored),
                Err(e) => {
                    warn!("Stored user record is invalid, using defaults: {}", e);
                    (
                        UserRecord::default(),
                        LoadOutcome::Defaulted(DefaultReason::Invalid(e.to_string())),
                    )
                }
            },
            Ok(None) => (UserRecord::default(), LoadOutcome::Defaulted(DefaultReason::Absent)),
            Err(e) => {
                warn!("Failed to read stored user record, using defaults: {}", e);
                (
                    UserRecord::default(),
                    LoadOutcome::Defaulted(DefaultReason::ReadFailed(e.to_string())),
                )
            }
        };

        info!(
            premium = record.is_premium,
            requests = record.request_count,
            history = record.history.len(),
            "User record loaded ({:?})",
            outcome
        );

        let store = Self {
            storage,
            key,
            free_tier_limit,
            record,
        };
        (store, outcome)
    }

    pub fn record(&self) -> &UserRecord {
        &self.record
    }

    pub fn free_tier_limit(&self) -> u32 {
        self.free_tier_limit
    }

    pub fn entry(&self, id: &str) -> Option<&HistoryEntry> {
        self.record.history.iter().find(|entry| entry.id == id)
    }

    //=====================================================================================
    // Mutations
    //=====================================================================================

    /// Prepends a history entry for a completed analysis and counts it
    /// against the free tier.
    pub async fn record_usage(
        &mut self,
        analysis_type: AnalysisType,
        input_text: impl Into<String>,
        result: AnalysisResult,
    ) -> HistoryEntry {
        let entry = HistoryEntry {
            id: Uuid::now_v7().to_string(),
            analysis_type,
            input_text: input_text.into(),
            result,
            // Stored as epoch milliseconds.
            created_at: Utc::now().trunc_subsecs(3),
        };

        self.record.history.insert(0, entry.clone());
        self.record.history.truncate(HISTORY_LIMIT);
        if !self.record.is_premium {
            self.record.request_count = self.record.request_count.saturating_add(1);
        }

        self.save().await;
        entry
    }

    /// Removes the entry with `id`. Returns `false` (and changes nothing) if
    /// there is no such entry.
    pub async fn delete_entry(&mut self, id: &str) -> bool {
        let before = self.record.history.len();
        self.record.history.retain(|entry| entry.id != id);
        let removed = self.record.history.len() != before;

        self.save().await;
        removed
    }

    pub async fn clear_history(&mut self) {
        self.record.history.clear();
        self.save().await;
    }

    /// Marks the user premium. The request counter keeps its current value.
    pub async fn upgrade(&mut self, email: impl Into<String>) {
        self.record.is_premium = true;
        self.record.email = Some(email.into());
        self.save().await;
    }

    /// Returns the record to its defaults, discarding the email.
    pub async fn reset_all(&mut self) {
        self.record = UserRecord::default();
        self.save().await;
    }

    //=====================================================================================
    // Quota
    //=====================================================================================

    pub fn quota_remaining(&self) -> Quota {
        quota::quota_remaining(
            self.record.is_premium,
            self.record.request_count,
            self.free_tier_limit,
        )
    }

    pub fn quota_exhausted(&self) -> bool {
        quota::quota_exhausted(
            self.record.is_premium,
            self.record.request_count,
            self.free_tier_limit,
        )
    }

    //=====================================================================================
    // Persistence
    //=====================================================================================

    /// Writes the full record. A failed write is logged and the in-memory
    /// record stays authoritative.
    async fn save(&self) {
        let bytes = match encode_record(&self.record) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("Failed to serialize user record: {}", e);
                return;
            }
        };

        match self.storage.write(&self.key, &bytes).await {
            Ok(()) => debug!(bytes = bytes.len(), "User record persisted"),
            Err(e) => warn!("Failed to persist user record: {}", e),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::domain::{Keyword, KeywordCategory};
    use crate::ports::{PortError, PortResult};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    pub(crate) const KEY: &str = "seoBoosterUser";

    /// Storage held entirely in memory, with a switch to make writes fail.
    #[derive(Default)]
    pub(crate) struct MemoryStorage {
        pub(crate) items: Mutex<HashMap<String, Vec<u8>>>,
        pub(crate) fail_writes: bool,
    }

    impl MemoryStorage {
        pub(crate) fn with(key: &str, bytes: &[u8]) -> Self {
            let storage = Self::default();
            storage.items.lock().unwrap().insert(key.to_string(), bytes.to_vec());
            storage
        }
    }

    #[async_trait]
    impl RecordStorage for MemoryStorage {
        async fn read(&self, key: &str) -> PortResult<Option<Vec<u8>>> {
            Ok(self.items.lock().unwrap().get(key).cloned())
        }

        async fn write(&self, key: &str, bytes: &[u8]) -> PortResult<()> {
            if self.fail_writes {
                return Err(PortError::Unexpected("disk full".to_string()));
            }
            self.items.lock().unwrap().insert(key.to_string(), bytes.to_vec());
            Ok(())
        }
    }

    pub(crate) fn keywords_result() -> AnalysisResult {
        AnalysisResult::Keywords(vec![Keyword {
            word: "hello".to_string(),
            category: KeywordCategory::Primary,
            reason: "it is the topic".to_string(),
        }])
    }

    async fn fresh_store(limit: u32) -> (SessionStore, Arc<MemoryStorage>) {
        let storage = Arc::new(MemoryStorage::default());
        let (store, _) = SessionStore::load(storage.clone(), KEY, limit).await;
        (store, storage)
    }

    #[tokio::test]
    async fn load_without_stored_record_uses_defaults() {
        let (store, outcome) = SessionStore::load(Arc::new(MemoryStorage::default()), KEY, 5).await;

        assert_eq!(outcome, LoadOutcome::Defaulted(DefaultReason::Absent));
        assert_eq!(store.record(), &UserRecord::default());
    }

    #[tokio::test]
    async fn load_with_garbage_uses_defaults() {
        let storage = Arc::new(MemoryStorage::with(KEY, b"{not json"));
        let (store, outcome) = SessionStore::load(storage, KEY, 5).await;

        assert!(matches!(outcome, LoadOutcome::Defaulted(DefaultReason::Invalid(_))));
        assert_eq!(store.record(), &UserRecord::default());
    }

    #[tokio::test]
    async fn load_with_wrong_shape_uses_defaults() {
        let storage = Arc::new(MemoryStorage::with(
            KEY,
            br#"{"isPremium": 1, "requestCount": 3, "history": []}"#,
        ));
        let (store, outcome) = SessionStore::load(storage, KEY, 5).await;

        assert!(matches!(outcome, LoadOutcome::Defaulted(DefaultReason::Invalid(_))));
        assert_eq!(store.record().request_count, 0);
    }

    #[tokio::test]
    async fn history_is_bounded_and_most_recent_first() {
        let (mut store, _) = fresh_store(5).await;

        for i in 0..(HISTORY_LIMIT + 7) {
            store
                .record_usage(AnalysisType::Keywords, format!("input {i}"), keywords_result())
                .await;
            assert!(store.record().history.len() <= HISTORY_LIMIT);
            assert_eq!(store.record().history[0].input_text, format!("input {i}"));
        }

        assert_eq!(store.record().history.len(), HISTORY_LIMIT);
        assert_eq!(
            store.record().history.last().unwrap().input_text,
            "input 7"
        );
    }

    #[tokio::test]
    async fn entry_ids_are_unique() {
        let (mut store, _) = fresh_store(5).await;
        for _ in 0..10 {
            store.record_usage(AnalysisType::Keywords, "same", keywords_result()).await;
        }

        let mut ids: Vec<_> = store.record().history.iter().map(|e| e.id.clone()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 10);
    }

    #[tokio::test]
    async fn free_users_are_counted_premium_users_are_not() {
        let (mut store, _) = fresh_store(100).await;
        for _ in 0..7 {
            store.record_usage(AnalysisType::Keywords, "x", keywords_result()).await;
        }
        assert_eq!(store.record().request_count, 7);

        store.upgrade("me@example.com").await;
        for _ in 0..7 {
            store.record_usage(AnalysisType::Keywords, "x", keywords_result()).await;
        }
        assert_eq!(store.record().request_count, 7);
        assert_eq!(store.record().history.len(), 14);
    }

    #[tokio::test]
    async fn upgrade_keeps_counter_and_stores_email() {
        let (mut store, _) = fresh_store(5).await;
        for _ in 0..5 {
            store.record_usage(AnalysisType::Keywords, "x", keywords_result()).await;
        }
        assert!(store.quota_exhausted());

        store.upgrade("me@example.com").await;

        assert!(store.record().is_premium);
        assert_eq!(store.record().request_count, 5);
        assert_eq!(store.record().email.as_deref(), Some("me@example.com"));
        assert!(!store.quota_exhausted());
        assert_eq!(store.quota_remaining(), Quota::Unlimited);
    }

    #[tokio::test]
    async fn quota_is_exhausted_after_limit_uses() {
        let (mut store, _) = fresh_store(5).await;
        for i in 0..5 {
            assert!(!store.quota_exhausted());
            assert_eq!(store.quota_remaining(), Quota::Remaining(5 - i));
            store.record_usage(AnalysisType::Keywords, "hello", keywords_result()).await;
        }

        assert!(store.quota_exhausted());
        assert_eq!(store.quota_remaining(), Quota::Remaining(0));
    }

    #[tokio::test]
    async fn delete_missing_entry_changes_nothing() {
        let (mut store, _) = fresh_store(5).await;
        store.record_usage(AnalysisType::Keywords, "a", keywords_result()).await;
        store.record_usage(AnalysisType::Keywords, "b", keywords_result()).await;
        let before = store.record().history.clone();

        assert!(!store.delete_entry("x").await);
        assert_eq!(store.record().history, before);
    }

    #[tokio::test]
    async fn delete_entry_removes_only_that_entry() {
        let (mut store, _) = fresh_store(5).await;
        store.record_usage(AnalysisType::Keywords, "a", keywords_result()).await;
        let target = store
            .record_usage(AnalysisType::Keywords, "b", keywords_result())
            .await;
        store.record_usage(AnalysisType::Keywords, "c", keywords_result()).await;

        assert!(store.delete_entry(&target.id).await);

        let inputs: Vec<_> = store.record().history.iter().map(|e| e.input_text.as_str()).collect();
        assert_eq!(inputs, vec!["c", "a"]);
        assert_eq!(store.record().request_count, 3);
    }

    #[tokio::test]
    async fn clear_history_keeps_tier_and_counter() {
        let (mut store, _) = fresh_store(5).await;
        store.record_usage(AnalysisType::Keywords, "a", keywords_result()).await;
        store.upgrade("me@example.com").await;

        store.clear_history().await;

        assert!(store.record().history.is_empty());
        assert!(store.record().is_premium);
        assert_eq!(store.record().request_count, 1);
    }

    #[tokio::test]
    async fn reset_then_reload_equals_defaults() {
        let (mut store, storage) = fresh_store(5).await;
        store.record_usage(AnalysisType::Keywords, "a", keywords_result()).await;
        store.upgrade("me@example.com").await;

        store.reset_all().await;
        assert_eq!(store.record(), &UserRecord::default());

        let (reloaded, outcome) = SessionStore::load(storage, KEY, 5).await;
        assert_eq!(outcome, LoadOutcome::Restored);
        assert_eq!(reloaded.record(), &UserRecord::default());
    }

    #[tokio::test]
    async fn every_mutation_is_persisted() {
        let (mut store, storage) = fresh_store(5).await;
        store
            .record_usage(AnalysisType::Improve, "draft", AnalysisResult::ImprovedText("better".into()))
            .await;
        store.upgrade("me@example.com").await;

        let (reloaded, outcome) = SessionStore::load(storage, KEY, 5).await;
        assert_eq!(outcome, LoadOutcome::Restored);
        assert_eq!(reloaded.record(), store.record());
    }

    #[tokio::test]
    async fn reload_after_each_usage_matches_memory() {
        let (mut store, storage) = fresh_store(50).await;

        for i in 0..20 {
            let entry = store
                .record_usage(AnalysisType::Keywords, format!("input {i}"), keywords_result())
                .await;
            assert_eq!(entry.created_at.timestamp_subsec_nanos() % 1_000_000, 0);

            let (reloaded, outcome) = SessionStore::load(storage.clone(), KEY, 50).await;
            assert_eq!(outcome, LoadOutcome::Restored);
            assert_eq!(reloaded.record(), store.record(), "after usage {i}");
        }
    }

    #[tokio::test]
    async fn failed_writes_leave_memory_authoritative() {
        let storage = Arc::new(MemoryStorage {
            fail_writes: true,
            ..MemoryStorage::default()
        });
        let (mut store, _) = SessionStore::load(storage.clone(), KEY, 5).await;

        store.record_usage(AnalysisType::Keywords, "a", keywords_result()).await;

        assert_eq!(store.record().request_count, 1);
        assert!(storage.items.lock().unwrap().is_empty());
    }
}
