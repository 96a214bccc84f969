//! crates/seo_booster_core/src/analysis.rs
//!
//! The submission workflow: validate the input, check the quota and the
//! premium gates, call the remote generator once, then record the result.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::domain::{AnalysisType, HistoryEntry, Lang, Tone};
use crate::persisted::result_matches_type;
use crate::ports::{ContentGenerationService, GenerationRequest};
use crate::session::SessionStore;

/// Every way a submission can be turned away or fail.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AnalysisError {
    #[error("Input text is empty")]
    EmptyInput,
    #[error("The free-tier request limit has been reached")]
    QuotaExceeded,
    #[error("{0} analysis is a premium feature")]
    PremiumRequired(AnalysisType),
    #[error("Another analysis is already in progress")]
    Busy,
    #[error("Content generation failed")]
    GenerationFailed,
}

/// A user's request to analyse a piece of text.
#[derive(Debug, Clone)]
pub struct Submission {
    pub analysis_type: AnalysisType,
    pub text: String,
    pub language: Lang,
    pub tone: Tone,
}

/// Drives one analysis at a time against the shared session store.
pub struct Analyzer {
    store: Arc<Mutex<SessionStore>>,
    generator: Arc<dyn ContentGenerationService>,
    in_flight: Mutex<()>,
    deadline: Duration,
}

impl Analyzer {
    pub fn new(
        store: Arc<Mutex<SessionStore>>,
        generator: Arc<dyn ContentGenerationService>,
        deadline: Duration,
    ) -> Self {
        Self {
            store,
            generator,
            in_flight: Mutex::new(()),
            deadline,
        }
    }

    pub fn store(&self) -> &Arc<Mutex<SessionStore>> {
        &self.store
    }

    /// Runs a submission to completion. On success the new history entry is
    /// returned; on failure nothing is recorded and the quota is untouched.
    pub async fn submit(&self, submission: Submission) -> Result<HistoryEntry, AnalysisError> {
        if submission.text.trim().is_empty() {
            return Err(AnalysisError::EmptyInput);
        }

        // A second submission while one is outstanding is rejected, not queued.
        let _gate = self.in_flight.try_lock().map_err(|_| AnalysisError::Busy)?;

        let request = {
            let store = self.store.lock().await;
            if store.quota_exhausted() {
                info!("Submission blocked: free-tier quota exhausted");
                return Err(AnalysisError::QuotaExceeded);
            }

            let is_premium = store.record().is_premium;
            if submission.analysis_type.requires_premium() && !is_premium {
                return Err(AnalysisError::PremiumRequired(submission.analysis_type));
            }

            GenerationRequest {
                analysis_type: submission.analysis_type,
                input_text: submission.text,
                language: submission.language,
                // Tone selection is a premium feature.
                tone: if is_premium { submission.tone } else { Tone::Professional },
            }
        };

        info!(
            mode = %request.analysis_type,
            chars = request.input_text.chars().count(),
            "Generating content"
        );

        let result = match tokio::time::timeout(self.deadline, self.generator.generate(&request)).await {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => {
                error!("Content generation failed: {}", e);
                return Err(AnalysisError::GenerationFailed);
            }
            Err(_) => {
                error!("Content generation timed out after {:?}", self.deadline);
                return Err(AnalysisError::GenerationFailed);
            }
        };

        if !result_matches_type(&result, request.analysis_type) {
            warn!("Generator returned a result for the wrong mode");
            return Err(AnalysisError::GenerationFailed);
        }

        let mut store = self.store.lock().await;
        Ok(store
            .record_usage(request.analysis_type, request.input_text, result)
            .await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::AnalysisResult;
    use crate::ports::{PortError, PortResult};
    use crate::session::tests::{keywords_result, MemoryStorage, KEY};
    use async_trait::async_trait;
    use std::sync::Mutex as StdMutex;

    /// A generator that replays a canned answer and remembers what it was asked.
    struct ScriptedGenerator {
        answer: Result<AnalysisResult, String>,
        delay: Duration,
        seen: StdMutex<Vec<GenerationRequest>>,
    }

    impl ScriptedGenerator {
        fn ok(result: AnalysisResult) -> Self {
            Self {
                answer: Ok(result),
                delay: Duration::ZERO,
                seen: StdMutex::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                answer: Err("boom".to_string()),
                ..Self::ok(keywords_result())
            }
        }

        fn slow(result: AnalysisResult, delay: Duration) -> Self {
            Self {
                delay,
                ..Self::ok(result)
            }
        }
    }

    #[async_trait]
    impl ContentGenerationService for ScriptedGenerator {
        async fn generate(&self, request: &GenerationRequest) -> PortResult<AnalysisResult> {
            self.seen.lock().unwrap().push(request.clone());
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            self.answer.clone().map_err(PortError::Unexpected)
        }
    }

    async fn analyzer_with(generator: Arc<ScriptedGenerator>, limit: u32) -> Analyzer {
        let (store, _) = SessionStore::load(Arc::new(MemoryStorage::default()), KEY, limit).await;
        Analyzer::new(Arc::new(Mutex::new(store)), generator, Duration::from_secs(5))
    }

    fn submission(analysis_type: AnalysisType, text: &str) -> Submission {
        Submission {
            analysis_type,
            text: text.to_string(),
            language: Lang::En,
            tone: Tone::Friendly,
        }
    }

    #[tokio::test]
    async fn sixth_submission_is_blocked_by_quota() {
        let generator = Arc::new(ScriptedGenerator::ok(keywords_result()));
        let analyzer = analyzer_with(generator.clone(), 5).await;

        for _ in 0..5 {
            analyzer
                .submit(submission(AnalysisType::Keywords, "hello"))
                .await
                .unwrap();
        }

        assert_eq!(
            analyzer.submit(submission(AnalysisType::Keywords, "hello")).await,
            Err(AnalysisError::QuotaExceeded)
        );
        assert_eq!(generator.seen.lock().unwrap().len(), 5);
        assert!(analyzer.store().lock().await.quota_exhausted());
    }

    #[tokio::test]
    async fn empty_input_never_reaches_the_generator() {
        let generator = Arc::new(ScriptedGenerator::ok(keywords_result()));
        let analyzer = analyzer_with(generator.clone(), 5).await;

        assert_eq!(
            analyzer.submit(submission(AnalysisType::Keywords, "  \n\t")).await,
            Err(AnalysisError::EmptyInput)
        );
        assert!(generator.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn failed_generation_records_nothing() {
        let analyzer = analyzer_with(Arc::new(ScriptedGenerator::failing()), 5).await;

        assert_eq!(
            analyzer.submit(submission(AnalysisType::Keywords, "hello")).await,
            Err(AnalysisError::GenerationFailed)
        );

        let store = analyzer.store().lock().await;
        assert_eq!(store.record().request_count, 0);
        assert!(store.record().history.is_empty());
    }

    #[tokio::test]
    async fn mismatched_result_is_a_generation_failure() {
        let generator = Arc::new(ScriptedGenerator::ok(AnalysisResult::ImprovedText("x".into())));
        let analyzer = analyzer_with(generator, 5).await;

        assert_eq!(
            analyzer.submit(submission(AnalysisType::Keywords, "hello")).await,
            Err(AnalysisError::GenerationFailed)
        );
    }

    #[tokio::test]
    async fn competitor_analysis_requires_premium() {
        let generator = Arc::new(ScriptedGenerator::ok(AnalysisResult::Competitors(vec![])));
        let analyzer = analyzer_with(generator.clone(), 5).await;

        assert_eq!(
            analyzer.submit(submission(AnalysisType::Competitor, "shoes")).await,
            Err(AnalysisError::PremiumRequired(AnalysisType::Competitor))
        );

        analyzer.store().lock().await.upgrade("me@example.com").await;
        let entry = analyzer
            .submit(submission(AnalysisType::Competitor, "shoes"))
            .await
            .unwrap();
        assert_eq!(entry.analysis_type, AnalysisType::Competitor);
    }

    #[tokio::test]
    async fn free_users_always_get_the_professional_tone() {
        let generator = Arc::new(ScriptedGenerator::ok(AnalysisResult::ImprovedText("ok".into())));
        let analyzer = analyzer_with(generator.clone(), 5).await;

        analyzer
            .submit(submission(AnalysisType::Improve, "draft"))
            .await
            .unwrap();
        analyzer.store().lock().await.upgrade("me@example.com").await;
        analyzer
            .submit(submission(AnalysisType::Improve, "draft"))
            .await
            .unwrap();

        let seen = generator.seen.lock().unwrap();
        assert_eq!(seen[0].tone, Tone::Professional);
        assert_eq!(seen[1].tone, Tone::Friendly);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_generation_hits_the_deadline() {
        let generator = Arc::new(ScriptedGenerator::slow(keywords_result(), Duration::from_secs(30)));
        let analyzer = analyzer_with(generator, 5).await;

        assert_eq!(
            analyzer.submit(submission(AnalysisType::Keywords, "hello")).await,
            Err(AnalysisError::GenerationFailed)
        );
        assert_eq!(analyzer.store().lock().await.record().request_count, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_submission_is_rejected_while_one_is_outstanding() {
        let generator = Arc::new(ScriptedGenerator::slow(keywords_result(), Duration::from_secs(1)));
        let analyzer = Arc::new(analyzer_with(generator, 5).await);

        let first = {
            let analyzer = analyzer.clone();
            tokio::spawn(async move { analyzer.submit(submission(AnalysisType::Keywords, "a")).await })
        };
        tokio::task::yield_now().await;

        assert_eq!(
            analyzer.submit(submission(AnalysisType::Keywords, "b")).await,
            Err(AnalysisError::Busy)
        );
        assert!(first.await.unwrap().is_ok());
        assert_eq!(analyzer.store().lock().await.record().request_count, 1);
    }
}
