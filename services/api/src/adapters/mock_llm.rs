//! services/api/src/adapters/mock_llm.rs
//!
//! A stand-in generator used when no API key is configured. Returns a canned
//! result per mode after a short delay so the UI can be developed offline.

use async_trait::async_trait;
use seo_booster_core::{
    domain::{AnalysisResult, AnalysisType, Competitor, Keyword, KeywordCategory},
    ports::{ContentGenerationService, GenerationRequest, PortResult},
};
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct MockContentAdapter {
    delay: Duration,
}

impl MockContentAdapter {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

impl Default for MockContentAdapter {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}

#[async_trait]
impl ContentGenerationService for MockContentAdapter {
    async fn generate(&self, request: &GenerationRequest) -> PortResult<AnalysisResult> {
        tokio::time::sleep(self.delay).await;

        let result = match request.analysis_type {
            AnalysisType::Keywords => AnalysisResult::Keywords(vec![Keyword {
                word: "mock keyword".to_string(),
                category: KeywordCategory::Primary,
                reason: "This is a mock response.".to_string(),
            }]),
            AnalysisType::Improve | AnalysisType::Suggestion => AnalysisResult::ImprovedText(
                format!("This is a mock improved text for: \"{}\"", request.input_text),
            ),
            AnalysisType::Competitor => AnalysisResult::Competitors(vec![Competitor {
                name: "Mock Competitor".to_string(),
                strategy: "Mock strategy".to_string(),
                keywords: vec!["mock kw1".to_string(), "mock kw2".to_string()],
                weakness: "Mock weakness".to_string(),
            }]),
        };
        Ok(result)
    }
}
