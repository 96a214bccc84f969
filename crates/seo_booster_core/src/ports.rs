//! crates/seo_booster_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of the storage backend and of the generative-AI provider.

use async_trait::async_trait;
use crate::domain::{AnalysisResult, AnalysisType, Lang, Tone};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., filesystem, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Port Payloads
//=========================================================================================

/// Everything the remote generator needs to produce one result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub analysis_type: AnalysisType,
    pub input_text: String,
    pub language: Lang,
    pub tone: Tone,
}

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// Durable key/value storage for the serialized user record.
#[async_trait]
pub trait RecordStorage: Send + Sync {
    /// Reads the bytes stored under `key`, or `None` if nothing was ever written.
    async fn read(&self, key: &str) -> PortResult<Option<Vec<u8>>>;

    /// Replaces whatever is stored under `key` with `bytes`.
    async fn write(&self, key: &str, bytes: &[u8]) -> PortResult<()>;
}

#[async_trait]
pub trait ContentGenerationService: Send + Sync {
    /// Produces a result for one analysis. A single attempt; never retried.
    async fn generate(&self, request: &GenerationRequest) -> PortResult<AnalysisResult>;
}
