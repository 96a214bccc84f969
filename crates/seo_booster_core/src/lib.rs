pub mod analysis;
pub mod domain;
pub mod export;
pub mod persisted;
pub mod ports;
pub mod quota;
pub mod session;

pub use analysis::{AnalysisError, Analyzer, Submission};
pub use domain::{
    AnalysisResult, AnalysisType, Competitor, HistoryEntry, Keyword, KeywordCategory, Lang, Tone,
    UserRecord, DEFAULT_FREE_TIER_LIMIT, HISTORY_LIMIT,
};
pub use ports::{ContentGenerationService, GenerationRequest, PortError, PortResult, RecordStorage};
pub use quota::Quota;
pub use session::{DefaultReason, LoadOutcome, SessionStore};
