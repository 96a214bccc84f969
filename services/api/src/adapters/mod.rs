pub mod file_storage;
pub mod gemini_llm;
pub mod mock_llm;

pub use file_storage::FileRecordStorage;
pub use gemini_llm::GeminiContentAdapter;
pub use mock_llm::MockContentAdapter;
