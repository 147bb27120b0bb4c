pub mod analysis_llm;
pub mod script_llm;
pub mod storage;

pub use analysis_llm::OpenAiAnalysisAdapter;
pub use script_llm::OpenAiScriptAdapter;
pub use storage::{
    DraftStoreAdapter, FileBackend, MemoryBackend, ScriptStoreAdapter, StorageBackend,
};
