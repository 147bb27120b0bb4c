pub mod domain;
pub mod ports;

pub use domain::{AnalysisResult, NewScript, SavedScript, ScriptDraft, ScriptResult, Suggestion};
pub use ports::{
    DraftStore, PortError, PortResult, ScriptGenerationService, ScriptStore, TopicAnalysisService,
};
