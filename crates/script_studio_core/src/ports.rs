//! crates/script_studio_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific external implementations like the generative-AI
//! backend or the storage engine.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{AnalysisResult, NewScript, SavedScript, ScriptDraft, ScriptResult};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., the AI
/// backend, the storage engine).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    /// The AI backend settled the request but returned no payload.
    #[error("The AI backend returned an empty response")]
    EmptyResponse,
    /// The AI backend returned a payload that does not decode as the required schema.
    #[error("The AI backend returned a malformed response: {0}")]
    MalformedResponse(String),
    /// The request to the AI backend failed in transit.
    #[error("AI backend request failed: {0}")]
    Backend(String),
    /// The store could not complete an operation.
    #[error("Storage operation failed: {0}")]
    Storage(String),
    /// Item not found.
    #[error("Item not found: {0}")]
    NotFound(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// Analyzes raw creator notes and proposes new video topics.
#[async_trait]
pub trait TopicAnalysisService: Send + Sync {
    /// Infers the tone and target audience of the input text and suggests new
    /// topics. Suggestions keep the order the backend returned them in.
    async fn analyze(&self, input_text: &str) -> PortResult<AnalysisResult>;
}

/// Drafts a full long-form script for a chosen topic.
#[async_trait]
pub trait ScriptGenerationService: Send + Sync {
    /// Generates a script for `topic_title` in the given tone for the given
    /// audience. The result's title is always `topic_title` verbatim.
    async fn generate_script(
        &self,
        topic_title: &str,
        tone: &str,
        target_audience: &str,
    ) -> PortResult<ScriptResult>;
}

/// The durable script collection.
///
/// Stores are process-local and blocking from the caller's point of view;
/// every mutation is a whole-collection read-modify-write.
pub trait ScriptStore: Send + Sync {
    /// Returns every saved script, newest first. A corrupt or missing
    /// underlying record reads as the empty collection, never an error.
    fn list_all(&self) -> PortResult<Vec<SavedScript>>;

    /// Assigns a fresh id and the current timestamp, then persists the full
    /// collection.
    fn save(&self, script: NewScript) -> PortResult<SavedScript>;

    /// Removes the matching entry if present. Deleting an unknown id is not
    /// an error.
    fn delete(&self, id: Uuid) -> PortResult<()>;

    fn get(&self, id: Uuid) -> PortResult<Option<SavedScript>>;
}

/// The single-slot ephemeral draft store.
pub trait DraftStore: Send + Sync {
    /// Overwrites the slot.
    fn save_draft(&self, draft: &ScriptDraft) -> PortResult<()>;

    fn get_draft(&self) -> PortResult<Option<ScriptDraft>>;

    fn clear_draft(&self) -> PortResult<()>;
}
