//! crates/script_studio_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any storage or serialization format.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// One proposed video topic returned by the analysis step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestion {
    pub title: String,
    pub description: String,
    pub reasoning: String,
}

/// The AI-derived tone/audience/suggestions bundle for a piece of input text.
///
/// Produced once per analysis call and never mutated afterwards; the
/// controller holds it for the lifetime of the scripting session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisResult {
    pub tone: String,
    pub target_audience: String,
    pub suggestions: Vec<Suggestion>,
}

impl AnalysisResult {
    /// Reconstructs a degenerate analysis (no suggestions) from the tone and
    /// audience stored alongside a saved script.
    pub fn from_saved(tone: String, target_audience: String) -> Self {
        Self {
            tone,
            target_audience,
            suggestions: Vec::new(),
        }
    }
}

/// A generated script as displayed in the result view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptResult {
    pub title: String,
    pub content: String,
}

/// The unsaved input to [`crate::ports::ScriptStore::save`]. The store
/// assigns the id and timestamp at save time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewScript {
    pub title: String,
    pub content: String,
    pub tone: Option<String>,
    pub target_audience: Option<String>,
}

/// A durably persisted, uniquely identified script entity.
///
/// The id is assigned exactly once, at creation, and never reused. Saved
/// scripts are never mutated in place; every save creates a new entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedScript {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub tone: Option<String>,
    pub target_audience: Option<String>,
}

/// The ephemeral, auto-overwritten, unsaved representation of the most
/// recently generated script. At most one exists at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptDraft {
    pub title: String,
    pub content: String,
    pub tone: Option<String>,
    pub target_audience: Option<String>,
    pub created_at: DateTime<Utc>,
}
