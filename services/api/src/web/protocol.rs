//! services/api/src/web/protocol.rs
//!
//! Defines the WebSocket message protocol between the browser client and the API server
//! for the scripting workflow.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::web::workflow::{WorkflowSnapshot, WorkflowStage};
use script_studio_core::domain::{AnalysisResult, ScriptResult, Suggestion};

//=========================================================================================
// Messages Sent FROM the Client (Browser) TO the Server
//=========================================================================================

/// Represents the structured text messages a client can send to the server.
#[derive(Deserialize, Debug)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Starts a fresh scripting session.
    CreateNew,

    /// Submits the creator's notes for analysis.
    SubmitInput { text: String },

    /// Picks one of the suggested topics by its position in the list.
    PickSuggestion { index: usize },

    /// Persists the current script with the (possibly edited) title and content.
    SaveScript { title: String, content: String },

    /// Opens a previously saved script in the result view.
    ViewSaved { id: Uuid },

    /// Returns to the dashboard, discarding the session.
    Reset,
}

//=========================================================================================
// Messages Sent FROM the Server TO the Client (Browser)
//=========================================================================================

/// The workflow stage as seen by the client.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StagePayload {
    Dashboard,
    Input,
    Analyzing,
    Selection,
    Generating,
    Result,
}

impl From<WorkflowStage> for StagePayload {
    fn from(stage: WorkflowStage) -> Self {
        match stage {
            WorkflowStage::Dashboard => StagePayload::Dashboard,
            WorkflowStage::Input => StagePayload::Input,
            WorkflowStage::Analyzing => StagePayload::Analyzing,
            WorkflowStage::Selection => StagePayload::Selection,
            WorkflowStage::Generating => StagePayload::Generating,
            WorkflowStage::Result => StagePayload::Result,
        }
    }
}

#[derive(Serialize, Debug, Clone)]
pub struct SuggestionPayload {
    pub title: String,
    pub description: String,
    pub reasoning: String,
}

impl From<&Suggestion> for SuggestionPayload {
    fn from(suggestion: &Suggestion) -> Self {
        Self {
            title: suggestion.title.clone(),
            description: suggestion.description.clone(),
            reasoning: suggestion.reasoning.clone(),
        }
    }
}

#[derive(Serialize, Debug, Clone)]
pub struct AnalysisPayload {
    pub tone: String,
    pub target_audience: String,
    pub suggestions: Vec<SuggestionPayload>,
}

impl From<&AnalysisResult> for AnalysisPayload {
    fn from(analysis: &AnalysisResult) -> Self {
        Self {
            tone: analysis.tone.clone(),
            target_audience: analysis.target_audience.clone(),
            suggestions: analysis.suggestions.iter().map(SuggestionPayload::from).collect(),
        }
    }
}

#[derive(Serialize, Debug, Clone)]
pub struct ScriptPayload {
    pub title: String,
    pub content: String,
}

impl From<&ScriptResult> for ScriptPayload {
    fn from(script: &ScriptResult) -> Self {
        Self {
            title: script.title.clone(),
            content: script.content.clone(),
        }
    }
}

/// Represents the structured text messages the server can send to the client.
#[derive(Serialize, Debug, Clone)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// The full observable state, sent after every processed command. The
    /// views are stateless renderers of this message.
    State {
        stage: StagePayload,
        input_text: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        analysis: Option<AnalysisPayload>,
        #[serde(skip_serializing_if = "Option::is_none")]
        script: Option<ScriptPayload>,
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<String>,
        can_save: bool,
    },

    /// Acknowledges a durable save so the dashboard can refresh its listing.
    ScriptSaved { id: Uuid },
}

impl ServerMessage {
    /// Builds the full-state message from a controller snapshot.
    pub fn from_snapshot(snapshot: &WorkflowSnapshot) -> Self {
        ServerMessage::State {
            stage: snapshot.stage.into(),
            input_text: snapshot.input_text.clone(),
            analysis: snapshot.analysis.as_ref().map(AnalysisPayload::from),
            script: snapshot.script.as_ref().map(ScriptPayload::from),
            error: snapshot.error.clone(),
            can_save: snapshot.can_save,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_commands_decode_from_tagged_json() {
        let message: ClientMessage =
            serde_json::from_str(r#"{"type": "submit_input", "text": "IT 리뷰 채널입니다"}"#)
                .unwrap();
        assert!(matches!(message, ClientMessage::SubmitInput { text } if text == "IT 리뷰 채널입니다"));

        let message: ClientMessage =
            serde_json::from_str(r#"{"type": "pick_suggestion", "index": 1}"#).unwrap();
        assert!(matches!(message, ClientMessage::PickSuggestion { index: 1 }));
    }

    #[test]
    fn state_message_serializes_with_a_snake_case_tag() {
        let snapshot = WorkflowSnapshot {
            stage: WorkflowStage::Selection,
            input_text: "노트".to_string(),
            analysis: Some(AnalysisResult {
                tone: "진지함".to_string(),
                target_audience: "모두".to_string(),
                suggestions: vec![],
            }),
            script: None,
            error: None,
            can_save: false,
        };

        let value = serde_json::to_value(ServerMessage::from_snapshot(&snapshot)).unwrap();
        assert_eq!(value.get("type").unwrap(), "state");
        assert_eq!(value.get("stage").unwrap(), "selection");
        assert_eq!(value.get("can_save").unwrap(), false);
        // Absent fields stay off the wire entirely.
        assert!(value.get("script").is_none());
        assert!(value.get("error").is_none());
    }
}
