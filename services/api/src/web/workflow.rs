//! services/api/src/web/workflow.rs
//!
//! The workflow controller: a finite-state machine that coordinates client
//! commands, the AI gateway, and the persistence adapter. One controller
//! exists per connection and owns the single source of truth for what the
//! client displays.

use chrono::Utc;
use script_studio_core::domain::{AnalysisResult, NewScript, ScriptDraft, ScriptResult, Suggestion};
use script_studio_core::ports::{
    DraftStore, ScriptGenerationService, ScriptStore, TopicAnalysisService,
};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// Shown when the analysis call fails; the user resubmits from the input view.
pub const ANALYSIS_ERROR_MESSAGE: &str = "분석 중 오류가 발생했습니다. 잠시 후 다시 시도해주세요.";
/// Shown when the generation call fails; the user picks again from the selection view.
pub const GENERATION_ERROR_MESSAGE: &str =
    "대본 생성 중 오류가 발생했습니다. 다른 주제를 선택해보세요.";
/// Shown when the durable save fails.
pub const SAVE_ERROR_MESSAGE: &str = "저장 중 오류가 발생했습니다.";
/// Shown when a saved script cannot be loaded from the durable store.
pub const UNKNOWN_SCRIPT_MESSAGE: &str = "대본을 찾을 수 없습니다.";

//=========================================================================================
// Stages and Snapshot
//=========================================================================================

/// The stages of the scripting workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowStage {
    Dashboard,
    Input,
    Analyzing,
    Selection,
    Generating,
    Result,
}

/// A read-only view of the controller for the protocol layer.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowSnapshot {
    pub stage: WorkflowStage,
    pub input_text: String,
    pub analysis: Option<AnalysisResult>,
    pub script: Option<ScriptResult>,
    pub error: Option<String>,
    /// False while viewing a previously saved script; saving is only offered
    /// for scripts reached through generation.
    pub can_save: bool,
}

//=========================================================================================
// The Controller
//=========================================================================================

pub struct WorkflowController {
    analysis_service: Arc<dyn TopicAnalysisService>,
    generation_service: Arc<dyn ScriptGenerationService>,
    scripts: Arc<dyn ScriptStore>,
    drafts: Arc<dyn DraftStore>,
    stage: WorkflowStage,
    input_text: String,
    analysis: Option<AnalysisResult>,
    script: Option<ScriptResult>,
    /// The topic picked in the selection view, held while the generation call
    /// is in flight.
    pending_suggestion: Option<Suggestion>,
    viewing_saved: bool,
    error: Option<String>,
}

impl WorkflowController {
    /// Creates a controller in the dashboard stage.
    pub fn new(
        analysis_service: Arc<dyn TopicAnalysisService>,
        generation_service: Arc<dyn ScriptGenerationService>,
        scripts: Arc<dyn ScriptStore>,
        drafts: Arc<dyn DraftStore>,
    ) -> Self {
        Self {
            analysis_service,
            generation_service,
            scripts,
            drafts,
            stage: WorkflowStage::Dashboard,
            input_text: String::new(),
            analysis: None,
            script: None,
            pending_suggestion: None,
            viewing_saved: false,
            error: None,
        }
    }

    pub fn snapshot(&self) -> WorkflowSnapshot {
        WorkflowSnapshot {
            stage: self.stage,
            input_text: self.input_text.clone(),
            analysis: self.analysis.clone(),
            script: self.script.clone(),
            error: self.error.clone(),
            can_save: self.stage == WorkflowStage::Result && !self.viewing_saved,
        }
    }

    /// Starts a fresh scripting session. Accepted from any stage.
    pub fn create_new(&mut self) {
        self.clear_session();
        self.stage = WorkflowStage::Input;
        self.discard_draft();
        info!("Started a new scripting session");
    }

    /// Returns to the dashboard, dropping everything from the session.
    pub fn reset(&mut self) {
        self.clear_session();
        self.stage = WorkflowStage::Dashboard;
        self.discard_draft();
        info!("Session reset to dashboard");
    }

    /// Opens a previously saved script in the result view. Saving stays
    /// disabled for these sessions.
    pub fn view_saved(&mut self, id: Uuid) {
        self.error = None;
        match self.scripts.get(id) {
            Ok(Some(saved)) => {
                self.script = Some(ScriptResult {
                    title: saved.title,
                    content: saved.content,
                });
                self.analysis = match (saved.tone, saved.target_audience) {
                    (Some(tone), Some(audience)) => {
                        Some(AnalysisResult::from_saved(tone, audience))
                    }
                    _ => None,
                };
                self.pending_suggestion = None;
                self.viewing_saved = true;
                self.stage = WorkflowStage::Result;
                info!("Viewing saved script {}", id);
                self.sync_draft();
            }
            Ok(None) => {
                warn!("Saved script {} not found", id);
                self.error = Some(UNKNOWN_SCRIPT_MESSAGE.to_string());
            }
            Err(e) => {
                warn!("Failed to load saved script {}: {}", id, e);
                self.error = Some(UNKNOWN_SCRIPT_MESSAGE.to_string());
            }
        }
    }

    /// Submits creator notes: `Input -> Analyzing`. Returns true when the
    /// transition happened and [`Self::run_analysis`] should be driven next.
    /// Empty (all-whitespace) input is ignored.
    pub fn submit_input(&mut self, text: &str) -> bool {
        self.error = None;
        if self.stage != WorkflowStage::Input {
            warn!("Ignoring input submitted in stage {:?}", self.stage);
            return false;
        }
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return false;
        }
        self.input_text = trimmed.to_string();
        self.stage = WorkflowStage::Analyzing;
        true
    }

    /// Drives the analysis call to settlement: `Analyzing -> Selection` on
    /// success, back to `Input` (input preserved for retry) on failure.
    pub async fn run_analysis(&mut self) {
        if self.stage != WorkflowStage::Analyzing {
            return;
        }
        info!("Analyzing creator notes ({} chars)", self.input_text.chars().count());
        let input = self.input_text.clone();
        let result = self.analysis_service.analyze(&input).await;
        match result {
            Ok(analysis) => {
                info!("Analysis produced {} suggestions", analysis.suggestions.len());
                self.analysis = Some(analysis);
                self.stage = WorkflowStage::Selection;
            }
            Err(e) => {
                warn!("Analysis failed: {}", e);
                self.error = Some(ANALYSIS_ERROR_MESSAGE.to_string());
                self.stage = WorkflowStage::Input;
            }
        }
    }

    /// Picks a suggested topic: `Selection -> Generating`. Returns true when
    /// the transition happened and [`Self::run_generation`] should be driven
    /// next. A pick without a current analysis, or with an out-of-range
    /// index, is ignored.
    pub fn pick_suggestion(&mut self, index: usize) -> bool {
        self.error = None;
        if self.stage != WorkflowStage::Selection {
            warn!("Ignoring suggestion pick in stage {:?}", self.stage);
            return false;
        }
        let Some(analysis) = &self.analysis else {
            return false;
        };
        let Some(suggestion) = analysis.suggestions.get(index) else {
            warn!("Suggestion index {} out of range", index);
            return false;
        };
        self.pending_suggestion = Some(suggestion.clone());
        self.stage = WorkflowStage::Generating;
        true
    }

    /// Drives the generation call to settlement: `Generating -> Result` on
    /// success, back to `Selection` on failure.
    pub async fn run_generation(&mut self) {
        if self.stage != WorkflowStage::Generating {
            return;
        }
        let (Some(suggestion), Some(analysis)) =
            (self.pending_suggestion.take(), self.analysis.clone())
        else {
            self.stage = WorkflowStage::Selection;
            return;
        };
        info!("Generating script for topic '{}'", suggestion.title);
        let result = self
            .generation_service
            .generate_script(&suggestion.title, &analysis.tone, &analysis.target_audience)
            .await;
        match result {
            Ok(script) => {
                self.script = Some(script);
                self.viewing_saved = false;
                self.stage = WorkflowStage::Result;
                self.sync_draft();
            }
            Err(e) => {
                warn!("Script generation failed: {}", e);
                self.error = Some(GENERATION_ERROR_MESSAGE.to_string());
                self.stage = WorkflowStage::Selection;
            }
        }
    }

    /// Persists the current script durably with the caller's (possibly
    /// edited) title and content, then clears the ephemeral draft. Only
    /// honored in the result stage of a generation session.
    pub fn save_script(&mut self, title: &str, content: &str) -> Option<Uuid> {
        self.error = None;
        if self.stage != WorkflowStage::Result || self.viewing_saved {
            warn!("Ignoring save request outside a generation result");
            return None;
        }
        let (tone, target_audience) = match &self.analysis {
            Some(analysis) => (
                Some(analysis.tone.clone()),
                Some(analysis.target_audience.clone()),
            ),
            None => (None, None),
        };
        let new_script = NewScript {
            title: title.to_string(),
            content: content.to_string(),
            tone,
            target_audience,
        };
        match self.scripts.save(new_script) {
            Ok(saved) => {
                info!("Saved script {} ('{}')", saved.id, saved.title);
                self.discard_draft();
                Some(saved.id)
            }
            Err(e) => {
                warn!("Failed to save script: {}", e);
                self.error = Some(SAVE_ERROR_MESSAGE.to_string());
                None
            }
        }
    }

    fn clear_session(&mut self) {
        self.error = None;
        self.analysis = None;
        self.script = None;
        self.pending_suggestion = None;
        self.viewing_saved = false;
        self.input_text.clear();
    }

    /// Ephemeral-store side effects are best effort: failures are logged and
    /// swallowed, never surfaced to the user.
    fn discard_draft(&self) {
        if let Err(e) = self.drafts.clear_draft() {
            warn!("Failed to clear draft: {}", e);
        }
    }

    /// Re-applies the result-stage draft invariant: whenever the controller
    /// sits in the result stage with both a script and an analysis, the
    /// ephemeral draft mirrors the displayed title/content/tone/audience.
    fn sync_draft(&self) {
        if self.stage != WorkflowStage::Result {
            return;
        }
        let (Some(script), Some(analysis)) = (&self.script, &self.analysis) else {
            return;
        };
        let draft = ScriptDraft {
            title: script.title.clone(),
            content: script.content.clone(),
            tone: Some(analysis.tone.clone()),
            target_audience: Some(analysis.target_audience.clone()),
            created_at: Utc::now(),
        };
        if let Err(e) = self.drafts.save_draft(&draft) {
            warn!("Failed to save draft: {}", e);
        }
    }
}
