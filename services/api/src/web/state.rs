//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use crate::web::workflow::WorkflowController;
use script_studio_core::ports::{
    DraftStore, ScriptGenerationService, ScriptStore, TopicAnalysisService,
};
use std::sync::Arc;

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub analysis_service: Arc<dyn TopicAnalysisService>,
    pub generation_service: Arc<dyn ScriptGenerationService>,
    pub scripts: Arc<dyn ScriptStore>,
    pub drafts: Arc<dyn DraftStore>,
}

impl AppState {
    /// Builds a fresh workflow controller for one connection. The controller
    /// lives exactly as long as the connection and is discarded with it.
    pub fn new_workflow(&self) -> WorkflowController {
        WorkflowController::new(
            self.analysis_service.clone(),
            self.generation_service.clone(),
            self.scripts.clone(),
            self.drafts.clone(),
        )
    }
}
