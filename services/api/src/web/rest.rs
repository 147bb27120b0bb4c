//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the REST API endpoints backing the saved-script
//! dashboard, and the master definition for the OpenAPI specification.

use crate::web::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use chrono::{DateTime, Utc};
use script_studio_core::domain::{SavedScript, ScriptDraft};
use serde::Serialize;
use std::sync::Arc;
use tracing::error;
use utoipa::{OpenApi, ToSchema};
use uuid::Uuid;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        list_scripts_handler,
        get_script_handler,
        delete_script_handler,
        get_draft_handler,
    ),
    components(
        schemas(SavedScriptResponse, DraftResponse)
    ),
    tags(
        (name = "Creator Script Studio API", description = "REST endpoints backing the saved-script dashboard.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Response Structs
//=========================================================================================

/// One saved script as returned by the dashboard endpoints.
#[derive(Serialize, ToSchema)]
pub struct SavedScriptResponse {
    id: Uuid,
    title: String,
    content: String,
    created_at: DateTime<Utc>,
    tone: Option<String>,
    target_audience: Option<String>,
}

impl From<SavedScript> for SavedScriptResponse {
    fn from(script: SavedScript) -> Self {
        Self {
            id: script.id,
            title: script.title,
            content: script.content,
            created_at: script.created_at,
            tone: script.tone,
            target_audience: script.target_audience,
        }
    }
}

/// The ephemeral draft, when one exists.
#[derive(Serialize, ToSchema)]
pub struct DraftResponse {
    title: String,
    content: String,
    tone: Option<String>,
    target_audience: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<ScriptDraft> for DraftResponse {
    fn from(draft: ScriptDraft) -> Self {
        Self {
            title: draft.title,
            content: draft.content,
            tone: draft.tone,
            target_audience: draft.target_audience,
            created_at: draft.created_at,
        }
    }
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// List every saved script, newest first.
#[utoipa::path(
    get,
    path = "/scripts",
    responses(
        (status = 200, description = "All saved scripts, newest first", body = [SavedScriptResponse]),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn list_scripts_handler(
    State(app_state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let scripts = app_state.scripts.list_all().map_err(|e| {
        error!("Failed to list saved scripts: {}", e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to list saved scripts".to_string(),
        )
    })?;

    let payload: Vec<SavedScriptResponse> =
        scripts.into_iter().map(SavedScriptResponse::from).collect();
    Ok(Json(payload))
}

/// Fetch one saved script by id.
#[utoipa::path(
    get,
    path = "/scripts/{id}",
    params(
        ("id" = Uuid, Path, description = "The unique ID of the saved script.")
    ),
    responses(
        (status = 200, description = "The saved script", body = SavedScriptResponse),
        (status = 404, description = "No script with this id"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn get_script_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let script = app_state.scripts.get(id).map_err(|e| {
        error!("Failed to load saved script {}: {}", id, e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to load the saved script".to_string(),
        )
    })?;

    match script {
        Some(script) => Ok(Json(SavedScriptResponse::from(script))),
        None => Err((StatusCode::NOT_FOUND, format!("No script with id {}", id))),
    }
}

/// Delete a saved script. Deleting an unknown id also succeeds.
#[utoipa::path(
    delete,
    path = "/scripts/{id}",
    params(
        ("id" = Uuid, Path, description = "The unique ID of the saved script.")
    ),
    responses(
        (status = 204, description = "The script is gone"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn delete_script_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    app_state.scripts.delete(id).map_err(|e| {
        error!("Failed to delete saved script {}: {}", id, e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to delete the saved script".to_string(),
        )
    })?;

    Ok(StatusCode::NO_CONTENT)
}

/// Read the ephemeral draft, if one exists.
#[utoipa::path(
    get,
    path = "/draft",
    responses(
        (status = 200, description = "The current unsaved draft", body = DraftResponse),
        (status = 404, description = "No draft is present")
    )
)]
pub async fn get_draft_handler(
    State(app_state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    // Draft reads are best effort like every other ephemeral-store access.
    let draft = app_state.drafts.get_draft().unwrap_or_default();

    match draft {
        Some(draft) => Ok(Json(DraftResponse::from(draft))),
        None => Err((StatusCode::NOT_FOUND, "No draft is present".to_string())),
    }
}
