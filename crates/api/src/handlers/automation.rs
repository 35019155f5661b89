//! Handlers for the `/n8n` relay: outbound workflow triggers and inbound
//! stage callbacks.

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use content_engine_core::callback::apply_callback;
use content_engine_core::project::ProjectStatus;
use content_engine_core::types::ProjectId;
use content_engine_core::workflow::{CallbackStage, Workflow};
use content_engine_db::repositories::ProjectRepo;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use validator::{Validate, ValidationError};

use crate::error::AppResult;
use crate::extract::ValidatedJson;
use crate::middleware::webhook::WebhookCaller;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// DTOs
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TriggerRequest {
    #[validate(custom(function = "not_blank"))]
    pub project_id: ProjectId,
    pub workflow: Workflow,
    #[serde(default)]
    pub payload: Option<Map<String, Value>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerResponse {
    pub success: bool,
    pub workflow: Workflow,
    pub project_id: ProjectId,
    /// The workflow's response body.
    pub result: Value,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CallbackRequest {
    #[validate(custom(function = "not_blank"))]
    pub project_id: ProjectId,
    pub stage: CallbackStage,
    pub result: Map<String, Value>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallbackResponse {
    pub success: bool,
    pub project_id: ProjectId,
    pub stage: CallbackStage,
    pub status: ProjectStatus,
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("must not be empty".into());
        return Err(err);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/n8n/trigger
///
/// Start a workflow for a project. Unknown workflow names fail body parsing,
/// so nothing is sent upstream for them.
pub async fn trigger(
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<TriggerRequest>,
) -> AppResult<Json<TriggerResponse>> {
    tracing::info!(
        project_id = %input.project_id,
        workflow = %input.workflow,
        "Triggering automation workflow"
    );

    let result = state
        .automation
        .trigger(&input.project_id, input.workflow, input.payload)
        .await?;

    Ok(Json(TriggerResponse {
        success: true,
        workflow: input.workflow,
        project_id: input.project_id,
        result,
    }))
}

/// POST /api/n8n/callback
///
/// Merge a stage result into the stored project. The secret check runs
/// before the body is parsed.
pub async fn callback(
    State(state): State<AppState>,
    _caller: WebhookCaller,
    ValidatedJson(input): ValidatedJson<CallbackRequest>,
) -> AppResult<Json<CallbackResponse>> {
    let now = Utc::now();
    let (project, outcome) = ProjectRepo::update(&state.pool, &input.project_id, |project| {
        apply_callback(project, input.stage, &input.result, now)
    })
    .await?;

    tracing::info!(
        project_id = %project.id,
        stage = %input.stage,
        from = %outcome.previous_status,
        to = %outcome.status,
        "Applied automation callback"
    );

    Ok(Json(CallbackResponse {
        success: true,
        project_id: project.id,
        stage: input.stage,
        status: project.status,
    }))
}
