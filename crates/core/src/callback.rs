//! Merging automation callback results into a project.
//!
//! [`apply_callback`] is the single place where a stage result changes a
//! project. It runs inside the store's read-modify-write, so it must be a
//! pure function of its inputs: it may be re-run against a fresher copy of
//! the project when a concurrent write wins the race.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::CoreError;
use crate::project::{
    validate_script, MediaAssets, Output, ProjectState, ProjectStatus, ReferenceAnalysis, Script,
    WorkflowFailure,
};
use crate::types::Timestamp;
use crate::workflow::CallbackStage;

/// Fallback message when an error callback carries none.
pub const DEFAULT_FAILURE_MESSAGE: &str = "Workflow reported an error";

/// Status before and after a callback was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallbackOutcome {
    pub previous_status: ProjectStatus,
    pub status: ProjectStatus,
}

// ---------------------------------------------------------------------------
// Stage result payloads
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VoiceResult {
    #[serde(alias = "audioUrl")]
    voiceover_url: String,
    #[serde(default, alias = "duration")]
    voiceover_duration_secs: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AvatarResult {
    #[serde(alias = "avatarVideoUrl")]
    avatar_url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RenderResult {
    video_url: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    hashtags: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PublishResult {
    #[serde(default)]
    platform_urls: BTreeMap<String, String>,
    #[serde(default)]
    video_url: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ErrorResult {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    workflow: Option<String>,
    #[serde(default)]
    reset_to: Option<ProjectStatus>,
}

fn parse<T: DeserializeOwned>(stage: CallbackStage, value: Value) -> Result<T, CoreError> {
    serde_json::from_value(value)
        .map_err(|e| CoreError::Validation(format!("Invalid {stage} result: {e}")))
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

/// Apply one callback to `project`, transitioning its status and refreshing
/// `updated_at`.
pub fn apply_callback(
    project: &mut ProjectState,
    stage: CallbackStage,
    result: &Map<String, Value>,
    now: Timestamp,
) -> Result<CallbackOutcome, CoreError> {
    let previous_status = project.status;
    let payload = Value::Object(result.clone());

    match stage {
        CallbackStage::IngestComplete => apply_ingest(project, payload, now)?,
        CallbackStage::ScriptComplete => apply_script(project, result, now)?,
        CallbackStage::VoiceComplete => apply_voice(project, payload, now)?,
        CallbackStage::AvatarComplete => apply_avatar(project, payload, now)?,
        CallbackStage::RenderComplete => apply_render(project, payload, now)?,
        CallbackStage::PublishComplete => apply_publish(project, payload, now)?,
        CallbackStage::Error => apply_error(project, payload, now)?,
    }

    if stage != CallbackStage::Error {
        project.last_error = None;
    }
    project.touch(now);

    Ok(CallbackOutcome {
        previous_status,
        status: project.status,
    })
}

fn apply_ingest(project: &mut ProjectState, payload: Value, _now: Timestamp) -> Result<(), CoreError> {
    let analysis: ReferenceAnalysis = parse(CallbackStage::IngestComplete, payload)?;
    project.analysis = Some(analysis);
    Ok(())
}

fn apply_script(
    project: &mut ProjectState,
    result: &Map<String, Value>,
    now: Timestamp,
) -> Result<(), CoreError> {
    // The workflow may wrap the script in a `script` key.
    let payload = match result.get("script") {
        Some(inner @ Value::Object(_)) => inner.clone(),
        _ => Value::Object(result.clone()),
    };
    let script: Script = parse(CallbackStage::ScriptComplete, payload)?;
    validate_script(&script)?;
    project.advance_to(ProjectStatus::Script, now)?;
    project.script = Some(script);
    Ok(())
}

fn require_script_stage(project: &ProjectState, stage: CallbackStage) -> Result<(), CoreError> {
    if project.status < ProjectStatus::Script {
        return Err(CoreError::Conflict(format!(
            "Project {} received {stage} before a script was approved (status '{}')",
            project.id, project.status
        )));
    }
    Ok(())
}

fn apply_voice(project: &mut ProjectState, payload: Value, _now: Timestamp) -> Result<(), CoreError> {
    let voice: VoiceResult = parse(CallbackStage::VoiceComplete, payload)?;
    require_script_stage(project, CallbackStage::VoiceComplete)?;
    let media = project.media.get_or_insert_with(MediaAssets::default);
    media.voiceover_url = Some(voice.voiceover_url);
    media.voiceover_duration_secs = voice.voiceover_duration_secs;
    Ok(())
}

fn apply_avatar(project: &mut ProjectState, payload: Value, _now: Timestamp) -> Result<(), CoreError> {
    let avatar: AvatarResult = parse(CallbackStage::AvatarComplete, payload)?;
    require_script_stage(project, CallbackStage::AvatarComplete)?;
    project
        .media
        .get_or_insert_with(MediaAssets::default)
        .avatar_url = Some(avatar.avatar_url);
    Ok(())
}

fn apply_render(project: &mut ProjectState, payload: Value, now: Timestamp) -> Result<(), CoreError> {
    let render: RenderResult = parse(CallbackStage::RenderComplete, payload)?;
    project.advance_to(ProjectStatus::Rendering, now)?;

    match project.output.as_mut() {
        Some(output) => {
            output.video_url = render.video_url;
            if let Some(title) = render.title {
                output.title = title;
            }
            if let Some(description) = render.description {
                output.description = description;
            }
            if let Some(hashtags) = render.hashtags {
                output.hashtags = hashtags;
            }
        }
        None => {
            project.output = Some(Output {
                video_url: render.video_url,
                title: render.title.unwrap_or_default(),
                description: render.description.unwrap_or_default(),
                hashtags: render.hashtags.unwrap_or_default(),
                platform_urls: BTreeMap::new(),
                rating: None,
            });
        }
    }
    Ok(())
}

fn apply_publish(project: &mut ProjectState, payload: Value, now: Timestamp) -> Result<(), CoreError> {
    let publish: PublishResult = parse(CallbackStage::PublishComplete, payload)?;

    if project.output.is_none() && publish.video_url.is_none() {
        return Err(CoreError::Conflict(format!(
            "Project {} received publish-complete without a rendered video",
            project.id
        )));
    }

    project.advance_to(ProjectStatus::Published, now)?;
    let output = project.output.get_or_insert_with(|| Output {
        video_url: String::new(),
        title: String::new(),
        description: String::new(),
        hashtags: Vec::new(),
        platform_urls: BTreeMap::new(),
        rating: None,
    });
    if let Some(video_url) = publish.video_url {
        output.video_url = video_url;
    }
    output.platform_urls.extend(publish.platform_urls);
    Ok(())
}

fn apply_error(project: &mut ProjectState, payload: Value, now: Timestamp) -> Result<(), CoreError> {
    let report: ErrorResult = parse(CallbackStage::Error, payload.clone())?;

    if let Some(target) = report.reset_to {
        project.reset_to(target, now)?;
    }

    let message = report
        .message
        .or(report.error)
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_FAILURE_MESSAGE.to_string());

    project.last_error = Some(WorkflowFailure {
        workflow: report.workflow,
        message,
        details: payload,
        occurred_at: now,
    });
    Ok(())
}
