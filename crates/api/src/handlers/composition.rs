//! Handlers exposing the video composition: metadata for a scene list and
//! the layout of individual frames.

use axum::extract::State;
use axum::Json;
use content_engine_core::composition::VideoComposition;
use content_engine_core::error::CoreError;
use content_engine_core::project::ProjectState;
use content_engine_core::scene::sample_scenes;
use content_engine_core::types::ProjectId;

use crate::error::{AppError, AppResult};
use crate::extract::PathParam;
use crate::handlers::projects::find_project;
use crate::response::{CompositionResponse, FrameResponse};
use crate::state::AppState;

/// Build the composition for a project's stored script and media.
fn project_composition(project: &ProjectState) -> AppResult<VideoComposition> {
    let script = project.script.as_ref().ok_or_else(|| {
        CoreError::Conflict(format!("Project {} has no script yet", project.id))
    })?;
    let media = project.media.as_ref();
    let composition = VideoComposition::new(
        script.scenes.clone(),
        media.and_then(|m| m.voiceover_url.clone()),
    )?
    .with_avatar(media.and_then(|m| m.avatar_url.clone()));
    Ok(composition)
}

fn default_composition() -> AppResult<VideoComposition> {
    Ok(VideoComposition::new(sample_scenes(), None)?)
}

fn describe(composition: &VideoComposition) -> CompositionResponse {
    CompositionResponse {
        composition: composition.metadata(),
        scenes: composition.scenes().to_vec(),
    }
}

fn frame_of(composition: &VideoComposition, frame: u32) -> AppResult<FrameResponse> {
    let frame = composition.frame(frame).ok_or_else(|| {
        AppError::BadRequest(format!(
            "Frame {frame} is outside the composition (0..{})",
            composition.duration_in_frames()
        ))
    })?;
    Ok(FrameResponse { frame })
}

/// GET /api/composition/default
pub async fn get_default() -> AppResult<Json<CompositionResponse>> {
    Ok(Json(describe(&default_composition()?)))
}

/// GET /api/composition/default/frames/{frame}
pub async fn get_default_frame(
    PathParam(frame): PathParam<u32>,
) -> AppResult<Json<FrameResponse>> {
    Ok(Json(frame_of(&default_composition()?, frame)?))
}

/// GET /api/projects/{id}/composition
pub async fn get_for_project(
    State(state): State<AppState>,
    PathParam(id): PathParam<ProjectId>,
) -> AppResult<Json<CompositionResponse>> {
    let project = find_project(&state, &id).await?;
    Ok(Json(describe(&project_composition(&project)?)))
}

/// GET /api/projects/{id}/composition/frames/{frame}
pub async fn get_project_frame(
    State(state): State<AppState>,
    PathParam((id, frame)): PathParam<(ProjectId, u32)>,
) -> AppResult<Json<FrameResponse>> {
    let project = find_project(&state, &id).await?;
    Ok(Json(frame_of(&project_composition(&project)?, frame)?))
}
