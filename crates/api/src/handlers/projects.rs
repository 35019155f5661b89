//! Handlers for the `/projects` resource.

use axum::body::Bytes;
use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use content_engine_core::error::CoreError;
use content_engine_core::project::{generate_project_id, IntentUpdate, ProjectState};
use content_engine_core::types::ProjectId;
use content_engine_db::repositories::ProjectRepo;
use serde::Serialize;

use crate::blob::reference_video_path;
use crate::error::{AppError, AppResult};
use crate::extract::{JsonPayload, PathParam};
use crate::response::{ProjectListResponse, ProjectResponse};
use crate::state::AppState;

/// Content type assumed for uploads that do not declare one.
const DEFAULT_VIDEO_CONTENT_TYPE: &str = "video/mp4";

// ---------------------------------------------------------------------------
// Intake
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectResponse {
    pub project_id: ProjectId,
    pub project: ProjectState,
    /// Best-effort steps that failed; the project was still created.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// An uploaded video part.
#[derive(Debug)]
struct VideoUpload {
    filename: Option<String>,
    content_type: Option<String>,
    data: Bytes,
}

#[derive(Debug, Default)]
struct Submission {
    idea: Option<String>,
    video: Option<VideoUpload>,
}

async fn read_submission(multipart: &mut Multipart) -> AppResult<Submission> {
    let mut submission = Submission::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.body_text()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "idea" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.body_text()))?;
                submission.idea = Some(text);
            }
            "video" => {
                let filename = field
                    .file_name()
                    .map(str::to_string)
                    .filter(|name| !name.is_empty());
                let content_type = field.content_type().map(str::to_string);
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(e.body_text()))?;

                // Browsers send an empty, unnamed part for an untouched file input.
                if data.is_empty() && filename.is_none() {
                    continue;
                }
                if let Some(ct) = content_type.as_deref() {
                    if !ct.starts_with("video/") {
                        return Err(AppError::BadRequest(format!(
                            "Reference upload must be a video file, got '{ct}'"
                        )));
                    }
                }
                submission.video = Some(VideoUpload {
                    filename,
                    content_type,
                    data,
                });
            }
            other => {
                tracing::debug!(field = other, "Ignoring unknown multipart field");
            }
        }
    }

    Ok(submission)
}

/// POST /api/projects
///
/// Create a project from an idea and/or a reference video. The draft is
/// stored before anything else so that ingest callbacks find it. Uploading
/// the video and notifying the ingest workflow are best effort: failures are
/// logged and reported in `warnings` but do not fail the request.
pub async fn create(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<(StatusCode, Json<CreateProjectResponse>)> {
    let mut multipart = multipart?;
    let submission = read_submission(&mut multipart).await?;
    let idea = submission
        .idea
        .as_deref()
        .map(str::trim)
        .filter(|idea| !idea.is_empty());

    if idea.is_none() && submission.video.is_none() {
        return Err(AppError::BadRequest(
            "Please provide a video idea or attach a reference video".to_string(),
        ));
    }

    let now = Utc::now();
    let mut draft = ProjectState::new(generate_project_id(now), now);
    if let Some(idea) = idea {
        draft.set_default_intent(idea, now)?;
    }
    let mut project = ProjectRepo::create(&state.pool, &draft).await?;

    let mut warnings = Vec::new();
    if let Some(video) = &submission.video {
        project = attach_reference_video(&state, project, video, &mut warnings).await?;
    }

    tracing::info!(
        project_id = %project.id,
        has_idea = idea.is_some(),
        has_video = project.reference_video_url.is_some(),
        warnings = warnings.len(),
        "Created project"
    );

    Ok((
        StatusCode::CREATED,
        Json(CreateProjectResponse {
            project_id: project.id.clone(),
            project,
            warnings,
        }),
    ))
}

/// Upload the reference video, record its URL on the stored project and, if
/// that worked, ask the ingest workflow to analyse it.
///
/// Returns the project as last stored. Only a failure to record the URL is
/// an error.
async fn attach_reference_video(
    state: &AppState,
    project: ProjectState,
    video: &VideoUpload,
    warnings: &mut Vec<String>,
) -> AppResult<ProjectState> {
    let pathname = reference_video_path(&project.id, video.filename.as_deref());
    let content_type = video
        .content_type
        .as_deref()
        .unwrap_or(DEFAULT_VIDEO_CONTENT_TYPE);

    let blob = match state.blobs.put(&pathname, &video.data, content_type).await {
        Ok(blob) => blob,
        Err(e) => {
            tracing::error!(project_id = %project.id, %pathname, error = %e, "Reference video upload failed");
            warnings.push("Reference video upload failed; the project was created without it".into());
            return Ok(project);
        }
    };
    tracing::info!(
        project_id = %project.id,
        pathname = %blob.pathname,
        size = blob.size,
        content_type = %blob.content_type,
        checksum = %blob.checksum,
        "Stored reference video"
    );

    let now = Utc::now();
    let (project, ()) = ProjectRepo::update(&state.pool, &project.id, |stored| {
        stored.reference_video_url = Some(blob.url.clone());
        stored.touch(now);
        Ok(())
    })
    .await?;

    if !state.automation.is_configured() {
        tracing::debug!(project_id = %project.id, "Automation not configured, skipping ingest");
        return Ok(project);
    }
    if let Err(e) = state.automation.notify_ingest(&project.id, &blob.url).await {
        tracing::error!(project_id = %project.id, error = %e, "Failed to notify ingest workflow");
        warnings.push("Video analysis could not be started".into());
        return Ok(project);
    }

    // The workflow may already have called back; answer with what is stored.
    find_project(state, &project.id).await
}

// ---------------------------------------------------------------------------
// Reads and edits
// ---------------------------------------------------------------------------

/// GET /api/projects
pub async fn list(State(state): State<AppState>) -> AppResult<Json<ProjectListResponse>> {
    let projects = ProjectRepo::list(&state.pool).await?;
    Ok(Json(ProjectListResponse { projects }))
}

/// GET /api/projects/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    PathParam(id): PathParam<ProjectId>,
) -> AppResult<Json<ProjectResponse>> {
    let project = find_project(&state, &id).await?;
    Ok(Json(ProjectResponse { project }))
}

/// PUT /api/projects/{id}/intent
pub async fn update_intent(
    State(state): State<AppState>,
    PathParam(id): PathParam<ProjectId>,
    JsonPayload(input): JsonPayload<IntentUpdate>,
) -> AppResult<Json<ProjectResponse>> {
    let now = Utc::now();
    let (project, ()) = ProjectRepo::update(&state.pool, &id, |project| {
        project.apply_intent_update(input.clone(), now)
    })
    .await?;

    tracing::info!(project_id = %project.id, status = %project.status, "Updated project intent");
    Ok(Json(ProjectResponse { project }))
}

/// Load a project or fail with 404.
pub(crate) async fn find_project(state: &AppState, id: &str) -> AppResult<ProjectState> {
    ProjectRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "Project",
                id: id.to_string(),
            })
        })
}
