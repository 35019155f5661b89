//! Shared response envelope types for API handlers.
//!
//! Responses wrap their payload in a key naming what it is (`{ "project": .. }`,
//! `{ "projects": [..] }`) so the client can read them without guessing.

use content_engine_core::composition::{CompositionFrame, CompositionMetadata};
use content_engine_core::project::ProjectState;
use content_engine_core::scene::Scene;
use serde::Serialize;

/// `{ "project": .. }`
#[derive(Debug, Serialize)]
pub struct ProjectResponse {
    pub project: ProjectState,
}

/// `{ "projects": [..] }`
#[derive(Debug, Serialize)]
pub struct ProjectListResponse {
    pub projects: Vec<ProjectState>,
}

/// Composition metadata plus the scenes it was built from.
#[derive(Debug, Serialize)]
pub struct CompositionResponse {
    pub composition: CompositionMetadata,
    pub scenes: Vec<Scene>,
}

/// `{ "frame": .. }`
#[derive(Debug, Serialize)]
pub struct FrameResponse {
    pub frame: CompositionFrame,
}
