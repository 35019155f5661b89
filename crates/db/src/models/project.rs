//! Project row model.

use content_engine_core::project::ProjectState;
use content_engine_core::types::{ProjectId, Timestamp};
use sqlx::FromRow;

use crate::error::StoreError;

/// A row from the `projects` table. `document` holds the serialized
/// [`ProjectState`]; `status` and the timestamps mirror it.
#[derive(Debug, Clone, FromRow)]
pub struct ProjectRow {
    pub id: ProjectId,
    pub status: String,
    pub document: String,
    pub version: i64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl ProjectRow {
    pub fn into_state(self) -> Result<ProjectState, StoreError> {
        Ok(serde_json::from_str(&self.document)?)
    }
}
