//! Repository for the `projects` table.

use content_engine_core::error::CoreError;
use content_engine_core::project::ProjectState;

use crate::error::StoreError;
use crate::models::project::ProjectRow;
use crate::DbPool;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, status, document, version, created_at, updated_at";

/// Optimistic writes give up after this many lost races.
pub const MAX_UPDATE_ATTEMPTS: u32 = 8;

/// Stores one [`ProjectState`] document per project id.
pub struct ProjectRepo;

impl ProjectRepo {
    /// Insert a new project. A duplicate id is a conflict.
    pub async fn create(pool: &DbPool, project: &ProjectState) -> Result<ProjectState, StoreError> {
        project.validate()?;
        let document = serde_json::to_string(project)?;

        let result = sqlx::query(
            "INSERT INTO projects (id, status, document, version, created_at, updated_at)
             VALUES (?, ?, ?, 1, ?, ?)",
        )
        .bind(&project.id)
        .bind(project.status.as_str())
        .bind(&document)
        .bind(project.created_at)
        .bind(project.updated_at)
        .execute(pool)
        .await;

        match result {
            Ok(_) => Ok(project.clone()),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Err(CoreError::Conflict(
                format!("Project {} already exists", project.id),
            )
            .into()),
            Err(e) => Err(e.into()),
        }
    }

    /// Find a project by id.
    pub async fn find_by_id(pool: &DbPool, id: &str) -> Result<Option<ProjectState>, StoreError> {
        Self::find_row(pool, id)
            .await?
            .map(ProjectRow::into_state)
            .transpose()
    }

    /// List all projects, most recently created first.
    pub async fn list(pool: &DbPool) -> Result<Vec<ProjectState>, StoreError> {
        let query = format!("SELECT {COLUMNS} FROM projects ORDER BY created_at DESC, id DESC");
        sqlx::query_as::<_, ProjectRow>(&query)
            .fetch_all(pool)
            .await?
            .into_iter()
            .map(ProjectRow::into_state)
            .collect()
    }

    /// Atomically read, mutate and write back one project.
    ///
    /// `mutate` runs against the latest stored document and may run more than
    /// once if another writer commits in between; it must not have side
    /// effects beyond the project it is given. The mutated document is
    /// validated before every write.
    pub async fn update<T, F>(
        pool: &DbPool,
        id: &str,
        mut mutate: F,
    ) -> Result<(ProjectState, T), StoreError>
    where
        F: FnMut(&mut ProjectState) -> Result<T, CoreError>,
    {
        for attempt in 1..=MAX_UPDATE_ATTEMPTS {
            let row = Self::find_row(pool, id)
                .await?
                .ok_or_else(|| CoreError::NotFound {
                    entity: "Project",
                    id: id.to_string(),
                })?;
            let version = row.version;
            let mut project = row.into_state()?;

            let value = mutate(&mut project)?;
            project.validate()?;
            let document = serde_json::to_string(&project)?;

            let result = sqlx::query(
                "UPDATE projects
                 SET status = ?, document = ?, version = version + 1, updated_at = ?
                 WHERE id = ? AND version = ?",
            )
            .bind(project.status.as_str())
            .bind(&document)
            .bind(project.updated_at)
            .bind(id)
            .bind(version)
            .execute(pool)
            .await?;

            if result.rows_affected() == 1 {
                return Ok((project, value));
            }
            tracing::debug!(project_id = %id, attempt, "Project changed underneath update, retrying");
        }

        tracing::warn!(project_id = %id, attempts = MAX_UPDATE_ATTEMPTS, "Giving up on contended project update");
        Err(StoreError::Contention {
            id: id.to_string(),
            attempts: MAX_UPDATE_ATTEMPTS,
        })
    }

    async fn find_row(pool: &DbPool, id: &str) -> Result<Option<ProjectRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM projects WHERE id = ?");
        sqlx::query_as::<_, ProjectRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
