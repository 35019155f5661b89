use content_engine_core::error::CoreError;
use content_engine_core::types::ProjectId;

/// Errors raised by the project store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A stored document could not be encoded or decoded.
    #[error("Project document error: {0}")]
    Document(#[from] serde_json::Error),

    /// The mutation itself was rejected by the domain rules.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Every optimistic write attempt lost to a concurrent writer.
    #[error("Project {id} is being modified concurrently; gave up after {attempts} attempts")]
    Contention { id: ProjectId, attempts: u32 },
}
