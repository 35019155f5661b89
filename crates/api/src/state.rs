use std::sync::Arc;

use crate::automation::AutomationClient;
use crate::blob::BlobStore;
use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Project store connection pool.
    pub pool: content_engine_db::DbPool,
    /// Server configuration, including the callback secret and environment.
    pub config: Arc<ServerConfig>,
    /// Outbound client for the automation service.
    pub automation: AutomationClient,
    /// Where uploaded reference videos go.
    pub blobs: Arc<dyn BlobStore>,
}
