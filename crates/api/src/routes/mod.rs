pub mod automation;
pub mod composition;
pub mod health;
pub mod projects;

use axum::Router;

use crate::state::AppState;

/// Build the `/api` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /n8n/trigger                                     start a workflow (POST)
/// /n8n/callback                                    workflow stage result (POST, secret)
///
/// /projects                                        list, create (multipart)
/// /projects/{id}                                   get
/// /projects/{id}/intent                            edit / confirm intent (PUT)
/// /projects/{id}/composition                       composition for the stored script
/// /projects/{id}/composition/frames/{frame}        one frame's layout
///
/// /composition/default                             composition of the sample scenes
/// /composition/default/frames/{frame}              one frame's layout
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/n8n", automation::router())
        .nest("/projects", projects::router())
        .nest("/composition", composition::router())
}
