//! Route definitions for the `/projects` resource.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::{composition, projects};
use crate::state::AppState;

/// Routes mounted at `/projects`.
///
/// ```text
/// GET    /                                  -> list
/// POST   /                                  -> create
/// GET    /{id}                              -> get_by_id
/// PUT    /{id}/intent                       -> update_intent
/// GET    /{id}/composition                  -> composition::get_for_project
/// GET    /{id}/composition/frames/{frame}   -> composition::get_project_frame
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(projects::list).post(projects::create))
        .route("/{id}", get(projects::get_by_id))
        .route("/{id}/intent", put(projects::update_intent))
        .route("/{id}/composition", get(composition::get_for_project))
        .route(
            "/{id}/composition/frames/{frame}",
            get(composition::get_project_frame),
        )
}
