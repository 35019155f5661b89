use axum::routing::get;
use axum::Router;

use crate::handlers::composition;
use crate::state::AppState;

/// Routes mounted at `/composition`.
///
/// ```text
/// GET    /default                           -> get_default
/// GET    /default/frames/{frame}            -> get_default_frame
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/default", get(composition::get_default))
        .route("/default/frames/{frame}", get(composition::get_default_frame))
}
