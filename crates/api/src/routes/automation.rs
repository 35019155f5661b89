//! Route definitions for the automation relay.

use axum::routing::post;
use axum::Router;

use crate::handlers::automation;
use crate::state::AppState;

/// Routes mounted at `/n8n`.
///
/// ```text
/// POST   /trigger                           -> trigger
/// POST   /callback                          -> callback
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/trigger", post(automation::trigger))
        .route("/callback", post(automation::callback))
}
