use crate::{AppState, handlers};
use axum::{Router, routing::post};

/// Authenticated Router Module
///
/// Routes open to any caller holding a valid, unexpired token, whatever its role.
/// Handlers receive the caller through the `Identity` extractor.
pub fn authenticated_routes() -> Router<AppState> {
    Router::new()
        // POST /article/newpost
        // Publishes an article; the author is the authenticated caller.
        .route("/article/newpost", post(handlers::create_article))
}
