use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{delete, get, put},
};

/// Staff Router Module
///
/// Article moderation, restricted to the `admin` and `moderator` roles by a Role Gate
/// layered inside the Auth Gate.
pub fn staff_routes() -> Router<AppState> {
    Router::new()
        // PUT /article/update/{id}
        .route("/article/update/{id}", put(handlers::update_article))
        // DELETE /article/delete/{id}
        .route("/article/delete/{id}", delete(handlers::delete_article))
        // GET /user/me
        // Echoes the identity attached by the gates.
        .route("/user/me", get(handlers::whoami))
}
