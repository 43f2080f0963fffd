use crate::{AppState, handlers};
use axum::{Router, routing::put};

/// Admin Router Module
///
/// Account management, restricted to the `admin` role.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        // PUT /user/update/{id}
        // Sets another account's role. This is the only way a role changes after signup.
        .route("/user/update/{id}", put(handlers::update_user_role))
}
