use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Endpoints that are **unauthenticated** and accessible to any client: the read-only
/// article catalogue and the identity gateway (signup and signin).
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /
        // Welcome message, used as a server smoke test.
        .route("/", get(handlers::welcome))
        // GET /health
        // Load balancer check. Returns "ok" without touching the database.
        .route("/health", get(|| async { "ok" }))
        // GET /article/all
        .route("/article/all", get(handlers::list_articles))
        // GET /article/types/{type}
        .route("/article/types/{type}", get(handlers::list_articles_by_type))
        // GET /article/{id}
        .route("/article/{id}", get(handlers::get_article))
        // POST /user/signup
        // Creates an account with the default `user` role.
        .route("/user/signup", post(handlers::signup))
        // POST /user/signin
        // Issues a session token for valid credentials.
        .route("/user/signin", post(handlers::signin))
}
