use axum::{Router, extract::FromRef, http::HeaderName, middleware};
use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Token codec, Auth Gate and Role Gate.
pub mod auth;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod password;
pub mod repository;

// Routing segregated by gate (Public, Authenticated, Staff, Admin).
pub mod routes;
use auth::{RoleGate, require_auth, require_roles};
use routes::{admin, authenticated, public, staff};

// --- Public Re-exports ---

pub use config::AppConfig;
pub use repository::{PostgresRepository, RepositoryState};

/// ApiDoc
///
/// Auto-generated OpenAPI documentation, served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::welcome, handlers::list_articles, handlers::get_article,
        handlers::list_articles_by_type, handlers::signup, handlers::signin,
        handlers::create_article, handlers::update_article, handlers::delete_article,
        handlers::whoami, handlers::update_user_role
    ),
    components(
        schemas(
            models::Article, models::Credentials, models::UpdateRoleRequest,
            models::CreateArticleRequest, models::UpdateArticleRequest, models::UserProfile,
            models::WelcomeResponse, models::TokenResponse, models::UserResponse,
            models::ArticleResponse, models::ArticleListResponse, models::IdentityResponse,
            models::FailureResponse, auth::Identity,
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "articles", description = "Article publishing API")
    )
)]
struct ApiDoc;

/// Registers the `bearer` scheme referenced by the protected paths.
struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build()),
            );
        }
    }
}

/// AppState
///
/// The single, immutable container shared by every request: the persistence layer and the
/// configuration (including the token signing secret).
#[derive(Clone)]
pub struct AppState {
    /// Repository Layer: abstracts database access.
    pub repo: RepositoryState,
    /// Configuration: loaded once at startup, never mutated.
    pub config: AppConfig,
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// create_router
///
/// Assembles the routing structure, applies the gates per route group, and registers the
/// application state.
///
/// Layers added later run first, so every protected group lists its Role Gate before the
/// Auth Gate: authentication always happens before authorization.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let x_request_id = HeaderName::from_static("x-request-id");

    let auth_gate = middleware::from_fn_with_state(state.clone(), require_auth);

    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public::public_routes())
        .merge(authenticated::authenticated_routes().route_layer(auth_gate.clone()))
        .merge(
            staff::staff_routes()
                .route_layer(middleware::from_fn_with_state(
                    RoleGate::staff(),
                    require_roles,
                ))
                .route_layer(auth_gate.clone()),
        )
        .merge(
            admin::admin_routes()
                .route_layer(middleware::from_fn_with_state(
                    RoleGate::admin_only(),
                    require_roles,
                ))
                .route_layer(auth_gate),
        )
        .with_state(state);

    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Builds the per-request span with method, URI and `x-request-id`, so every log line of a
/// request can be correlated. Headers such as `Authorization` are deliberately not recorded.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
