use crate::{
    AppState,
    auth::{Identity, roles, token},
    errors::{ApiError, conflict_on_unique, not_found_on_foreign_key},
    models::{
        Article, ArticleListResponse, ArticleResponse, CreateArticleRequest, Credentials,
        FailureResponse, IdentityResponse, NewUser, TokenResponse, UpdateArticleRequest,
        UpdateRoleRequest, UserProfile, UserResponse, WelcomeResponse,
    },
    password,
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

// --- Public Handlers ---

/// welcome
///
/// [Public Route] Server smoke test.
#[utoipa::path(
    get,
    path = "/",
    responses((status = 200, description = "Server is up", body = WelcomeResponse))
)]
pub async fn welcome() -> Json<WelcomeResponse> {
    Json(WelcomeResponse {
        message: "Welcome to application server".to_string(),
    })
}

/// list_articles
///
/// [Public Route] Every published article, ordered by title descending.
/// An empty catalogue is reported as 404 rather than an empty list.
#[utoipa::path(
    get,
    path = "/article/all",
    responses(
        (status = 200, description = "All articles", body = ArticleListResponse),
        (status = 404, description = "Nothing published yet", body = FailureResponse)
    )
)]
pub async fn list_articles(
    State(state): State<AppState>,
) -> Result<Json<ArticleListResponse>, ApiError> {
    let articles = state.repo.list_articles().await?;
    if articles.is_empty() {
        return Err(ApiError::NotFound("no articles have been published"));
    }
    Ok(Json(ArticleListResponse {
        success: "returning all published articles".to_string(),
        content: articles,
    }))
}

/// get_article
///
/// [Public Route] A single article by ID.
#[utoipa::path(
    get,
    path = "/article/{id}",
    params(("id" = Uuid, Path, description = "Article ID")),
    responses(
        (status = 200, description = "Found", body = ArticleResponse),
        (status = 404, description = "Not Found", body = FailureResponse)
    )
)]
pub async fn get_article(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ArticleResponse>, ApiError> {
    let article = state
        .repo
        .get_article(id)
        .await?
        .ok_or(ApiError::NotFound("article not found"))?;
    Ok(Json(ArticleResponse {
        success: "article found".to_string(),
        content: article,
    }))
}

/// list_articles_by_type
///
/// [Public Route] All articles of one type, ordered by title descending. An unknown type
/// is simply an empty list.
#[utoipa::path(
    get,
    path = "/article/types/{type}",
    params(("type" = String, Path, description = "Article type")),
    responses((status = 200, description = "Articles of this type", body = ArticleListResponse))
)]
pub async fn list_articles_by_type(
    State(state): State<AppState>,
    Path(article_type): Path<String>,
) -> Result<Json<ArticleListResponse>, ApiError> {
    let articles = state.repo.list_articles_by_type(&article_type).await?;
    Ok(Json(ArticleListResponse {
        success: format!("returning all articles about {article_type}"),
        content: articles,
    }))
}

/// signup
///
/// [Public Route] Creates a credential record. New accounts always start with the `user`
/// role; elevation goes through the admin-only role update.
#[utoipa::path(
    post,
    path = "/user/signup",
    request_body = Credentials,
    responses(
        (status = 201, description = "Registered", body = UserResponse),
        (status = 409, description = "Email already registered", body = FailureResponse)
    )
)]
pub async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<Credentials>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    const TAKEN: &str = "email is already registered";

    if state.repo.find_user_by_email(&payload.email).await?.is_some() {
        return Err(ApiError::Conflict(TAKEN));
    }

    let password_hash = password::hash_password(payload.password, state.config.bcrypt_cost).await?;
    let user = state
        .repo
        .create_user(NewUser {
            email: payload.email,
            password_hash,
            role: Some(roles::USER.to_string()),
        })
        .await
        .map_err(|e| conflict_on_unique(e, TAKEN))?;

    tracing::info!(user_id = %user.id, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(UserResponse {
            success: "user registered".to_string(),
            content: user.into(),
        }),
    ))
}

/// signin
///
/// [Public Route] Exchanges email and password for a session token.
/// Unknown email and wrong password produce the same 401.
#[utoipa::path(
    post,
    path = "/user/signin",
    request_body = Credentials,
    responses(
        (status = 200, description = "Logged in", body = TokenResponse),
        (status = 401, description = "Invalid credentials", body = FailureResponse)
    )
)]
pub async fn signin(
    State(state): State<AppState>,
    Json(payload): Json<Credentials>,
) -> Result<Json<TokenResponse>, ApiError> {
    let Some(user) = state.repo.find_user_by_email(&payload.email).await? else {
        tracing::debug!("signin for unknown email");
        return Err(ApiError::InvalidCredentials);
    };

    if !password::verify_password(payload.password, user.password_hash.clone()).await? {
        tracing::debug!(user_id = %user.id, "signin with wrong password");
        return Err(ApiError::InvalidCredentials);
    }

    let config = &state.config;
    let token = token::issue(
        &user.identity(),
        config.token_secret.as_bytes(),
        config.token_ttl_secs,
    );
    tracing::info!(user_id = %user.id, "session token issued");
    Ok(Json(TokenResponse {
        success: "login successful".to_string(),
        token,
    }))
}

// --- Authenticated Handlers ---

/// create_article
///
/// [Authenticated Route] Publishes an article authored by the caller.
#[utoipa::path(
    post,
    path = "/article/newpost",
    request_body = CreateArticleRequest,
    responses(
        (status = 201, description = "Published", body = ArticleResponse),
        (status = 401, description = "Unauthenticated", body = FailureResponse),
        (status = 404, description = "Author account no longer exists", body = FailureResponse)
    ),
    security(("bearer" = []))
)]
pub async fn create_article(
    identity: Identity,
    State(state): State<AppState>,
    Json(payload): Json<CreateArticleRequest>,
) -> Result<(StatusCode, Json<ArticleResponse>), ApiError> {
    // Tokens are only ever issued for stored users, whose ids are UUIDs.
    let author = Uuid::parse_str(&identity.user_id).map_err(|_| {
        tracing::warn!("authenticated identity carries a non-UUID user id");
        crate::auth::AuthError::Malformed
    })?;

    let article = state
        .repo
        .create_article(payload, author)
        .await
        .map_err(|e| not_found_on_foreign_key(e, "author account no longer exists"))?;
    tracing::info!(article_id = %article.id, user_id = %author, "article published");
    Ok((
        StatusCode::CREATED,
        Json(ArticleResponse {
            success: "article published".to_string(),
            content: article,
        }),
    ))
}

// --- Staff Handlers (admin, moderator) ---

/// update_article
///
/// [Staff Route] Replaces an article's title and body.
#[utoipa::path(
    put,
    path = "/article/update/{id}",
    params(("id" = Uuid, Path, description = "Article ID")),
    request_body = UpdateArticleRequest,
    responses(
        (status = 200, description = "Updated", body = ArticleResponse),
        (status = 403, description = "Role not allowed", body = FailureResponse),
        (status = 404, description = "Not Found", body = FailureResponse)
    ),
    security(("bearer" = []))
)]
pub async fn update_article(
    identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateArticleRequest>,
) -> Result<Json<ArticleResponse>, ApiError> {
    let article = state
        .repo
        .update_article(id, payload)
        .await?
        .ok_or(ApiError::NotFound("article not found"))?;
    tracing::info!(article_id = %id, by = %identity.user_id, "article updated");
    Ok(Json(ArticleResponse {
        success: "article updated".to_string(),
        content: article,
    }))
}

/// delete_article
///
/// [Staff Route] Removes an article and returns what was removed.
#[utoipa::path(
    delete,
    path = "/article/delete/{id}",
    params(("id" = Uuid, Path, description = "Article ID")),
    responses(
        (status = 200, description = "Deleted", body = ArticleResponse),
        (status = 403, description = "Role not allowed", body = FailureResponse),
        (status = 404, description = "Not Found", body = FailureResponse)
    ),
    security(("bearer" = []))
)]
pub async fn delete_article(
    identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ArticleResponse>, ApiError> {
    let article: Article = state
        .repo
        .delete_article(id)
        .await?
        .ok_or(ApiError::NotFound("article not found"))?;
    tracing::info!(article_id = %id, by = %identity.user_id, "article deleted");
    Ok(Json(ArticleResponse {
        success: "article deleted".to_string(),
        content: article,
    }))
}

/// whoami
///
/// [Staff Route] Echoes the identity the gates attached to this request.
#[utoipa::path(
    get,
    path = "/user/me",
    responses(
        (status = 200, description = "Current identity", body = IdentityResponse),
        (status = 401, description = "Unauthenticated", body = FailureResponse),
        (status = 403, description = "Role not allowed", body = FailureResponse)
    ),
    security(("bearer" = []))
)]
pub async fn whoami(identity: Identity) -> Json<IdentityResponse> {
    Json(IdentityResponse { user: identity })
}

// --- Admin Handlers ---

/// update_user_role
///
/// [Admin Route] Changes another account's role. Takes effect on that user's next signin;
/// tokens already issued keep the role they were signed with until they expire.
#[utoipa::path(
    put,
    path = "/user/update/{id}",
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = UpdateRoleRequest,
    responses(
        (status = 200, description = "Updated", body = UserResponse),
        (status = 400, description = "Unknown role", body = FailureResponse),
        (status = 403, description = "Admins only", body = FailureResponse),
        (status = 404, description = "Not Found", body = FailureResponse)
    ),
    security(("bearer" = []))
)]
pub async fn update_user_role(
    identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateRoleRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    if !roles::is_known(&payload.role) {
        return Err(ApiError::BadRequest("unknown role"));
    }
    let user = state
        .repo
        .update_user_role(id, &payload.role)
        .await?
        .ok_or(ApiError::NotFound("user not found"))?;
    tracing::info!(user_id = %id, role = %payload.role, by = %identity.user_id, "role updated");
    Ok(Json(UserResponse {
        success: "user updated".to_string(),
        content: UserProfile::from(user),
    }))
}
