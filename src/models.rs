use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::Identity;

// --- Core Application Schemas (Mapped to Database) ---

/// User
///
/// The credential record stored in the `users` table. Never serialized to clients:
/// responses go through [`UserProfile`], which drops the password hash.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    // Unique login identifier.
    pub email: String,
    // bcrypt hash, including salt and cost.
    pub password_hash: String,
    // The RBAC field: 'user', 'moderator' or 'admin'.
    pub role: Option<String>,
}

impl User {
    /// The claim set embedded in this user's session tokens.
    pub fn identity(&self) -> Identity {
        Identity {
            user_id: self.id.to_string(),
            email: self.email.clone(),
            role: self.role.clone(),
        }
    }
}

/// NewUser
///
/// Insert payload for the `users` table, built by the signup handler after hashing.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub role: Option<String>,
}

/// Article
///
/// A published article from the `articles` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, FromRow)]
#[ts(export)]
pub struct Article {
    pub id: Uuid,
    // 'type' is a reserved keyword in Rust; JSON and SQL keep the original name.
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub article_type: String,
    pub title: String,
    pub body: String,
    // FK to users.id (author).
    pub user_id: Uuid,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

// --- Request Payloads (Input Schemas) ---

/// Credentials
///
/// Input payload for both signup (POST /user/signup) and signin (POST /user/signin).
/// The password is hashed or compared and then dropped; it is never persisted or logged.
#[derive(Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct Credentials {
    #[schema(example = "writer@example.com")]
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// UpdateRoleRequest
///
/// Input payload for the admin-only role change (PUT /user/update/{id}).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct UpdateRoleRequest {
    #[schema(example = "moderator")]
    pub role: String,
}

/// CreateArticleRequest
///
/// Input payload for publishing an article (POST /article/newpost).
/// The author is taken from the authenticated identity, not from the body.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct CreateArticleRequest {
    #[serde(rename = "type")]
    pub article_type: String,
    pub title: String,
    pub body: String,
}

/// UpdateArticleRequest
///
/// Input payload for editing an article (PUT /article/update/{id}). Both fields are
/// required; the type of an article is fixed at publication.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct UpdateArticleRequest {
    pub title: String,
    pub body: String,
}

// --- Response Schemas (Output) ---

/// UserProfile
///
/// Public view of a credential record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
    pub role: Option<String>,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            role: user.role,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct WelcomeResponse {
    pub message: String,
}

/// TokenResponse
///
/// Returned by a successful signin. `token` is sent back as `Authorization: Bearer <token>`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct TokenResponse {
    pub success: String,
    pub token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct UserResponse {
    pub success: String,
    pub content: UserProfile,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ArticleResponse {
    pub success: String,
    pub content: Article,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ArticleListResponse {
    pub success: String,
    pub content: Vec<Article>,
}

/// IdentityResponse
///
/// Echo of the identity the gates attached to the current request (GET /user/me).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct IdentityResponse {
    pub user: Identity,
}

/// FailureResponse
///
/// Body of every rejection, from the gates and from handlers alike.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct FailureResponse {
    pub failed: String,
}
