//! Authentication and authorization.
//!
//! Three pieces, applied in this order on every protected request:
//!
//! 1. [`token`]: the codec that signs and verifies session tokens.
//! 2. [`gate`]: the Auth Gate middleware that turns a `Bearer` header into an [`Identity`]
//!    stored in the request's extensions.
//! 3. [`roles`]: the Role Gate middleware that checks that identity against a per-route
//!    allow-list.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;

pub mod gate;
pub mod roles;
pub mod token;

pub use gate::require_auth;
pub use roles::{RoleGate, require_roles};

/// Identity
///
/// The authenticated caller, decoded from a token whose signature and expiry were both
/// validated during the current request. Lives only as long as that request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Identity {
    pub user_id: String,
    pub email: String,
    /// Absent for accounts that were never assigned a role.
    #[serde(default)]
    pub role: Option<String>,
}

/// AuthError
///
/// Every way the gates can reject a request. All variants are terminal for the request:
/// the client has to re-authenticate or obtain a different role out of band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// Header absent, not `Bearer <token>`, or a token that does not decode.
    #[error("missing or malformed credentials")]
    Malformed,
    /// Tampered token or one signed with a different secret.
    #[error("invalid token signature")]
    BadSignature,
    #[error("token has expired")]
    Expired,
    /// Authenticated, but the role is not on the route's allow-list.
    #[error("insufficient role for this resource")]
    Forbidden,
}

impl AuthError {
    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::Forbidden => StatusCode::FORBIDDEN,
            AuthError::Malformed | AuthError::BadSignature | AuthError::Expired => {
                StatusCode::UNAUTHORIZED
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let body = Json(serde_json::json!({ "failed": self.to_string() }));
        (self.status(), body).into_response()
    }
}
