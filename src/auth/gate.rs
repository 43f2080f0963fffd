use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, header, request::Parts},
    middleware::Next,
    response::Response,
};

use super::{AuthError, Identity, token};
use crate::config::AppConfig;

/// require_auth
///
/// The Auth Gate. Wrap protected routers with
/// `middleware::from_fn_with_state(state, require_auth)`.
///
/// On success the verified [`Identity`] is inserted into the request's extensions, where
/// handlers pick it up through the `Identity` extractor. On any failure the request is
/// answered with 401 and the downstream handler never runs.
pub async fn require_auth(
    State(config): State<AppConfig>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let identity = authenticate(request.headers(), config.token_secret.as_bytes())?;
    tracing::debug!(user_id = %identity.user_id, "request authenticated");

    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}

/// Resolves the caller's identity from the `Authorization: Bearer <token>` header.
pub fn authenticate(headers: &HeaderMap, secret: &[u8]) -> Result<Identity, AuthError> {
    let token = bearer_token(headers)?;
    token::verify(token, secret).inspect_err(|err| {
        // The token itself is credential material and stays out of the logs.
        tracing::warn!(reason = %err, "token rejected");
    })
}

fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::Malformed)?
        .to_str()
        .map_err(|_| AuthError::Malformed)?;

    // Auth schemes are case-insensitive.
    match value.split_once(' ') {
        Some((scheme, token))
            if scheme.eq_ignore_ascii_case("Bearer") && !token.trim().is_empty() =>
        {
            Ok(token.trim())
        }
        _ => {
            tracing::debug!("authorization header is not a bearer credential");
            Err(AuthError::Malformed)
        }
    }
}

/// Identity Extractor
///
/// Reads the identity attached by [`require_auth`]. Using it on a route that is not behind
/// the Auth Gate always rejects with 401, never falls back to an anonymous caller.
impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Identity>()
            .cloned()
            .ok_or(AuthError::Malformed)
    }
}
