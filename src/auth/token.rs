//! Session token codec.
//!
//! Wire format: `base64url(payload) "." base64url(signature)`, unpadded, where the payload
//! is the JSON encoding of [`Claims`] and the signature is HMAC-SHA256 over the encoded
//! payload segment.

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::Utc;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use super::{AuthError, Identity};

type HmacSha256 = Hmac<Sha256>;

/// Claims
///
/// The signed payload: the identity plus its expiry as a unix timestamp (seconds).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub user_id: String,
    pub email: String,
    #[serde(default)]
    pub role: Option<String>,
    pub exp: i64,
}

impl From<Claims> for Identity {
    fn from(claims: Claims) -> Self {
        Identity {
            user_id: claims.user_id,
            email: claims.email,
            role: claims.role,
        }
    }
}

/// Issues a token for `identity` that expires `ttl_secs` from now.
///
/// A zero or negative TTL yields a token that is already expired.
pub fn issue(identity: &Identity, secret: &[u8], ttl_secs: i64) -> String {
    issue_at(identity, secret, ttl_secs, Utc::now().timestamp())
}

/// Same as [`issue`], with the clock supplied by the caller.
pub fn issue_at(identity: &Identity, secret: &[u8], ttl_secs: i64, now: i64) -> String {
    let claims = Claims {
        user_id: identity.user_id.clone(),
        email: identity.email.clone(),
        role: identity.role.clone(),
        exp: now.saturating_add(ttl_secs),
    };
    let json = serde_json::to_vec(&claims).expect("claims always serialize to JSON");
    let payload = URL_SAFE_NO_PAD.encode(json);

    let mut mac = mac(secret);
    mac.update(payload.as_bytes());
    let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

    format!("{payload}.{signature}")
}

/// Verifies `token` against `secret` and the current time.
pub fn verify(token: &str, secret: &[u8]) -> Result<Identity, AuthError> {
    verify_at(token, secret, Utc::now().timestamp())
}

/// Same as [`verify`], with the clock supplied by the caller.
///
/// The signature is checked (in constant time) before the payload is decoded, and the
/// expiry is only looked at once the payload is known to be authentic.
pub fn verify_at(token: &str, secret: &[u8], now: i64) -> Result<Identity, AuthError> {
    let (payload, signature) = token.split_once('.').ok_or(AuthError::Malformed)?;
    if payload.is_empty() || signature.is_empty() {
        return Err(AuthError::Malformed);
    }
    // Everything after the first '.' is signature text. Text that does not decode
    // cannot match the expected MAC.
    let signature = URL_SAFE_NO_PAD
        .decode(signature)
        .map_err(|_| AuthError::BadSignature)?;

    let mut mac = mac(secret);
    mac.update(payload.as_bytes());
    mac.verify_slice(&signature)
        .map_err(|_| AuthError::BadSignature)?;

    let json = URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|_| AuthError::Malformed)?;
    let claims: Claims = serde_json::from_slice(&json).map_err(|_| AuthError::Malformed)?;

    if now >= claims.exp {
        return Err(AuthError::Expired);
    }
    Ok(claims.into())
}

fn mac(secret: &[u8]) -> HmacSha256 {
    HmacSha256::new_from_slice(secret).expect("HMAC can take key of any size")
}
