//! Password hashing.
//!
//! bcrypt is deliberately slow, so both calls run on the blocking pool and are awaited by
//! the handler; the result comes back as a plain value instead of through a callback.

use crate::errors::ApiError;

/// Hashes `password` with a fresh salt at the given bcrypt cost.
pub async fn hash_password(password: String, cost: u32) -> Result<String, ApiError> {
    let hashed = tokio::task::spawn_blocking(move || bcrypt::hash(password, cost)).await??;
    Ok(hashed)
}

/// Returns `Ok(false)` for a wrong password and `Err` only when `hash` is not a valid
/// bcrypt hash.
pub async fn verify_password(password: String, hash: String) -> Result<bool, ApiError> {
    let matches = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash)).await??;
    Ok(matches)
}
