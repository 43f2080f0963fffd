use std::{collections::HashSet, sync::Arc};

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use super::{AuthError, Identity};

// Canonical role vocabulary. Comparisons are exact and case-sensitive.
pub const ADMIN: &str = "admin";
pub const MODERATOR: &str = "moderator";
/// Assigned to every account created through signup.
pub const USER: &str = "user";

/// Whether `role` belongs to the vocabulary above.
pub fn is_known(role: &str) -> bool {
    [ADMIN, MODERATOR, USER].contains(&role)
}

/// RoleGate
///
/// A fixed allow-list of roles for one group of routes. Built once when the router is
/// assembled and shared read-only between concurrent requests.
#[derive(Debug, Clone)]
pub struct RoleGate {
    allowed: Arc<HashSet<String>>,
}

impl RoleGate {
    pub fn new<I, R>(roles: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<String>,
    {
        Self {
            allowed: Arc::new(roles.into_iter().map(Into::into).collect()),
        }
    }

    /// Admins and moderators: article moderation.
    pub fn staff() -> Self {
        Self::new([ADMIN, MODERATOR])
    }

    /// Admins only: account management.
    pub fn admin_only() -> Self {
        Self::new([ADMIN])
    }

    /// check
    ///
    /// Allows iff an identity is present and its role is a member of the allow-list.
    /// A missing identity or a missing role is a rejection, never "no restriction".
    pub fn check(&self, identity: Option<&Identity>) -> Result<(), AuthError> {
        match identity.and_then(|id| id.role.as_deref()) {
            Some(role) if self.allowed.contains(role) => Ok(()),
            _ => Err(AuthError::Forbidden),
        }
    }
}

/// require_roles
///
/// The Role Gate middleware. Must be layered inside [`super::require_auth`]:
///
/// ```ignore
/// routes
///     .route_layer(middleware::from_fn_with_state(RoleGate::staff(), require_roles))
///     .route_layer(middleware::from_fn_with_state(state, require_auth))
/// ```
pub async fn require_roles(
    State(gate): State<RoleGate>,
    request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let identity = request.extensions().get::<Identity>();
    if let Err(err) = gate.check(identity) {
        tracing::warn!(
            user_id = identity.map(|id| id.user_id.as_str()).unwrap_or("anonymous"),
            role = identity.and_then(|id| id.role.as_deref()).unwrap_or("none"),
            "role gate rejected request"
        );
        return Err(err);
    }
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_role(role: Option<&str>) -> Identity {
        Identity {
            user_id: "u1".to_string(),
            email: "a@b.com".to_string(),
            role: role.map(str::to_string),
        }
    }

    #[test]
    fn admin_allowed_moderator_rejected() {
        let gate = RoleGate::admin_only();
        assert_eq!(gate.check(Some(&with_role(Some("admin")))), Ok(()));
        assert_eq!(
            gate.check(Some(&with_role(Some("moderator")))),
            Err(AuthError::Forbidden)
        );
    }

    #[test]
    fn membership_is_case_sensitive() {
        let gate = RoleGate::admin_only();
        assert_eq!(
            gate.check(Some(&with_role(Some("Admin")))),
            Err(AuthError::Forbidden)
        );
    }

    #[test]
    fn missing_identity_or_role_is_rejected() {
        let gate = RoleGate::staff();
        assert_eq!(gate.check(None), Err(AuthError::Forbidden));
        assert_eq!(gate.check(Some(&with_role(None))), Err(AuthError::Forbidden));
    }

    #[test]
    fn staff_gate_accepts_both_roles_only() {
        let gate = RoleGate::staff();
        assert!(gate.check(Some(&with_role(Some(ADMIN)))).is_ok());
        assert!(gate.check(Some(&with_role(Some(MODERATOR)))).is_ok());
        assert!(gate.check(Some(&with_role(Some(USER)))).is_err());
        assert!(gate.check(Some(&with_role(Some("moderador")))).is_err());
    }

    #[test]
    fn vocabulary_excludes_misspellings() {
        assert!(is_known("moderator"));
        assert!(!is_known("moderador"));
        assert!(!is_known("Admin"));
    }

    #[test]
    fn empty_allow_list_rejects_everyone() {
        let gate = RoleGate::new(Vec::<String>::new());
        assert!(gate.check(Some(&with_role(Some(ADMIN)))).is_err());
    }
}
