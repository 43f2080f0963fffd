/// Router Module Index
///
/// Routes are grouped by the gates they sit behind, so access control is applied once per
/// group (via Axum layers in `create_router`) instead of inside individual handlers.

/// Routes accessible to anyone: reads, signup and signin.
pub mod public;

/// Routes behind the Auth Gate only.
pub mod authenticated;

/// Routes behind the Auth Gate and the `{admin, moderator}` Role Gate.
pub mod staff;

/// Routes behind the Auth Gate and the `{admin}` Role Gate.
pub mod admin;
