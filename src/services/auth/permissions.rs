//! Permission (RBAC) check on verified claims.

use super::{claims::Claims, error::AuthError};

/// Succeeds when `claims` grants `required`. Permission strings are opaque.
pub fn check_permission(claims: &Claims, required: &str) -> Result<(), AuthError> {
    let granted = claims
        .permissions
        .as_ref()
        .ok_or(AuthError::MissingPermissionsClaim)?;

    if granted.contains(required) {
        Ok(())
    } else {
        Err(AuthError::InsufficientPermission)
    }
}
