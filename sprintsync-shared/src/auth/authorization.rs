/// Authorization policy
///
/// This module is the single place where "may this actor touch this
/// resource" is decided. Every check is a pure function over the acting
/// identity and the resource's owner id — no I/O, no mutation. Resource
/// lookup happens in the route handlers before the policy is consulted, so
/// the policy stays testable without a database.
///
/// # Permission Model
///
/// SprintSync has exactly two privilege levels:
///
/// 1. **Owner**: a user may read and modify resources they own
/// 2. **Admin**: a user with the admin flag may act on anything
///
/// Listing is not gated here — it is scoped in the query (admins see all
/// rows, everyone else only their own), which is a filter rather than a
/// per-item denial.
///
/// # Example
///
/// ```
/// use sprintsync_shared::auth::authorization::require_task_access;
/// use sprintsync_shared::auth::middleware::AuthContext;
/// use uuid::Uuid;
///
/// let owner = Uuid::new_v4();
/// let auth = AuthContext { user_id: owner, is_admin: false };
///
/// // Owners pass, strangers don't
/// assert!(require_task_access(&auth, owner).is_ok());
/// assert!(require_task_access(&auth, Uuid::new_v4()).is_err());
/// ```

use uuid::Uuid;

use super::middleware::AuthContext;

/// Error type for authorization checks
///
/// Every variant maps to 403 Forbidden at the transport layer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthzError {
    /// Actor neither owns the resource nor holds the admin flag
    #[error("Not allowed")]
    NotResourceOwner,

    /// Operation is restricted to admins
    #[error("Admin required")]
    AdminRequired,

    /// Actor tried to create a resource on behalf of another user
    #[error("Cannot create resources for other users")]
    CannotActForOthers,
}

/// Requires the actor to hold the admin flag
pub fn require_admin(auth: &AuthContext) -> Result<(), AuthzError> {
    if !auth.is_admin {
        return Err(AuthzError::AdminRequired);
    }

    Ok(())
}

/// Requires the actor to own the task or be an admin
///
/// Gates read, update, transition, and delete alike — the operation's
/// business effect is irrelevant to the decision.
pub fn require_task_access(auth: &AuthContext, owner_id: Uuid) -> Result<(), AuthzError> {
    if auth.is_admin || auth.user_id == owner_id {
        return Ok(());
    }

    Err(AuthzError::NotResourceOwner)
}

/// Requires the actor to be allowed to create a task for `owner_id`
///
/// Anyone may create tasks for themselves; only admins may assign a task
/// to another user at creation time.
pub fn require_task_create(auth: &AuthContext, owner_id: Uuid) -> Result<(), AuthzError> {
    if auth.user_id == owner_id || auth.is_admin {
        return Ok(());
    }

    Err(AuthzError::CannotActForOthers)
}

/// Requires the actor to be the named user or an admin
///
/// Gates user read and update.
pub fn require_self_or_admin(auth: &AuthContext, user_id: Uuid) -> Result<(), AuthzError> {
    if auth.is_admin || auth.user_id == user_id {
        return Ok(());
    }

    Err(AuthzError::NotResourceOwner)
}
