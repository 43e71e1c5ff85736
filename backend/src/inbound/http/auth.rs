//! Capability checks for session-authenticated handlers.
//!
//! Authorisation always runs against the stored user record resolved from
//! the session, never against role or identity fields supplied in the
//! request.

use uuid::Uuid;

use crate::domain::user::{Role, User};
use crate::domain::{Error, ErrorCode};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Resolve the acting user from the session.
///
/// A session naming a user that no longer exists maps to `401` rather than
/// `404`, so stale cookies behave like missing ones.
pub(crate) async fn require_user(
    state: &HttpState,
    session: &SessionContext,
) -> Result<User, Error> {
    let user_id = session.require_user_id()?;
    state.queries.user(user_id).await.map_err(|err| {
        if matches!(err.code, ErrorCode::NotFound) {
            Error::unauthorized("session user no longer exists")
        } else {
            err
        }
    })
}

/// Require the acting user to hold the given role.
pub(crate) fn require_role(user: &User, role: Role) -> Result<(), Error> {
    if user.role == role {
        Ok(())
    } else {
        Err(Error::forbidden(format!(
            "this action requires the {role} role"
        )))
    }
}

/// Require the acting user to own the scope or be an admin.
pub(crate) fn require_self_or_admin(user: &User, owner_id: Uuid) -> Result<(), Error> {
    if user.id == owner_id || user.role == Role::Admin {
        Ok(())
    } else {
        Err(Error::forbidden(
            "only the owner or an admin may access this resource",
        ))
    }
}
