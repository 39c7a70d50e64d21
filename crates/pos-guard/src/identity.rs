//! Authenticated identity
//!
//! The identity shape the guard consumes. Role values arriving from
//! untrusted records (login payloads, stored users) are normalized through
//! [`Role::parse`] exactly once, at construction; a user whose stored role
//! is invalid carries no role rather than a defaulted one.

use pos_policy::Role;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An authenticated user as seen by the guard.
///
/// # Examples
///
/// ```
/// use pos_guard::UserIdentity;
/// use pos_policy::Role;
/// use uuid::Uuid;
///
/// let user = UserIdentity::from_record(Uuid::now_v7(), "ana@orderflow.io", "MANAGER");
/// assert_eq!(user.role, Some(Role::Manager));
///
/// let broken = UserIdentity::from_record(Uuid::now_v7(), "bo@orderflow.io", "wizard");
/// assert_eq!(broken.role, None);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserIdentity {
    /// User ID.
    pub id: Uuid,

    /// User email.
    pub email: String,

    /// User display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Parsed role. `None` when the stored value was missing or invalid.
    pub role: Option<Role>,
}

impl UserIdentity {
    /// Build an identity from a stored user record.
    ///
    /// The raw role string goes through the single role parser; invalid
    /// input never becomes a valid role.
    pub fn from_record(id: Uuid, email: impl Into<String>, raw_role: &str) -> Self {
        Self {
            id,
            email: email.into(),
            name: None,
            role: Role::parse(raw_role),
        }
    }

    /// Check if this user carries the superuser role.
    pub fn is_superuser(&self) -> bool {
        self.role.map(|r| r.is_superuser()).unwrap_or(false)
    }
}

/// Identity loading state, as reported by the authentication layer.
///
/// The guard treats `Loading` as "don't decide yet": callers should render
/// a checking state, not a denial.
#[derive(Debug, Clone)]
pub enum AuthState {
    /// Identity resolution is still in flight.
    Loading,

    /// No identity present.
    Anonymous,

    /// Identity resolved.
    Authenticated(UserIdentity),
}

impl AuthState {
    /// The authenticated user, if any.
    pub fn user(&self) -> Option<&UserIdentity> {
        match self {
            AuthState::Authenticated(user) => Some(user),
            _ => None,
        }
    }

    /// Whether identity resolution is still in flight.
    pub fn is_loading(&self) -> bool {
        matches!(self, AuthState::Loading)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_parses_role_once() {
        let user = UserIdentity::from_record(Uuid::now_v7(), "a@b.c", "admin");
        assert_eq!(user.role, Some(Role::Admin));
        assert!(user.is_superuser());
    }

    #[test]
    fn test_invalid_role_is_none_not_default() {
        let user = UserIdentity::from_record(Uuid::now_v7(), "a@b.c", "owner");
        assert_eq!(user.role, None);
        assert!(!user.is_superuser());
    }

    #[test]
    fn test_auth_state_accessors() {
        assert!(AuthState::Loading.is_loading());
        assert!(AuthState::Anonymous.user().is_none());

        let user = UserIdentity::from_record(Uuid::now_v7(), "a@b.c", "employee");
        let state = AuthState::Authenticated(user);
        assert!(!state.is_loading());
        assert_eq!(state.user().unwrap().role, Some(Role::Employee));
    }
}
