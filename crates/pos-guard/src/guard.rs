//! Route guard state machine
//!
//! Sequences asynchronous identity/permission loading with the policy
//! decision into a finite access status, and carries the caller-visible
//! side effects: where to redirect on denial, and whether to emit the
//! one-time denial notification.
//!
//! The status is derived, never stored: every evaluation recomputes it
//! from the current identity state, permission cache, and requirement.
//! Only the notification latch is stateful, and it exists precisely so
//! that re-evaluating while still denied does not repeat the denial
//! message.

use serde::{Deserialize, Serialize};
use tracing::debug;

use pos_policy::{Action, PathPolicy, Role, RuleTable};

use crate::identity::AuthState;
use crate::permissions::EffectivePermissions;
use crate::store::PermissionCache;

/// Derived access status for one evaluation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AccessStatus {
    /// Identity or permission data is still loading; don't decide yet.
    Checking,
    /// Access granted.
    Authorized,
    /// No identity present; send to login.
    Unauthenticated,
    /// Identity present but not permitted.
    Unauthorized,
}

impl AccessStatus {
    /// Get the string representation of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessStatus::Checking => "checking",
            AccessStatus::Authorized => "authorized",
            AccessStatus::Unauthenticated => "unauthenticated",
            AccessStatus::Unauthorized => "unauthorized",
        }
    }

    /// Whether this is a terminal status for the current render cycle.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, AccessStatus::Checking)
    }
}

/// What a caller requires for the current path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessRequirement {
    /// No restriction declared.
    None,

    /// Coarse check: the user's role must pass this allow-set.
    Roles(Vec<Role>),

    /// Fine-grained check: one capability on one resource key.
    Permission {
        /// Resource key to check.
        resource: String,
        /// Capability required.
        action: Action,
    },

    /// Fine-grained check: at least one of these must pass.
    AnyPermission(Vec<(String, Action)>),
}

impl AccessRequirement {
    /// Whether this requirement consults fetched permission rows.
    pub fn is_fine_grained(&self) -> bool {
        matches!(
            self,
            AccessRequirement::Permission { .. } | AccessRequirement::AnyPermission(_)
        )
    }
}

/// Compute the access status for one evaluation.
///
/// Transition rules, in order:
/// 1. identity loading, or permission loading while a fine-grained
///    requirement is present → `Checking`
/// 2. no identity → `Unauthenticated`
/// 3. fine-grained requirement → `Authorized` iff the blender check passes
/// 4. role-set requirement → `Authorized` iff the role passes `is_allowed`
/// 5. no requirement → `Authorized`
///
/// A failed permission fetch counts as "no rows": fine-grained checks
/// fail closed for everyone but the superuser, and the error itself stays
/// observable on the cache.
pub fn evaluate_access(
    auth: &AuthState,
    cache: &PermissionCache,
    requirement: &AccessRequirement,
) -> AccessStatus {
    if auth.is_loading() {
        return AccessStatus::Checking;
    }
    if requirement.is_fine_grained() && cache.is_loading() {
        return AccessStatus::Checking;
    }

    let user = match auth.user() {
        Some(user) => user,
        None => return AccessStatus::Unauthenticated,
    };

    let granted = match requirement {
        AccessRequirement::None => true,
        AccessRequirement::Roles(allowed) => user
            .role
            .map(|role| role.is_allowed(allowed))
            .unwrap_or(false),
        AccessRequirement::Permission { resource, action } => {
            blended(cache, user.role).can(resource, *action)
        }
        AccessRequirement::AnyPermission(requirements) => {
            let refs: Vec<(&str, Action)> = requirements
                .iter()
                .map(|(resource, action)| (resource.as_str(), *action))
                .collect();
            blended(cache, user.role).can_any(&refs)
        }
    };

    if granted {
        AccessStatus::Authorized
    } else {
        AccessStatus::Unauthorized
    }
}

fn blended(cache: &PermissionCache, role: Option<Role>) -> EffectivePermissions {
    cache
        .permissions(role)
        .unwrap_or_else(|| EffectivePermissions::empty(role))
}

/// One-shot denial notification latch.
///
/// Emits at most once per falling edge into `Unauthorized`; re-arms only
/// when the status leaves `Unauthorized`. Repeated re-evaluations while
/// still denied stay silent.
#[derive(Debug, Default)]
pub struct NotificationLatch {
    notified: bool,
}

impl NotificationLatch {
    /// Create an armed latch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Observe a status; returns true when the denial notification
    /// should fire.
    pub fn observe(&mut self, status: AccessStatus) -> bool {
        match status {
            AccessStatus::Unauthorized => {
                if self.notified {
                    false
                } else {
                    self.notified = true;
                    true
                }
            }
            _ => {
                self.notified = false;
                false
            }
        }
    }
}

/// The caller-visible outcome of a guard evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardOutcome {
    /// Derived status.
    pub status: AccessStatus,

    /// Where to send the user, when denied.
    pub redirect: Option<String>,

    /// Whether to emit the one-time denial notification.
    pub notify: bool,
}

/// The route guard wiring policy resolution, status evaluation, and
/// denial side effects together.
///
/// One guard instance belongs to one session (it owns that session's
/// notification latch). The rule table it holds is immutable; swapping
/// tables means constructing a new guard.
///
/// # Examples
///
/// ```
/// use pos_guard::{AccessStatus, AuthState, PermissionCache, RouteGuard};
///
/// let mut guard = RouteGuard::with_defaults();
/// let cache = PermissionCache::new();
///
/// let auth = AuthState::Anonymous;
/// let outcome = guard.guard_route("/pos/tables", "GET", &auth, &cache);
/// assert_eq!(outcome.status, AccessStatus::Unauthenticated);
/// assert_eq!(outcome.redirect.as_deref(), Some("/login"));
/// ```
#[derive(Debug)]
pub struct RouteGuard {
    table: RuleTable,
    login_route: String,
    fallback_route: String,
    latch: NotificationLatch,
}

impl RouteGuard {
    /// Create a guard over a rule table.
    pub fn new(
        table: RuleTable,
        login_route: impl Into<String>,
        fallback_route: impl Into<String>,
    ) -> Self {
        Self {
            table,
            login_route: login_route.into(),
            fallback_route: fallback_route.into(),
            latch: NotificationLatch::new(),
        }
    }

    /// Create a guard over the builtin table with the platform's default
    /// login and fallback routes.
    pub fn with_defaults() -> Self {
        Self::new(RuleTable::builtin(), "/login", "/")
    }

    /// The rule table this guard evaluates against.
    pub fn table(&self) -> &RuleTable {
        &self.table
    }

    /// Guard a route by its coarse policy.
    ///
    /// Resolves the policy for the request, turns it into a requirement
    /// (public routes pass anyone, including anonymous users), evaluates,
    /// and applies denial side effects.
    pub fn guard_route(
        &mut self,
        path: &str,
        method: &str,
        auth: &AuthState,
        cache: &PermissionCache,
    ) -> GuardOutcome {
        let policy = self.table.resolve(path, method);

        if policy.public {
            // Public routes short-circuit before identity is consulted.
            self.latch.observe(AccessStatus::Authorized);
            return GuardOutcome {
                status: AccessStatus::Authorized,
                redirect: None,
                notify: false,
            };
        }

        let requirement = AccessRequirement::Roles(policy.allowed.clone());
        let status = evaluate_access(auth, cache, &requirement);
        debug!(
            path,
            method,
            rule = ?policy.rule_id,
            status = status.as_str(),
            "route guard evaluated"
        );
        self.outcome(status, Some(&policy))
    }

    /// Guard a fine-grained capability.
    pub fn guard_permission(
        &mut self,
        resource: &str,
        action: Action,
        auth: &AuthState,
        cache: &PermissionCache,
    ) -> GuardOutcome {
        let requirement = AccessRequirement::Permission {
            resource: resource.to_string(),
            action,
        };
        let status = evaluate_access(auth, cache, &requirement);
        debug!(
            resource,
            action = action.as_str(),
            status = status.as_str(),
            "permission guard evaluated"
        );
        self.outcome(status, None)
    }

    fn outcome(&mut self, status: AccessStatus, policy: Option<&PathPolicy>) -> GuardOutcome {
        let notify = self.latch.observe(status);
        let redirect = match status {
            AccessStatus::Unauthenticated => Some(self.login_route.clone()),
            AccessStatus::Unauthorized => Some(
                policy
                    .and_then(|p| p.redirect.clone())
                    .unwrap_or_else(|| self.fallback_route.clone()),
            ),
            _ => None,
        };
        GuardOutcome {
            status,
            redirect,
            notify,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::UserIdentity;
    use crate::permissions::EffectivePermissionRow;
    use uuid::Uuid;

    fn authed(role: &str) -> AuthState {
        AuthState::Authenticated(UserIdentity::from_record(
            Uuid::now_v7(),
            "user@orderflow.io",
            role,
        ))
    }

    fn loaded_cache(user: Uuid, rows: Vec<EffectivePermissionRow>) -> PermissionCache {
        let mut cache = PermissionCache::new();
        let ticket = cache.begin(user);
        cache.complete(ticket, Ok(rows));
        cache
    }

    fn products_row(create: bool) -> EffectivePermissionRow {
        EffectivePermissionRow {
            resource: "products".to_string(),
            route: "/pos/products".to_string(),
            can_access: true,
            can_view: true,
            can_create: create,
            can_update: false,
            can_delete: false,
        }
    }

    #[test]
    fn test_identity_loading_is_checking() {
        let cache = PermissionCache::new();
        let status = evaluate_access(&AuthState::Loading, &cache, &AccessRequirement::None);
        assert_eq!(status, AccessStatus::Checking);
    }

    #[test]
    fn test_permission_loading_is_checking_only_for_fine_grained() {
        let mut cache = PermissionCache::new();
        cache.begin(Uuid::now_v7());

        let fine = AccessRequirement::Permission {
            resource: "products".to_string(),
            action: Action::View,
        };
        assert_eq!(
            evaluate_access(&authed("manager"), &cache, &fine),
            AccessStatus::Checking
        );

        // A coarse check doesn't wait on permission rows.
        let coarse = AccessRequirement::Roles(vec![Role::Manager]);
        assert_eq!(
            evaluate_access(&authed("manager"), &cache, &coarse),
            AccessStatus::Authorized
        );
    }

    #[test]
    fn test_anonymous_is_unauthenticated() {
        let cache = PermissionCache::new();
        let requirement = AccessRequirement::Roles(vec![Role::Employee]);
        assert_eq!(
            evaluate_access(&AuthState::Anonymous, &cache, &requirement),
            AccessStatus::Unauthenticated
        );
    }

    #[test]
    fn test_role_check_pass_and_fail() {
        let cache = PermissionCache::new();
        let requirement = AccessRequirement::Roles(vec![Role::Manager]);
        assert_eq!(
            evaluate_access(&authed("manager"), &cache, &requirement),
            AccessStatus::Authorized
        );
        assert_eq!(
            evaluate_access(&authed("employee"), &cache, &requirement),
            AccessStatus::Unauthorized
        );
        // Superuser passes any role set.
        assert_eq!(
            evaluate_access(&authed("admin"), &cache, &requirement),
            AccessStatus::Authorized
        );
        // A user whose stored role was invalid passes nothing.
        assert_eq!(
            evaluate_access(&authed("wizard"), &cache, &requirement),
            AccessStatus::Unauthorized
        );
    }

    #[test]
    fn test_no_requirement_is_authorized() {
        let cache = PermissionCache::new();
        assert_eq!(
            evaluate_access(&authed("employee"), &cache, &AccessRequirement::None),
            AccessStatus::Authorized
        );
    }

    #[test]
    fn test_fine_grained_consults_rows() {
        let auth = authed("employee");
        let user = auth.user().unwrap().id;
        let cache = loaded_cache(user, vec![products_row(false)]);

        let view = AccessRequirement::Permission {
            resource: "products".to_string(),
            action: Action::View,
        };
        let create = AccessRequirement::Permission {
            resource: "products".to_string(),
            action: Action::Create,
        };
        assert_eq!(evaluate_access(&auth, &cache, &view), AccessStatus::Authorized);
        assert_eq!(evaluate_access(&auth, &cache, &create), AccessStatus::Unauthorized);
    }

    #[test]
    fn test_failed_fetch_fails_closed_but_not_for_superuser() {
        let auth = authed("manager");
        let mut cache = PermissionCache::new();
        let ticket = cache.begin(auth.user().unwrap().id);
        cache.complete(
            ticket,
            Err(crate::error::GuardError::FetchFailed("boom".into())),
        );

        let requirement = AccessRequirement::Permission {
            resource: "products".to_string(),
            action: Action::View,
        };
        assert_eq!(
            evaluate_access(&auth, &cache, &requirement),
            AccessStatus::Unauthorized
        );
        // The error stays observable; this is not a plain denial.
        assert!(cache.error().is_some());

        assert_eq!(
            evaluate_access(&authed("admin"), &cache, &requirement),
            AccessStatus::Authorized
        );
    }

    #[test]
    fn test_any_permission_requirement() {
        let auth = authed("employee");
        let user = auth.user().unwrap().id;
        let cache = loaded_cache(user, vec![products_row(false)]);

        let requirement = AccessRequirement::AnyPermission(vec![
            ("tables".to_string(), Action::View),
            ("products".to_string(), Action::View),
        ]);
        assert_eq!(
            evaluate_access(&auth, &cache, &requirement),
            AccessStatus::Authorized
        );
    }

    #[test]
    fn test_latch_fires_once_per_denial_episode() {
        let mut latch = NotificationLatch::new();
        assert!(latch.observe(AccessStatus::Unauthorized));
        assert!(!latch.observe(AccessStatus::Unauthorized));
        assert!(!latch.observe(AccessStatus::Unauthorized));

        // Leaving the denied state re-arms the latch.
        assert!(!latch.observe(AccessStatus::Authorized));
        assert!(latch.observe(AccessStatus::Unauthorized));
    }

    #[test]
    fn test_latch_ignores_checking_and_unauthenticated() {
        let mut latch = NotificationLatch::new();
        assert!(!latch.observe(AccessStatus::Checking));
        assert!(!latch.observe(AccessStatus::Unauthenticated));
    }

    #[test]
    fn test_guard_route_public_passes_anonymous() {
        let mut guard = RouteGuard::with_defaults();
        let cache = PermissionCache::new();
        let outcome = guard.guard_route("/login", "GET", &AuthState::Anonymous, &cache);
        assert_eq!(outcome.status, AccessStatus::Authorized);
        assert!(outcome.redirect.is_none());
        assert!(!outcome.notify);
    }

    #[test]
    fn test_guard_route_redirects_unauthenticated_to_login() {
        let mut guard = RouteGuard::with_defaults();
        let cache = PermissionCache::new();
        let outcome = guard.guard_route("/pos/tables", "GET", &AuthState::Anonymous, &cache);
        assert_eq!(outcome.status, AccessStatus::Unauthenticated);
        assert_eq!(outcome.redirect.as_deref(), Some("/login"));
        assert!(!outcome.notify);
    }

    #[test]
    fn test_guard_route_denial_uses_rule_redirect_and_notifies_once() {
        let mut guard = RouteGuard::with_defaults();
        let cache = PermissionCache::new();
        let auth = authed("employee");

        let first = guard.guard_route("/pos/products/manage", "GET", &auth, &cache);
        assert_eq!(first.status, AccessStatus::Unauthorized);
        assert_eq!(first.redirect.as_deref(), Some("/pos"));
        assert!(first.notify);

        // Re-render while still denied: same redirect, no second toast.
        let second = guard.guard_route("/pos/products/manage", "GET", &auth, &cache);
        assert_eq!(second.status, AccessStatus::Unauthorized);
        assert!(!second.notify);
    }

    #[test]
    fn test_guard_route_denied_by_default_falls_back_home() {
        let mut guard = RouteGuard::with_defaults();
        let cache = PermissionCache::new();
        let outcome = guard.guard_route("/totally/unknown", "GET", &authed("manager"), &cache);
        assert_eq!(outcome.status, AccessStatus::Unauthorized);
        assert_eq!(outcome.redirect.as_deref(), Some("/"));
    }

    #[test]
    fn test_guard_permission_uses_fallback_redirect() {
        let mut guard = RouteGuard::with_defaults();
        let auth = authed("employee");
        let cache = loaded_cache(auth.user().unwrap().id, vec![products_row(false)]);

        let outcome = guard.guard_permission("products", Action::Create, &auth, &cache);
        assert_eq!(outcome.status, AccessStatus::Unauthorized);
        assert_eq!(outcome.redirect.as_deref(), Some("/"));
        assert!(outcome.notify);
    }
}
