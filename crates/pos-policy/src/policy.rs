//! Path policy resolution
//!
//! Wraps the rule matcher's output (or its absence) into the canonical
//! decision object consumed by the route guard and the API boundary.
//!
//! Resolution is fail-closed: any path/method combination not explicitly
//! enumerated in the rule table is denied, never allowed.

use serde::Serialize;

use crate::resources::ResourceKey;
use crate::roles::Role;
use crate::rules::{normalize_path, RuleTable};

/// Redirect applied to unmatched page-style routes.
const DEFAULT_PAGE_REDIRECT: &str = "/";

/// API-style paths are distinguished by this prefix; unmatched ones get a
/// pure error status instead of a browser redirect.
const API_PREFIX: &str = "/api";

/// The resolved authorization policy for one request.
///
/// Produced by [`RuleTable::resolve`]; a pure value with no behavior
/// beyond the [`PathPolicy::allows`] convenience check.
///
/// # Examples
///
/// ```
/// use pos_policy::{Role, RuleTable};
///
/// let table = RuleTable::builtin();
/// let policy = table.resolve("/api/users", "GET");
/// assert!(!policy.denied_by_default);
/// assert!(policy.allows(Some(Role::Manager)));
/// assert!(!policy.allows(Some(Role::Employee)));
/// ```
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PathPolicy {
    /// Roles allowed to pass. Empty when public or denied-by-default.
    pub allowed: Vec<Role>,

    /// Where the UI should send a denied user, if anywhere.
    pub redirect: Option<String>,

    /// Whether the route requires no identity at all.
    pub public: bool,

    /// Resource key for fine-grained lookups and telemetry.
    pub resource: ResourceKey,

    /// Set only when no rule matched the request.
    pub denied_by_default: bool,

    /// Identifier of the matched rule, for telemetry.
    pub rule_id: Option<&'static str>,
}

impl PathPolicy {
    /// Check whether an optional role passes this policy.
    ///
    /// Public routes pass everyone, identity or not. Non-public routes
    /// require a role that passes [`Role::is_allowed`], which includes the
    /// superuser override; `None` fails them.
    pub fn allows(&self, role: Option<Role>) -> bool {
        if self.public {
            return true;
        }
        match role {
            Some(role) => role.is_allowed(&self.allowed),
            None => false,
        }
    }
}

impl RuleTable {
    /// Resolve the policy for a request.
    ///
    /// If a rule matches, its allow-set, redirect, public flag, and
    /// resource key are copied into the policy verbatim. If none matches,
    /// the policy denies by default: empty allow-set, not public, and a
    /// placeholder resource key synthesized from the path shape —
    /// [`ResourceKey::UnknownApi`] with no redirect for API-style paths,
    /// [`ResourceKey::UnknownPage`] with the home redirect for the rest.
    ///
    /// Pure and idempotent: identical inputs give identical outputs.
    pub fn resolve(&self, path: &str, method: &str) -> PathPolicy {
        match self.find(path, method) {
            Some(rule) => PathPolicy {
                allowed: rule.allowed.to_vec(),
                redirect: rule.redirect.map(str::to_string),
                public: rule.public,
                resource: rule.resource,
                denied_by_default: false,
                rule_id: Some(rule.id),
            },
            None => {
                let normalized = normalize_path(path);
                let is_api = normalized == API_PREFIX
                    || normalized.starts_with(&format!("{}/", API_PREFIX));
                PathPolicy {
                    allowed: Vec::new(),
                    redirect: if is_api {
                        None
                    } else {
                        Some(DEFAULT_PAGE_REDIRECT.to_string())
                    },
                    public: false,
                    resource: if is_api {
                        ResourceKey::UnknownApi
                    } else {
                        ResourceKey::UnknownPage
                    },
                    denied_by_default: true,
                    rule_id: None,
                }
            }
        }
    }
}
