//! Effective permissions
//!
//! The fine-grained layer on top of the coarse rule decision: per user,
//! per resource key, five capability booleans fetched from the permission
//! service and blended with the user's role. The superuser role passes
//! every check without consulting the rows; everything else fails closed
//! when a row is missing.

use pos_policy::{normalize_path, Action, Role};
use serde::{Deserialize, Serialize};

/// One effective-permission row for the authenticated user.
///
/// Rows arrive from the permission service keyed by resource, each bound
/// to the route that resource logically lives under. Wire names are the
/// service's camelCase.
///
/// # Examples
///
/// ```
/// use pos_guard::EffectivePermissionRow;
/// use pos_policy::Action;
///
/// let row: EffectivePermissionRow = serde_json::from_str(
///     r#"{"resource":"products","route":"/pos/products",
///         "canAccess":true,"canView":true,"canCreate":false,
///         "canUpdate":false,"canDelete":false}"#,
/// ).unwrap();
/// assert!(row.allows(Action::View));
/// assert!(!row.allows(Action::Create));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EffectivePermissionRow {
    /// Resource key this row grants capabilities on.
    pub resource: String,

    /// Route the resource is logically bound to.
    pub route: String,

    /// May enter the resource's section.
    pub can_access: bool,

    /// May read resource data.
    pub can_view: bool,

    /// May create instances.
    pub can_create: bool,

    /// May modify instances.
    pub can_update: bool,

    /// May remove instances.
    pub can_delete: bool,
}

impl EffectivePermissionRow {
    /// Check whether this row grants an action.
    pub fn allows(&self, action: Action) -> bool {
        match action {
            Action::Access => self.can_access,
            Action::View => self.can_view,
            Action::Create => self.can_create,
            Action::Update => self.can_update,
            Action::Delete => self.can_delete,
        }
    }
}

/// The per-identity blend of role and fetched permission rows.
///
/// Constructed once the permission fetch for a user has resolved; the
/// role and the rows travel together so every check sees a consistent
/// snapshot. Scoped per identity — never share one instance across users.
///
/// # Examples
///
/// ```
/// use pos_guard::{EffectivePermissionRow, EffectivePermissions};
/// use pos_policy::{Action, Role};
///
/// let rows = vec![EffectivePermissionRow {
///     resource: "products".to_string(),
///     route: "/pos/products".to_string(),
///     can_access: true,
///     can_view: true,
///     can_create: false,
///     can_update: false,
///     can_delete: false,
/// }];
///
/// let perms = EffectivePermissions::new(Some(Role::Employee), rows);
/// assert!(perms.can("products", Action::View));
/// assert!(!perms.can("products", Action::Create));
/// assert!(!perms.can("unknown", Action::View)); // fail closed
/// ```
#[derive(Debug, Clone)]
pub struct EffectivePermissions {
    role: Option<Role>,
    rows: Vec<EffectivePermissionRow>,
}

impl EffectivePermissions {
    /// Blend a role with fetched rows.
    pub fn new(role: Option<Role>, rows: Vec<EffectivePermissionRow>) -> Self {
        Self { role, rows }
    }

    /// An empty snapshot for a user with no fetched rows.
    pub fn empty(role: Option<Role>) -> Self {
        Self::new(role, Vec::new())
    }

    /// The blended role.
    pub fn role(&self) -> Option<Role> {
        self.role
    }

    /// The fetched rows.
    pub fn rows(&self) -> &[EffectivePermissionRow] {
        &self.rows
    }

    fn is_superuser(&self) -> bool {
        self.role.map(|r| r.is_superuser()).unwrap_or(false)
    }

    /// Check one capability on one resource key.
    ///
    /// The superuser role returns true without consulting the rows. For
    /// everyone else the row for `resource` decides; a missing row is
    /// false, never a grant.
    pub fn can(&self, resource: &str, action: Action) -> bool {
        if self.is_superuser() {
            return true;
        }
        self.rows
            .iter()
            .find(|row| row.resource == resource)
            .map(|row| row.allows(action))
            .unwrap_or(false)
    }

    /// Check a list of requirements; true iff at least one passes.
    pub fn can_any(&self, requirements: &[(&str, Action)]) -> bool {
        if self.is_superuser() {
            return true;
        }
        requirements
            .iter()
            .any(|(resource, action)| self.can(resource, *action))
    }

    /// Check a capability by route instead of resource key.
    ///
    /// Candidate rows are those whose bound route equals the normalized
    /// path or is a prefix of it at a `/` boundary. Among candidates the
    /// LONGEST bound route wins: when `/pos/products` and
    /// `/pos/products/manage` both match, the manage row decides. Two
    /// distinct routes of equal length cannot both match one path, so the
    /// only residual tie is a duplicated route, where the first row in
    /// fetch order is taken.
    pub fn can_by_route(&self, path: &str, action: Action) -> bool {
        if self.is_superuser() {
            return true;
        }
        let path = normalize_path(path);
        let mut best: Option<(&EffectivePermissionRow, usize)> = None;
        for row in &self.rows {
            let route = normalize_path(&row.route);
            if path != route && !path.starts_with(&format!("{}/", route)) {
                continue;
            }
            // Strictly-longer only, so a duplicated route keeps the first
            // row in fetch order.
            if best.map(|(_, len)| route.len() > len).unwrap_or(true) {
                best = Some((row, route.len()));
            }
        }
        best.map(|(row, _)| row.allows(action)).unwrap_or(false)
    }
}
