//! Role model
//!
//! This module defines the closed set of roles used across the Orderflow
//! POS back office, along with the single parser that normalizes untrusted
//! role input (API payloads, stored user records) into the enum.

use serde::{Deserialize, Serialize};

/// User role within the POS platform.
///
/// Roles are hierarchical: Employee < Manager < Admin. Admin is the
/// designated superuser and passes every authorization check in the system
/// regardless of what a rule or permission row says.
///
/// # Permission Model
///
/// - **Employee**: Day-to-day POS operation (orders, table service)
/// - **Manager**: Branch operations, catalog and table management, reports
/// - **Admin**: Full platform control; bypasses all rule restrictions
///
/// # Examples
///
/// ```
/// use pos_policy::Role;
///
/// let role = Role::Manager;
/// assert!(role.is_allowed(&[Role::Manager, Role::Admin]));
/// assert!(!role.is_superuser());
///
/// // Admin passes even an empty allow-set
/// assert!(Role::Admin.is_allowed(&[]));
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Day-to-day POS operation
    Employee = 0,

    /// Branch operations and management sections
    Manager = 1,

    /// Full platform control (superuser)
    Admin = 2,
}

impl Role {
    /// Parse a role from untrusted string input.
    ///
    /// This is the only parser in the system: every role value arriving
    /// from the outside (login payloads, stored user records, tokens) must
    /// pass through here. Invalid or empty input resolves to `None`, never
    /// to a default role.
    ///
    /// # Arguments
    ///
    /// * `s` - String to parse (case-insensitive, supports legacy aliases)
    ///
    /// # Returns
    ///
    /// `Some(Role)` if valid, `None` otherwise
    ///
    /// # Examples
    ///
    /// ```
    /// use pos_policy::Role;
    ///
    /// assert_eq!(Role::parse("admin"), Some(Role::Admin));
    /// assert_eq!(Role::parse("MANAGER"), Some(Role::Manager));
    /// assert_eq!(Role::parse("staff"), Some(Role::Employee)); // Alias
    /// assert_eq!(Role::parse(""), None);
    /// assert_eq!(Role::parse("root"), None);
    /// ```
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "admin" | "administrator" => Some(Self::Admin),
            "manager" => Some(Self::Manager),
            "employee" | "staff" => Some(Self::Employee),
            _ => None,
        }
    }

    /// Get string representation of the role.
    ///
    /// # Examples
    ///
    /// ```
    /// use pos_policy::Role;
    ///
    /// assert_eq!(Role::Admin.as_str(), "admin");
    /// ```
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Employee => "employee",
            Self::Manager => "manager",
            Self::Admin => "admin",
        }
    }

    /// Get a human-readable display name for the role.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Employee => "Employee",
            Self::Manager => "Manager",
            Self::Admin => "Admin",
        }
    }

    /// Get all roles, lowest to highest.
    pub fn all() -> Vec<Self> {
        vec![Self::Employee, Self::Manager, Self::Admin]
    }

    /// Check if this role is the superuser role.
    ///
    /// The superuser satisfies every rule and every fine-grained
    /// permission check unconditionally.
    pub fn is_superuser(&self) -> bool {
        matches!(self, Self::Admin)
    }

    /// Check if this role passes an allow-set.
    ///
    /// True if the role is a member of `allowed` OR the role is the
    /// superuser. This is the single override rule: every coarse and
    /// fine-grained decision point in the system goes through here rather
    /// than re-implementing the superuser check.
    ///
    /// # Arguments
    ///
    /// * `allowed` - The set of roles a rule permits
    ///
    /// # Examples
    ///
    /// ```
    /// use pos_policy::Role;
    ///
    /// assert!(Role::Employee.is_allowed(&[Role::Employee]));
    /// assert!(!Role::Employee.is_allowed(&[Role::Manager]));
    /// assert!(Role::Admin.is_allowed(&[Role::Manager]));
    /// ```
    pub fn is_allowed(&self, allowed: &[Role]) -> bool {
        self.is_superuser() || allowed.contains(self)
    }
}
