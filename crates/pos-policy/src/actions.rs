//! Permission actions
//!
//! Defines the fine-grained capabilities that can be granted per resource.
//! These mirror the columns of the effective-permission rows served by the
//! permission store.

use serde::{Deserialize, Serialize};

/// Fine-grained action on a resource.
///
/// Each action corresponds to one boolean field of an effective-permission
/// row:
/// - **Access**: Enter the resource's section at all
/// - **View**: Read resource data
/// - **Create**: Create new instances
/// - **Update**: Modify existing instances
/// - **Delete**: Remove instances
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Enter the resource's section.
    Access,

    /// Read resource data.
    View,

    /// Create new instances.
    Create,

    /// Modify existing instances.
    Update,

    /// Remove instances.
    Delete,
}

impl Action {
    /// Get the string representation of the action.
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Access => "access",
            Action::View => "view",
            Action::Create => "create",
            Action::Update => "update",
            Action::Delete => "delete",
        }
    }

    /// Parse action from string representation.
    ///
    /// # Arguments
    ///
    /// * `s` - String to parse (case-insensitive, supports aliases)
    ///
    /// # Returns
    ///
    /// `Some(Action)` if valid, `None` otherwise
    ///
    /// # Example
    ///
    /// ```
    /// use pos_policy::Action;
    ///
    /// assert_eq!(Action::parse("view"), Some(Action::View));
    /// assert_eq!(Action::parse("read"), Some(Action::View)); // Alias
    /// assert_eq!(Action::parse("invalid"), None);
    /// ```
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "access" | "enter" => Some(Action::Access),
            "view" | "read" | "get" => Some(Action::View),
            "create" | "add" | "new" => Some(Action::Create),
            "update" | "edit" | "modify" => Some(Action::Update),
            "delete" | "remove" | "destroy" => Some(Action::Delete),
            _ => None,
        }
    }

    /// Get all actions.
    pub fn all() -> Vec<Self> {
        vec![
            Action::Access,
            Action::View,
            Action::Create,
            Action::Update,
            Action::Delete,
        ]
    }

    /// Check if this action modifies data.
    pub fn is_write(&self) -> bool {
        matches!(self, Action::Create | Action::Update | Action::Delete)
    }
}
