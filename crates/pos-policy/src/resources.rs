//! Resource keys
//!
//! Defines the stable keys identifying permission-checkable capabilities,
//! independent of the literal URLs that reach them. Rule table entries and
//! effective-permission rows are joined on these keys.

use serde::{Deserialize, Serialize};

/// A permission-checkable resource within the POS platform.
///
/// Resource keys are grouped by the area that owns them:
/// - **Public**: Login, AuthApi
/// - **Front of house**: Pos, Tables, Orders
/// - **Catalog**: Products, ProductManagement
/// - **Back office**: Dashboard, TableManagement, Branches, Users, Reports, Management
/// - **Fallback**: UnknownPage, UnknownApi (deny-by-default placeholders)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKey {
    // Public
    /// Login page.
    Login,
    /// Authentication API surface.
    AuthApi,

    // Front of house
    /// The POS terminal area as a whole.
    Pos,
    /// Table service (floor view, seating).
    Tables,
    /// Order taking and fulfilment.
    Orders,

    // Catalog
    /// Product catalog browsing.
    Products,
    /// Product catalog management (create/edit/archive).
    ProductManagement,

    // Back office
    /// Landing dashboard.
    Dashboard,
    /// Table layout management.
    TableManagement,
    /// Branch administration.
    Branches,
    /// User administration.
    Users,
    /// Sales and activity reports.
    Reports,
    /// Cross-cutting management sections.
    Management,

    // Fallback placeholders for unmatched routes
    /// Unmatched page-style route (deny-by-default).
    UnknownPage,
    /// Unmatched API-style route (deny-by-default).
    UnknownApi,
}

impl ResourceKey {
    /// Get the string representation of the resource key.
    ///
    /// This is the join key against effective-permission rows and the
    /// identifier used in logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKey::Login => "login",
            ResourceKey::AuthApi => "auth_api",
            ResourceKey::Pos => "pos",
            ResourceKey::Tables => "tables",
            ResourceKey::Orders => "orders",
            ResourceKey::Products => "products",
            ResourceKey::ProductManagement => "product_management",
            ResourceKey::Dashboard => "dashboard",
            ResourceKey::TableManagement => "table_management",
            ResourceKey::Branches => "branches",
            ResourceKey::Users => "users",
            ResourceKey::Reports => "reports",
            ResourceKey::Management => "management",
            ResourceKey::UnknownPage => "unknown_page",
            ResourceKey::UnknownApi => "unknown_api",
        }
    }

    /// Parse a resource key from string representation.
    ///
    /// # Returns
    ///
    /// `Some(ResourceKey)` if valid, `None` otherwise
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "login" => Some(ResourceKey::Login),
            "auth_api" => Some(ResourceKey::AuthApi),
            "pos" => Some(ResourceKey::Pos),
            "tables" => Some(ResourceKey::Tables),
            "orders" => Some(ResourceKey::Orders),
            "products" => Some(ResourceKey::Products),
            "product_management" => Some(ResourceKey::ProductManagement),
            "dashboard" => Some(ResourceKey::Dashboard),
            "table_management" => Some(ResourceKey::TableManagement),
            "branches" => Some(ResourceKey::Branches),
            "users" => Some(ResourceKey::Users),
            "reports" => Some(ResourceKey::Reports),
            "management" => Some(ResourceKey::Management),
            "unknown_page" => Some(ResourceKey::UnknownPage),
            "unknown_api" => Some(ResourceKey::UnknownApi),
            _ => None,
        }
    }

    /// Check if this is one of the deny-by-default placeholder keys.
    pub fn is_placeholder(&self) -> bool {
        matches!(self, ResourceKey::UnknownPage | ResourceKey::UnknownApi)
    }
}
