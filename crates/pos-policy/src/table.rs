//! Builtin rule table
//!
//! The ordered policy table for the Orderflow POS product. Every known
//! route of the application is enumerated here; anything absent is denied
//! by default, so a new route MUST be added to this table before release
//! or it will be unreachable for every role.
//!
//! ORDERING IS LOAD-BEARING. Evaluation is first-match-wins, so within
//! each section the narrow rules come before the broad ones:
//! `/pos/products/manage` before `/pos/products` before `/pos`, and the
//! cross-cutting `/manage` rule before the generic catch-alls. The tests
//! at the bottom of this file pin that ordering.

use crate::resources::ResourceKey;
use crate::roles::Role;
use crate::rules::{HttpMethod, MatchKind, MatchRule};

const ALL_ROLES: &[Role] = &[Role::Admin, Role::Manager, Role::Employee];
const MANAGERS: &[Role] = &[Role::Admin, Role::Manager];
const ADMINS: &[Role] = &[Role::Admin];
const PUBLIC: &[Role] = &[];

const READ_METHODS: &[HttpMethod] = &[HttpMethod::Get, HttpMethod::Head];
const WRITE_METHODS: &[HttpMethod] = &[
    HttpMethod::Post,
    HttpMethod::Put,
    HttpMethod::Patch,
    HttpMethod::Delete,
];

/// The ordered builtin rules.
///
/// Sections, in order: public surfaces, API routes, pages.
pub fn builtin_rules() -> Vec<MatchRule> {
    vec![
        // ---- Public surfaces -------------------------------------------
        MatchRule {
            id: "login-page",
            resource: ResourceKey::Login,
            description: "Login page, reachable without identity",
            kind: MatchKind::Exact,
            pattern: "/login",
            methods: None,
            allowed: PUBLIC,
            redirect: None,
            public: true,
        },
        MatchRule {
            id: "auth-api",
            resource: ResourceKey::AuthApi,
            description: "Authentication API (login, refresh, logout)",
            kind: MatchKind::Prefix,
            pattern: "/api/auth",
            methods: None,
            allowed: PUBLIC,
            redirect: None,
            public: true,
        },
        // ---- API routes ------------------------------------------------
        MatchRule {
            id: "api-users",
            resource: ResourceKey::Users,
            description: "User administration API",
            kind: MatchKind::Prefix,
            pattern: "/api/users",
            methods: None,
            allowed: MANAGERS,
            redirect: None,
            public: false,
        },
        MatchRule {
            id: "api-pos-tables-read",
            resource: ResourceKey::Tables,
            description: "Table service API, reads",
            kind: MatchKind::Prefix,
            pattern: "/api/pos/tables",
            methods: Some(READ_METHODS),
            allowed: ALL_ROLES,
            redirect: None,
            public: false,
        },
        MatchRule {
            id: "api-pos-tables-write",
            resource: ResourceKey::TableManagement,
            description: "Table layout API, writes",
            kind: MatchKind::Prefix,
            pattern: "/api/pos/tables",
            methods: Some(WRITE_METHODS),
            allowed: MANAGERS,
            redirect: None,
            public: false,
        },
        MatchRule {
            id: "api-pos-orders",
            resource: ResourceKey::Orders,
            description: "Order taking API",
            kind: MatchKind::Prefix,
            pattern: "/api/pos/orders",
            methods: None,
            allowed: ALL_ROLES,
            redirect: None,
            public: false,
        },
        MatchRule {
            id: "api-products-read",
            resource: ResourceKey::Products,
            description: "Product catalog API, reads",
            kind: MatchKind::Prefix,
            pattern: "/api/products",
            methods: Some(READ_METHODS),
            allowed: ALL_ROLES,
            redirect: None,
            public: false,
        },
        MatchRule {
            id: "api-products-write",
            resource: ResourceKey::ProductManagement,
            description: "Product catalog API, writes",
            kind: MatchKind::Prefix,
            pattern: "/api/products",
            methods: Some(WRITE_METHODS),
            allowed: MANAGERS,
            redirect: None,
            public: false,
        },
        MatchRule {
            id: "api-branches",
            resource: ResourceKey::Branches,
            description: "Branch administration API",
            kind: MatchKind::Prefix,
            pattern: "/api/branch",
            methods: None,
            allowed: MANAGERS,
            redirect: None,
            public: false,
        },
        MatchRule {
            id: "api-reports",
            resource: ResourceKey::Reports,
            description: "Reporting API",
            kind: MatchKind::Prefix,
            pattern: "/api/reports",
            methods: Some(READ_METHODS),
            allowed: MANAGERS,
            redirect: None,
            public: false,
        },
        // ---- Pages -----------------------------------------------------
        MatchRule {
            id: "dashboard",
            resource: ResourceKey::Dashboard,
            description: "Landing dashboard",
            kind: MatchKind::Exact,
            pattern: "/",
            methods: None,
            allowed: ALL_ROLES,
            redirect: None,
            public: false,
        },
        // Narrow manage sub-routes before their parent sections.
        MatchRule {
            id: "pos-products-manage",
            resource: ResourceKey::ProductManagement,
            description: "Product catalog management pages",
            kind: MatchKind::Prefix,
            pattern: "/pos/products/manage",
            methods: None,
            allowed: MANAGERS,
            redirect: Some("/pos"),
            public: false,
        },
        MatchRule {
            id: "pos-products",
            resource: ResourceKey::Products,
            description: "Product catalog pages",
            kind: MatchKind::Prefix,
            pattern: "/pos/products",
            methods: None,
            allowed: ALL_ROLES,
            redirect: Some("/pos"),
            public: false,
        },
        MatchRule {
            id: "pos-tables-manage",
            resource: ResourceKey::TableManagement,
            description: "Table layout management pages",
            kind: MatchKind::Prefix,
            pattern: "/pos/tables/manage",
            methods: None,
            allowed: MANAGERS,
            redirect: Some("/pos"),
            public: false,
        },
        MatchRule {
            id: "pos-tables",
            resource: ResourceKey::Tables,
            description: "Table service pages",
            kind: MatchKind::Prefix,
            pattern: "/pos/tables",
            methods: None,
            allowed: ALL_ROLES,
            redirect: Some("/pos"),
            public: false,
        },
        // Cross-cutting: any remaining management sub-section is
        // restricted, wherever it lives.
        MatchRule {
            id: "manage-sections",
            resource: ResourceKey::Management,
            description: "Any path containing a management sub-segment",
            kind: MatchKind::Contains,
            pattern: "/manage",
            methods: None,
            allowed: MANAGERS,
            redirect: Some("/"),
            public: false,
        },
        MatchRule {
            id: "pos",
            resource: ResourceKey::Pos,
            description: "POS terminal area catch-all",
            kind: MatchKind::Prefix,
            pattern: "/pos",
            methods: None,
            allowed: ALL_ROLES,
            redirect: Some("/"),
            public: false,
        },
        MatchRule {
            id: "branches",
            resource: ResourceKey::Branches,
            description: "Branch administration pages",
            kind: MatchKind::Prefix,
            pattern: "/branch",
            methods: None,
            allowed: MANAGERS,
            redirect: Some("/"),
            public: false,
        },
        MatchRule {
            id: "users",
            resource: ResourceKey::Users,
            description: "User administration pages",
            kind: MatchKind::Prefix,
            pattern: "/users",
            methods: None,
            allowed: ADMINS,
            redirect: Some("/"),
            public: false,
        },
        MatchRule {
            id: "reports",
            resource: ResourceKey::Reports,
            description: "Reporting pages",
            kind: MatchKind::Prefix,
            pattern: "/reports",
            methods: None,
            allowed: MANAGERS,
            redirect: Some("/"),
            public: false,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::RuleTable;

    #[test]
    fn test_rule_ids_are_unique() {
        let rules = builtin_rules();
        for (i, a) in rules.iter().enumerate() {
            for b in &rules[i + 1..] {
                assert_ne!(a.id, b.id, "duplicate rule id {}", a.id);
            }
        }
    }

    #[test]
    fn test_narrow_rules_precede_broad_rules() {
        // For every prefix rule, no earlier prefix rule on the same
        // methods may govern a strict prefix of its pattern, or the later
        // rule would be unreachable.
        let rules = builtin_rules();
        for (i, narrow) in rules.iter().enumerate() {
            if narrow.kind != MatchKind::Prefix {
                continue;
            }
            for broad in &rules[..i] {
                if broad.kind != MatchKind::Prefix || broad.pattern == narrow.pattern {
                    continue;
                }
                let shadows = narrow.pattern.starts_with(broad.pattern)
                    && methods_overlap(broad.methods, narrow.methods);
                assert!(
                    !shadows,
                    "rule '{}' is unreachable: shadowed by earlier '{}'",
                    narrow.id, broad.id
                );
            }
        }
    }

    fn methods_overlap(a: Option<&[HttpMethod]>, b: Option<&[HttpMethod]>) -> bool {
        match (a, b) {
            (None, _) | (_, None) => true,
            (Some(a), Some(b)) => a.iter().any(|m| b.contains(m)),
        }
    }

    #[test]
    fn test_products_manage_listed_before_products_and_pos() {
        let table = RuleTable::builtin();
        let ids: Vec<&str> = table.rules().iter().map(|r| r.id).collect();
        let manage = ids.iter().position(|id| *id == "pos-products-manage").unwrap();
        let products = ids.iter().position(|id| *id == "pos-products").unwrap();
        let pos = ids.iter().position(|id| *id == "pos").unwrap();
        assert!(manage < products);
        assert!(products < pos);
    }

    #[test]
    fn test_public_rules_have_empty_allow_sets() {
        for rule in builtin_rules() {
            if rule.public {
                assert!(rule.allowed.is_empty(), "public rule {} lists roles", rule.id);
            } else {
                assert!(!rule.allowed.is_empty(), "rule {} allows nobody", rule.id);
            }
        }
    }

    #[test]
    fn test_api_rules_carry_no_redirect() {
        for rule in builtin_rules() {
            if rule.pattern.starts_with("/api") {
                assert!(rule.redirect.is_none(), "API rule {} has a redirect", rule.id);
            }
        }
    }
}
