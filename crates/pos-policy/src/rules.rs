//! Match rules and the rule table
//!
//! This module defines the ordered table of match rules that describes
//! every known route of the platform, and the first-match evaluation that
//! resolves a request against it.
//!
//! Evaluation is a linear scan in declaration order: the first rule whose
//! path predicate and method predicate both succeed wins. Precedence is
//! defined by table order, not by pattern length or specificity, so a rule
//! governing a narrow sub-path must be declared before a broader rule
//! governing its parent path.

use serde::{Deserialize, Serialize};

use crate::resources::ResourceKey;
use crate::roles::Role;

/// How a rule's pattern is compared against a request path.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    /// Full string equality after normalization.
    Exact,
    /// Path starts with the pattern.
    Prefix,
    /// Pattern appears anywhere in the path.
    Contains,
}

impl MatchKind {
    /// Get the string representation of the match kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchKind::Exact => "exact",
            MatchKind::Prefix => "prefix",
            MatchKind::Contains => "contains",
        }
    }

    /// Parse a match kind from string representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "exact" => Some(MatchKind::Exact),
            "prefix" => Some(MatchKind::Prefix),
            "contains" => Some(MatchKind::Contains),
            _ => None,
        }
    }
}

/// HTTP methods a rule can be scoped to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    /// GET requests.
    Get,
    /// HEAD requests.
    Head,
    /// POST requests.
    Post,
    /// PUT requests.
    Put,
    /// PATCH requests.
    Patch,
    /// DELETE requests.
    Delete,
}

impl HttpMethod {
    /// Get the canonical uppercase representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Head => "HEAD",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }

    /// Parse a method from string representation (case-insensitive).
    ///
    /// Unknown methods return `None`; a method-restricted rule never
    /// matches an unparseable method, while unrestricted rules still do.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "GET" => Some(HttpMethod::Get),
            "HEAD" => Some(HttpMethod::Head),
            "POST" => Some(HttpMethod::Post),
            "PUT" => Some(HttpMethod::Put),
            "PATCH" => Some(HttpMethod::Patch),
            "DELETE" => Some(HttpMethod::Delete),
            _ => None,
        }
    }
}

/// Normalize a request path before matching.
///
/// Trailing slashes are trimmed (so `/branch` and `/branch/` are treated
/// identically) and a missing leading slash is tolerated by comparing
/// against the slash-prefixed form.
///
/// # Examples
///
/// ```
/// use pos_policy::normalize_path;
///
/// assert_eq!(normalize_path("/branch/"), "/branch");
/// assert_eq!(normalize_path("branch"), "/branch");
/// assert_eq!(normalize_path("/"), "/");
/// ```
pub fn normalize_path(path: &str) -> String {
    let trimmed = path.trim();
    let without_trailing = trimmed.trim_end_matches('/');
    if without_trailing.is_empty() {
        return "/".to_string();
    }
    if without_trailing.starts_with('/') {
        without_trailing.to_string()
    } else {
        format!("/{}", without_trailing)
    }
}

/// One entry in the ordered policy table.
///
/// A rule binds a path/method pattern to the set of roles allowed to pass,
/// the resource key used for fine-grained lookups and telemetry, and the
/// UI redirect to apply on denial. Rules are immutable; the table they
/// live in is constructed once and replaced wholesale on reload.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct MatchRule {
    /// Stable identifier for logs and tests.
    pub id: &'static str,

    /// Resource key for fine-grained permission lookups.
    pub resource: ResourceKey,

    /// Human description of what the rule governs.
    pub description: &'static str,

    /// How the pattern is compared against the path.
    pub kind: MatchKind,

    /// The path pattern.
    pub pattern: &'static str,

    /// Methods this rule applies to. `None` means all methods.
    pub methods: Option<&'static [HttpMethod]>,

    /// Roles allowed to pass. Empty for public rules.
    pub allowed: &'static [Role],

    /// Where the UI should send a denied user, if anywhere.
    pub redirect: Option<&'static str>,

    /// Whether the route requires no identity at all.
    pub public: bool,
}

impl MatchRule {
    /// Check whether this rule's path predicate matches a normalized path.
    fn matches_path(&self, path: &str) -> bool {
        match self.kind {
            MatchKind::Exact => path == self.pattern,
            MatchKind::Prefix => path.starts_with(self.pattern),
            MatchKind::Contains => path.contains(self.pattern),
        }
    }

    /// Check whether this rule's method predicate matches a request method.
    fn matches_method(&self, method: &str) -> bool {
        match self.methods {
            None => true,
            Some(set) => match HttpMethod::parse(method) {
                Some(m) => set.contains(&m),
                None => false,
            },
        }
    }

    /// Check whether this rule matches a request.
    ///
    /// The path is normalized before comparison; the method is compared
    /// case-insensitively.
    pub fn matches(&self, path: &str, method: &str) -> bool {
        let normalized = normalize_path(path);
        self.matches_path(&normalized) && self.matches_method(method)
    }
}

/// The ordered, immutable table of match rules.
///
/// Order is a correctness invariant: evaluation is first-match-wins, so a
/// rule governing a narrow sub-path must appear strictly before a broader
/// rule governing its parent path or the narrow rule is unreachable. Any
/// "reload" replaces the whole table with a newly constructed one; entries
/// are never patched in place.
///
/// # Examples
///
/// ```
/// use pos_policy::RuleTable;
///
/// let table = RuleTable::builtin();
/// let rule = table.find("/login", "GET").unwrap();
/// assert!(rule.public);
/// ```
#[derive(Debug, Clone)]
pub struct RuleTable {
    rules: Vec<MatchRule>,
}

impl RuleTable {
    /// Build a table from an ordered list of rules.
    ///
    /// The caller's ordering is preserved verbatim; it defines precedence.
    pub fn new(rules: Vec<MatchRule>) -> Self {
        Self { rules }
    }

    /// The builtin table for the Orderflow POS product.
    ///
    /// See [`crate::table`] for the rule set itself.
    pub fn builtin() -> Self {
        Self::new(crate::table::builtin_rules())
    }

    /// Find the first rule matching a request, scanning in declaration
    /// order.
    ///
    /// Returns `None` when no rule matches; callers interpret that as
    /// deny-by-default.
    ///
    /// # Arguments
    ///
    /// * `path` - Request path (normalized internally)
    /// * `method` - HTTP method (case-insensitive)
    pub fn find(&self, path: &str, method: &str) -> Option<&MatchRule> {
        let normalized = normalize_path(path);
        self.rules
            .iter()
            .find(|rule| rule.matches_path(&normalized) && rule.matches_method(method))
    }

    /// Look up a rule by its stable identifier.
    pub fn rule_by_id(&self, id: &str) -> Option<&MatchRule> {
        self.rules.iter().find(|rule| rule.id == id)
    }

    /// All rules in declaration order.
    pub fn rules(&self) -> &[MatchRule] {
        &self.rules
    }

    /// Number of rules in the table.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Check if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(id: &'static str, kind: MatchKind, pattern: &'static str) -> MatchRule {
        MatchRule {
            id,
            resource: ResourceKey::Pos,
            description: "test rule",
            kind,
            pattern,
            methods: None,
            allowed: &[Role::Admin],
            redirect: None,
            public: false,
        }
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path("/branch"), "/branch");
        assert_eq!(normalize_path("/branch/"), "/branch");
        assert_eq!(normalize_path("/branch//"), "/branch");
        assert_eq!(normalize_path("branch"), "/branch");
        assert_eq!(normalize_path("/"), "/");
        assert_eq!(normalize_path(""), "/");
    }

    #[test]
    fn test_exact_match() {
        let r = rule("exact", MatchKind::Exact, "/login");
        assert!(r.matches("/login", "GET"));
        assert!(r.matches("/login/", "GET"));
        assert!(!r.matches("/login/extra", "GET"));
    }

    #[test]
    fn test_prefix_match() {
        let r = rule("prefix", MatchKind::Prefix, "/pos/products");
        assert!(r.matches("/pos/products", "GET"));
        assert!(r.matches("/pos/products/", "GET"));
        assert!(r.matches("/pos/products/manage/create", "GET"));
        assert!(!r.matches("/pos", "GET"));
    }

    #[test]
    fn test_contains_match() {
        let r = rule("contains", MatchKind::Contains, "/manage");
        assert!(r.matches("/pos/tables/manage", "GET"));
        assert!(r.matches("/anything/manage/deep", "GET"));
        assert!(!r.matches("/pos/tables", "GET"));
    }

    #[test]
    fn test_method_scoping() {
        let mut r = rule("methods", MatchKind::Prefix, "/api/pos/tables");
        r.methods = Some(&[HttpMethod::Get, HttpMethod::Head]);
        assert!(r.matches("/api/pos/tables", "GET"));
        assert!(r.matches("/api/pos/tables", "get"));
        assert!(r.matches("/api/pos/tables", "HEAD"));
        assert!(!r.matches("/api/pos/tables", "POST"));
        // Unknown methods never match a restricted rule
        assert!(!r.matches("/api/pos/tables", "TRACE"));
    }

    #[test]
    fn test_unrestricted_rule_matches_any_method() {
        let r = rule("any", MatchKind::Prefix, "/api/pos/orders");
        assert!(r.matches("/api/pos/orders", "GET"));
        assert!(r.matches("/api/pos/orders", "POST"));
        assert!(r.matches("/api/pos/orders", "TRACE"));
    }

    #[test]
    fn test_first_match_wins() {
        let table = RuleTable::new(vec![
            rule("narrow", MatchKind::Prefix, "/pos/products/manage"),
            rule("broad", MatchKind::Prefix, "/pos"),
        ]);
        assert_eq!(table.find("/pos/products/manage", "GET").unwrap().id, "narrow");
        assert_eq!(table.find("/pos/other", "GET").unwrap().id, "broad");
    }

    #[test]
    fn test_declaration_order_beats_specificity() {
        // Deliberately list the broad rule first: it must shadow the
        // narrow one, because precedence is table order.
        let table = RuleTable::new(vec![
            rule("broad", MatchKind::Prefix, "/pos"),
            rule("narrow", MatchKind::Prefix, "/pos/products/manage"),
        ]);
        assert_eq!(table.find("/pos/products/manage", "GET").unwrap().id, "broad");
    }

    #[test]
    fn test_no_match_returns_none() {
        let table = RuleTable::new(vec![rule("only", MatchKind::Exact, "/login")]);
        assert!(table.find("/unknown", "GET").is_none());
    }

    #[test]
    fn test_http_method_parse() {
        assert_eq!(HttpMethod::parse("get"), Some(HttpMethod::Get));
        assert_eq!(HttpMethod::parse("POST"), Some(HttpMethod::Post));
        assert_eq!(HttpMethod::parse("Patch"), Some(HttpMethod::Patch));
        assert_eq!(HttpMethod::parse("TRACE"), None);
        assert_eq!(HttpMethod::parse(""), None);
    }

    #[test]
    fn test_match_kind_parse() {
        assert_eq!(MatchKind::parse("exact"), Some(MatchKind::Exact));
        assert_eq!(MatchKind::parse("PREFIX"), Some(MatchKind::Prefix));
        assert_eq!(MatchKind::parse("contains"), Some(MatchKind::Contains));
        assert_eq!(MatchKind::parse("regex"), None);
    }
}
