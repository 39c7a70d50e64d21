//! # POS Policy (Route Authorization Engine)
//!
//! This crate provides the route authorization policy engine for the
//! Orderflow POS platform, shared between the web back office and the API
//! gateway.
//!
//! ## Overview
//!
//! The pos-policy crate handles:
//! - **Roles**: The closed role set with a superuser override
//! - **Actions**: Fine-grained capabilities (access, view, create, update, delete)
//! - **Resources**: Stable keys identifying permission-checkable capabilities
//! - **Rules**: The ordered table describing every known route
//! - **Policies**: The resolved decision for a path/method pair
//!
//! ## Architecture
//!
//! ```text
//! (path, method)
//!     │
//!     ▼
//! RuleTable::find ── linear scan, first match wins
//!     │
//!     ▼
//! RuleTable::resolve ─→ PathPolicy { allowed, redirect, public,
//!                                    resource, denied_by_default }
//! ```
//!
//! Everything here is pure and stateless: the table is immutable after
//! construction, so it is safe to share across any number of request
//! handlers without locking. Per-identity state (fetched permission rows,
//! guard status) lives in the `pos-guard` crate.
//!
//! ## Deny by default
//!
//! Any path/method combination not enumerated in the rule table resolves
//! to a denied policy with an empty allow-set. New routes must be added to
//! the table before release or they are unreachable for every role.
//!
//! ## Usage
//!
//! ```rust
//! use pos_policy::{Role, RuleTable};
//!
//! let table = RuleTable::builtin();
//!
//! // Public route
//! let policy = table.resolve("/login", "GET");
//! assert!(policy.public);
//!
//! // Role-restricted route
//! let policy = table.resolve("/api/users", "GET");
//! assert!(policy.allows(Some(Role::Manager)));
//! assert!(!policy.allows(Some(Role::Employee)));
//!
//! // Unknown routes are denied
//! let policy = table.resolve("/api/internal/new-route", "GET");
//! assert!(policy.denied_by_default);
//! ```
//!
//! ## Ordering invariant
//!
//! Rule precedence is table order, not pattern specificity: a rule
//! governing a narrow sub-path (e.g. a module's `manage` sub-route) must
//! be declared before a broader rule governing its parent path, or the
//! narrow rule becomes unreachable. The matcher must stay a linear
//! first-match scan for the same reason.
//!
//! ## Integration with pos-guard
//!
//! This crate works with `pos-guard`:
//! - The route guard turns a `PathPolicy` into an access status
//! - Effective-permission rows are joined on `ResourceKey` strings

pub mod actions;
pub mod policy;
pub mod resources;
pub mod roles;
pub mod rules;
pub mod table;

// Re-export main types for convenience
pub use actions::Action;
pub use policy::PathPolicy;
pub use resources::ResourceKey;
pub use roles::Role;
pub use rules::{normalize_path, HttpMethod, MatchKind, MatchRule, RuleTable};
