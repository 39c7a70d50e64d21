//! # POS Guard (Access Guard & Effective Permissions)
//!
//! This crate provides the identity-aware half of authorization for the
//! Orderflow POS platform: fetching a user's effective permissions,
//! blending them with the coarse route policy from `pos-policy`, and
//! sequencing the asynchronous pieces into a single access status the UI
//! or API boundary can act on.
//!
//! ## Overview
//!
//! The pos-guard crate handles:
//! - **Identity**: The authenticated user shape with a parsed role
//! - **Effective permissions**: Per-resource CRUD capability rows and the
//!   `can`/`can_any`/`can_by_route` checks
//! - **Permission source**: The async fetch abstraction plus the HTTP
//!   client for the permission service
//! - **Permission cache**: Per-identity rows with stale-fetch discard
//! - **Route guard**: The checking/authorized/unauthenticated/unauthorized
//!   state machine with denial side effects
//!
//! ## Architecture
//!
//! ```text
//! AuthState ──────────────┐
//!                         ▼
//! PermissionSource ─→ PermissionCache ─→ EffectivePermissions
//!        (async fetch, last-started-wins)        │
//!                         │                      ▼
//! RuleTable::resolve ─→ RouteGuard ─→ GuardOutcome
//!                                      { status, redirect, notify }
//! ```
//!
//! ## Decision precedence
//!
//! The superuser role passes every coarse and fine-grained check; the
//! override lives in `pos_policy::Role::is_allowed` and the blender's
//! short-circuit, nowhere else. Everything else fails closed: a missing
//! permission row, an unmatched route, or a failed fetch never grants
//! access.
//!
//! ## Usage
//!
//! ```rust
//! use pos_guard::{AccessStatus, AuthState, PermissionCache, RouteGuard, UserIdentity};
//! use uuid::Uuid;
//!
//! let mut guard = RouteGuard::with_defaults();
//! let mut cache = PermissionCache::new();
//!
//! let user = UserIdentity::from_record(Uuid::now_v7(), "ana@orderflow.io", "manager");
//! let ticket = cache.begin(user.id);
//! cache.complete(ticket, Ok(vec![]));
//!
//! let auth = AuthState::Authenticated(user);
//! let outcome = guard.guard_route("/branch", "GET", &auth, &cache);
//! assert_eq!(outcome.status, AccessStatus::Authorized);
//! ```
//!
//! ## Integration with pos-policy
//!
//! This crate works with `pos-policy`:
//! - `RouteGuard` resolves paths through the rule table
//! - Fine-grained checks join permission rows on `ResourceKey` strings

pub mod error;
pub mod guard;
pub mod identity;
pub mod permissions;
pub mod store;

// Re-export main types for convenience
pub use error::{GuardError, GuardResult};
pub use guard::{
    evaluate_access, AccessRequirement, AccessStatus, GuardOutcome, NotificationLatch, RouteGuard,
};
pub use identity::{AuthState, UserIdentity};
pub use permissions::{EffectivePermissionRow, EffectivePermissions};
pub use store::{
    FetchTicket, HttpPermissionSource, PermissionCache, PermissionEndpoint, PermissionSource,
};
