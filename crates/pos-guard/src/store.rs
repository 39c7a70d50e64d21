//! Permission source and per-identity cache
//!
//! Effective-permission rows are fetched once per authenticated session,
//! keyed by user id, and cached in memory until the identity changes. The
//! fetch is the only asynchronous operation in the core: it must be safe
//! to re-issue, and a stale response (started before a newer fetch for a
//! different — or the same — identity) must be discarded, not applied.
//! The generation-ticket protocol below enforces last-started-wins.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use pos_policy::Role;

use crate::error::{GuardError, GuardResult};
use crate::permissions::{EffectivePermissionRow, EffectivePermissions};

/// Source of effective-permission rows for a user.
///
/// Implementations must be idempotent: fetching the same user twice is
/// always safe. The core never retries; retry policy belongs to callers.
#[async_trait]
pub trait PermissionSource: Send + Sync {
    /// Fetch all effective-permission rows for a user.
    async fn fetch_for_user(&self, user_id: Uuid) -> GuardResult<Vec<EffectivePermissionRow>>;
}

/// Configuration for the permission service endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PermissionEndpoint {
    /// Base URL for the permission service.
    pub base_url: String,

    /// API key for service-to-service authentication.
    pub api_key: Option<String>,
}

impl PermissionEndpoint {
    /// Build a full URL by appending a path to the base URL.
    pub fn url(&self, path: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        format!("{}/{}", base, path)
    }
}

/// HTTP implementation of [`PermissionSource`].
///
/// Talks to the platform's permission service
/// (`GET /api/v1/users/{id}/permissions`).
#[derive(Clone)]
pub struct HttpPermissionSource {
    client: reqwest::Client,
    endpoint: PermissionEndpoint,
}

impl HttpPermissionSource {
    /// Create a new HTTP permission source.
    pub fn new(endpoint: PermissionEndpoint, timeout: std::time::Duration) -> GuardResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GuardError::Internal(e.to_string()))?;

        Ok(Self { client, endpoint })
    }
}

#[async_trait]
impl PermissionSource for HttpPermissionSource {
    #[instrument(skip(self), fields(user_id = %user_id))]
    async fn fetch_for_user(&self, user_id: Uuid) -> GuardResult<Vec<EffectivePermissionRow>> {
        debug!("Fetching effective permissions for user {}", user_id);

        let url = self
            .endpoint
            .url(&format!("/api/v1/users/{}/permissions", user_id));
        let mut request = self.client.get(&url);

        if let Some(ref api_key) = self.endpoint.api_key {
            request = request.header("Authorization", format!("Bearer {}", api_key));
        }

        let response = request
            .send()
            .await
            .map_err(|e| GuardError::FetchFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            warn!("Permission service error ({}): {}", status.as_u16(), message);
            return Err(GuardError::ServiceError {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json()
            .await
            .map_err(|e| GuardError::InvalidResponse(e.to_string()))
    }
}

/// Ticket identifying one started fetch.
///
/// Returned by [`PermissionCache::begin`]; must be handed back to
/// [`PermissionCache::complete`] with the fetch result. A ticket from a
/// superseded fetch is rejected there.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    user_id: Uuid,
    generation: u64,
}

#[derive(Debug)]
enum CacheState {
    Idle,
    Loading,
    Ready(Vec<EffectivePermissionRow>),
    Failed(GuardError),
}

/// Per-identity cache of fetched permission rows.
///
/// Owned by one session; never shared as mutable state across requests
/// for different identities. While a fetch is outstanding the cache
/// reports loading, and callers must treat every `can*` answer as
/// indeterminate rather than denied or allowed. A failed fetch is its own
/// state, observable via [`PermissionCache::error`], distinct from both
/// loading and denial.
///
/// # Staleness
///
/// Every started fetch increments a generation counter and gets a
/// [`FetchTicket`]. Completing with a ticket whose generation is no
/// longer current is a no-op: the last started fetch for the current
/// identity wins, regardless of arrival order.
///
/// # Examples
///
/// ```
/// use pos_guard::PermissionCache;
/// use uuid::Uuid;
///
/// let mut cache = PermissionCache::new();
/// let user = Uuid::now_v7();
///
/// let stale = cache.begin(user);
/// let fresh = cache.begin(user);
///
/// assert!(!cache.complete(stale, Ok(vec![])));  // discarded
/// assert!(cache.complete(fresh, Ok(vec![])));   // applied
/// ```
#[derive(Debug)]
pub struct PermissionCache {
    user_id: Option<Uuid>,
    generation: u64,
    state: CacheState,
    fetched_at: Option<DateTime<Utc>>,
}

impl PermissionCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self {
            user_id: None,
            generation: 0,
            state: CacheState::Idle,
            fetched_at: None,
        }
    }

    /// Start a fetch for a user.
    ///
    /// Any previously issued ticket becomes stale. Switching users drops
    /// the old user's rows immediately.
    pub fn begin(&mut self, user_id: Uuid) -> FetchTicket {
        if self.user_id != Some(user_id) {
            self.user_id = Some(user_id);
            self.fetched_at = None;
        }
        self.generation += 1;
        self.state = CacheState::Loading;
        FetchTicket {
            user_id,
            generation: self.generation,
        }
    }

    /// Apply a fetch result.
    ///
    /// Returns true if the result was applied, false if the ticket was
    /// stale and the result discarded.
    pub fn complete(
        &mut self,
        ticket: FetchTicket,
        result: GuardResult<Vec<EffectivePermissionRow>>,
    ) -> bool {
        if ticket.generation != self.generation || self.user_id != Some(ticket.user_id) {
            debug!(
                "Discarding stale permission fetch for user {} (generation {})",
                ticket.user_id, ticket.generation
            );
            return false;
        }
        match result {
            Ok(rows) => {
                debug!("Loaded {} permission rows for user {}", rows.len(), ticket.user_id);
                self.state = CacheState::Ready(rows);
                self.fetched_at = Some(Utc::now());
            }
            Err(err) => {
                warn!("Permission fetch failed for user {}: {}", ticket.user_id, err);
                self.state = CacheState::Failed(err);
                self.fetched_at = None;
            }
        }
        true
    }

    /// Fetch through a source and apply the result in one call.
    ///
    /// Returns true if the result was applied (it is discarded when a
    /// newer fetch started while this one was in flight).
    pub async fn refresh<S: PermissionSource + ?Sized>(
        &mut self,
        source: &S,
        user_id: Uuid,
    ) -> bool {
        let ticket = self.begin(user_id);
        let result = source.fetch_for_user(user_id).await;
        self.complete(ticket, result)
    }

    /// Drop all state, e.g. on sign-out.
    pub fn reset(&mut self) {
        self.user_id = None;
        self.generation += 1;
        self.state = CacheState::Idle;
        self.fetched_at = None;
    }

    /// The user the cache currently belongs to.
    pub fn user_id(&self) -> Option<Uuid> {
        self.user_id
    }

    /// Whether a fetch is outstanding.
    pub fn is_loading(&self) -> bool {
        matches!(self.state, CacheState::Loading)
    }

    /// The loaded rows, if the last fetch succeeded.
    pub fn rows(&self) -> Option<&[EffectivePermissionRow]> {
        match &self.state {
            CacheState::Ready(rows) => Some(rows),
            _ => None,
        }
    }

    /// The fetch error, if the last fetch failed.
    pub fn error(&self) -> Option<&GuardError> {
        match &self.state {
            CacheState::Failed(err) => Some(err),
            _ => None,
        }
    }

    /// When the current rows were fetched.
    pub fn fetched_at(&self) -> Option<DateTime<Utc>> {
        self.fetched_at
    }

    /// Blend the loaded rows with a role.
    ///
    /// `None` while loading, after a failure, or before any fetch.
    pub fn permissions(&self, role: Option<Role>) -> Option<EffectivePermissions> {
        self.rows()
            .map(|rows| EffectivePermissions::new(role, rows.to_vec()))
    }
}

impl Default for PermissionCache {
    fn default() -> Self {
        Self::new()
    }
}
