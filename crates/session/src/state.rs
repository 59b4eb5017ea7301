//! The shared session context.
//!
//! One [`Session`] is created per process and handed (as `Arc<Session>`) to
//! the navigation pipeline, the transport and the list views. Tokens live in
//! the persistent store; the principal is memory-only and filled lazily.
//!
//! Invariant: a cached principal implies a non-empty primary token.

use std::sync::{Arc, RwLock};

use appealwall_auth::{NO_EXPIRY, Principal, Role, TokenGrant};

use crate::store::{InMemoryStore, KeyValueStore, StoreError, keys};

/// A bearer credential together with the slot it was read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Bearer {
    Primary(String),
    Secondary(String),
}

impl Bearer {
    pub fn token(&self) -> &str {
        match self {
            Bearer::Primary(t) | Bearer::Secondary(t) => t,
        }
    }

    pub fn into_token(self) -> String {
        match self {
            Bearer::Primary(t) | Bearer::Secondary(t) => t,
        }
    }
}

pub struct Session {
    persisted: Arc<dyn KeyValueStore>,
    scoped: Arc<dyn KeyValueStore>,
    principal: RwLock<Option<Principal>>,
}

impl core::fmt::Debug for Session {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Session")
            .field("has_token", &!self.token().is_empty())
            .field("token_expiry", &self.token_expiry())
            .field("logged_in", &self.is_logged_in())
            .finish()
    }
}

impl Session {
    /// `persisted` survives restarts; `scoped` lives as long as the browsing
    /// session and only carries the intended-URL marker.
    pub fn new(persisted: Arc<dyn KeyValueStore>, scoped: Arc<dyn KeyValueStore>) -> Self {
        Self {
            persisted,
            scoped,
            principal: RwLock::new(None),
        }
    }

    /// A session backed entirely by memory.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryStore::new()), Arc::new(InMemoryStore::new()))
    }

    pub fn token(&self) -> String {
        self.persisted.get_or(keys::TOKEN, "")
    }

    pub fn token_expiry(&self) -> i64 {
        self.read_expiry(keys::TOKEN_EXPIRY)
    }

    pub fn secondary_token(&self) -> String {
        self.persisted.get_or(keys::TOKEN_SECONDARY, "")
    }

    pub fn secondary_token_expiry(&self) -> i64 {
        self.read_expiry(keys::TOKEN_SECONDARY_EXPIRY)
    }

    fn read_expiry(&self, key: &str) -> i64 {
        match self.persisted.get(key) {
            None => NO_EXPIRY,
            Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
                tracing::warn!(key, value = %raw, "unparseable token expiry, treating as unknown");
                NO_EXPIRY
            }),
        }
    }

    /// Credential to send as `Authorization: Bearer`: the primary token,
    /// falling back to the secondary one.
    pub fn bearer(&self) -> Option<Bearer> {
        let primary = self.token();
        if !primary.is_empty() {
            return Some(Bearer::Primary(primary));
        }
        let secondary = self.secondary_token();
        (!secondary.is_empty()).then_some(Bearer::Secondary(secondary))
    }

    pub fn bearer_token(&self) -> Option<String> {
        self.bearer().map(Bearer::into_token)
    }

    /// Replace the primary token pair. Any cached principal belonged to the
    /// previous token and is dropped.
    pub fn set_primary(&self, grant: &TokenGrant) -> Result<(), StoreError> {
        self.write_principal(None);
        self.persisted.apply(&[
            (keys::TOKEN, Some(grant.token.clone())),
            (keys::TOKEN_EXPIRY, Some(grant.expiry.to_string())),
        ])
    }

    pub fn set_secondary(&self, grant: &TokenGrant) -> Result<(), StoreError> {
        self.persisted.apply(&[
            (keys::TOKEN_SECONDARY, Some(grant.token.clone())),
            (keys::TOKEN_SECONDARY_EXPIRY, Some(grant.expiry.to_string())),
        ])
    }

    pub fn clear_secondary(&self) -> Result<(), StoreError> {
        self.persisted
            .apply(&[(keys::TOKEN_SECONDARY, None), (keys::TOKEN_SECONDARY_EXPIRY, None)])
    }

    pub fn principal(&self) -> Option<Principal> {
        self.principal
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Cache a principal fetched with `fetched_with`.
    ///
    /// Returns false (and caches nothing) when the session no longer holds
    /// that token, e.g. a logout happened while the fetch was in flight.
    pub fn cache_principal(&self, principal: Principal, fetched_with: &str) -> bool {
        let current = self.token();
        if current.is_empty() || current != fetched_with {
            return false;
        }
        self.write_principal(Some(principal));
        true
    }

    fn write_principal(&self, principal: Option<Principal>) {
        *self.principal.write().unwrap_or_else(|e| e.into_inner()) = principal;
    }

    pub fn is_logged_in(&self) -> bool {
        self.principal
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .is_some()
    }

    pub fn has_role(&self, role: &Role) -> bool {
        self.principal
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .is_some_and(|p| p.has_role(role))
    }

    /// Whether any credential material is present.
    pub fn has_credentials(&self) -> bool {
        self.is_logged_in() || keys::CREDENTIALS.iter().any(|k| self.persisted.get(k).is_some())
    }

    /// Drop every credential and the cached principal in one step.
    ///
    /// Idempotent. Returns whether there was anything to clear. The principal
    /// is dropped even if the persistent write fails.
    pub fn clear(&self) -> Result<bool, StoreError> {
        let had_credentials = self.has_credentials();
        self.write_principal(None);
        let changes: Vec<_> = keys::CREDENTIALS.iter().map(|k| (*k, None)).collect();
        self.persisted.apply(&changes)?;
        Ok(had_credentials)
    }

    /// Clear the session only if it still holds `token` as primary token.
    pub fn clear_if_token(&self, token: &str) -> Result<bool, StoreError> {
        if self.token() != token {
            return Ok(false);
        }
        self.clear()
    }

    /// Clear the session only if `bearer` is still held in the slot it was
    /// read from.
    pub fn clear_if_bearer(&self, bearer: &Bearer) -> Result<bool, StoreError> {
        match bearer {
            Bearer::Primary(token) => self.clear_if_token(token),
            Bearer::Secondary(token) => {
                if !self.token().is_empty() || self.secondary_token() != *token {
                    return Ok(false);
                }
                self.clear()
            }
        }
    }

    pub fn set_intended_url(&self, full_path: &str) -> Result<(), StoreError> {
        self.scoped.set(keys::INTENDED_URL, full_path)
    }

    pub fn intended_url(&self) -> Option<String> {
        self.scoped.get(keys::INTENDED_URL)
    }

    /// Read and remove the intended-URL marker.
    pub fn take_intended_url(&self) -> Result<Option<String>, StoreError> {
        let url = self.scoped.get(keys::INTENDED_URL);
        if url.is_some() {
            self.scoped.remove(keys::INTENDED_URL)?;
        }
        Ok(url)
    }
}
