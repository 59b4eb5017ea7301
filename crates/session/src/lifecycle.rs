//! Session lifecycle: expiry, lazy principal refresh, login and logout.

use std::sync::Arc;

use thiserror::Error;

use appealwall_auth::{Principal, Role, TokenGrant, TokenResponse, is_expired};
use appealwall_core::{ApiError, Clock, ErrorKind, Notice, Notifier};

use crate::api::PrincipalApi;
use crate::state::Session;
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Single authority on whether the user is usably authenticated.
///
/// Owns no state of its own: everything lives in the shared [`Session`].
pub struct SessionManager {
    session: Arc<Session>,
    api: Arc<dyn PrincipalApi>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
}

impl SessionManager {
    pub fn new(
        session: Arc<Session>,
        api: Arc<dyn PrincipalApi>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            session,
            api,
            notifier,
            clock,
        }
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    pub fn is_expired(&self, expiry: i64) -> bool {
        is_expired(expiry, self.clock.now_millis())
    }

    /// Bring the session up to date before an authorization decision.
    ///
    /// An expired primary token ends the session without any network call;
    /// there is no refresh exchange. Otherwise a present token without a
    /// cached principal triggers a principal fetch whose failures are handled
    /// (and reported) inside [`Self::fetch_principal`].
    pub async fn ensure_fresh(&self) {
        if !self.session.secondary_token().is_empty()
            && self.is_expired(self.session.secondary_token_expiry())
        {
            tracing::debug!("secondary token expired, dropping it");
            if let Err(e) = self.session.clear_secondary() {
                tracing::warn!(error = %e, "failed to drop expired secondary token");
            }
        }

        if self.is_expired(self.session.token_expiry()) {
            tracing::info!("token expired, logging out");
            self.logout();
            return;
        }

        if !self.session.token().is_empty() && !self.session.is_logged_in() {
            let _ = self.fetch_principal().await;
        }
    }

    /// Fetch the principal for the current token and cache it.
    ///
    /// On failure the previous cache is left as is. Only a 401 ends the
    /// session; connectivity errors are reported by the transport, anything
    /// else is reported here.
    pub async fn fetch_principal(&self) -> Result<Principal, ApiError> {
        let token = self.session.token();
        if token.is_empty() {
            return Err(ApiError::Unauthorized);
        }

        match self.api.fetch_principal(&token).await {
            Ok(wire) => {
                let principal = Principal::from(wire);
                if self.session.cache_principal(principal.clone(), &token) {
                    tracing::info!(
                        user = %principal.user.id,
                        roles = principal.roles.len(),
                        "principal loaded"
                    );
                } else {
                    tracing::debug!("token changed during principal fetch, result discarded");
                }
                Ok(principal)
            }
            Err(err) => {
                match err.kind() {
                    ErrorKind::SessionFatal => match self.session.clear_if_token(&token) {
                        Ok(true) => {
                            tracing::info!("principal fetch rejected, session ended");
                            self.notifier.notify(Notice::session_expired());
                        }
                        Ok(false) => {}
                        Err(e) => tracing::warn!(error = %e, "failed to clear rejected session"),
                    },
                    ErrorKind::Connectivity => {
                        tracing::warn!(error = %err, "principal fetch failed: server unreachable");
                    }
                    ErrorKind::Transient => {
                        tracing::warn!(error = %err, "principal fetch failed");
                        self.notifier
                            .notify(Notice::warning("Failed to load your account information"));
                    }
                }
                Err(err)
            }
        }
    }

    /// End the session locally. Idempotent, no network effect.
    pub fn logout(&self) {
        match self.session.clear() {
            Ok(true) => tracing::info!("logged out"),
            Ok(false) => {}
            Err(e) => tracing::warn!(error = %e, "logout could not be persisted"),
        }
    }

    /// Install a freshly issued primary token and load its principal.
    ///
    /// On success the intended-URL marker is consumed and returned so the
    /// caller can resume where the user was sent away from.
    pub async fn login(&self, response: &TokenResponse) -> Result<Option<String>, SessionError> {
        let grant = TokenGrant::from_response(response, self.clock.now());
        self.session.set_primary(&grant)?;
        self.fetch_principal().await?;
        Ok(self.session.take_intended_url()?)
    }

    /// Install a secondary (resource) token, used when no primary token exists.
    pub fn store_secondary(&self, response: &TokenResponse) -> Result<(), StoreError> {
        let grant = TokenGrant::from_response(response, self.clock.now());
        self.session.set_secondary(&grant)
    }

    pub fn principal(&self) -> Option<Principal> {
        self.session.principal()
    }

    pub fn is_logged_in(&self) -> bool {
        self.session.is_logged_in()
    }

    pub fn has_role(&self, role: &Role) -> bool {
        self.session.has_role(role)
    }
}
