//! Authorization code flow: authorize, callback and credential handoff.

use std::sync::Arc;

use chrono::Duration;
use serde::Deserialize;
use tracing::{info, warn};

use super::{AuthorizationRequest, Provider, StateManager};
use crate::credentials::CredentialVault;
use crate::error::{oauth_error, Error, OAuthErrorKind};
use crate::oauth::token::TokenBundle;
use crate::store::TtlStore;

/// Payload served to the browser popup once the callback succeeds.
pub const CLOSE_WINDOW_HTML: &str = "<script>window.close()</script>";

/// Query parameters of the vendor redirect.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

/// Terminal success state of a callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Authorized {
    pub user_id: String,
    pub org_id: String,
}

/// Drives one provider's authorization code flow.
///
/// Holds no per-flow state of its own: the state nonce and the resulting token
/// bundle live in the TTL store, keyed by `(org_id, user_id)`.
pub struct Flow<P: Provider> {
    provider: P,
    states: StateManager,
    vault: CredentialVault,
}

impl<P: Provider> Flow<P> {
    /// Create a flow with the default 10 minute TTL for state and credentials.
    pub fn new(provider: P, store: Arc<dyn TtlStore>) -> Self {
        Self::with_ttl(provider, store, Duration::minutes(10))
    }

    pub fn with_ttl(provider: P, store: Arc<dyn TtlStore>, ttl: Duration) -> Self {
        let kind = provider.provider();
        Self {
            states: StateManager::with_ttl(store.clone(), kind, ttl),
            vault: CredentialVault::with_ttl(store, kind, ttl),
            provider,
        }
    }

    /// Issue a state for `(user_id, org_id)` and build the authorization URL.
    ///
    /// Any earlier pending state for the same pair is replaced.
    pub async fn authorize(
        &self,
        user_id: &str,
        org_id: &str,
    ) -> Result<AuthorizationRequest, Error> {
        let issued = self.states.issue(user_id, org_id).await?;
        info!(
            "Starting {} authorization for org {} user {}",
            self.provider.provider().as_str(),
            org_id,
            user_id
        );
        Ok(self.provider.authorization_url(&issued.encoded))
    }

    /// Handle the vendor redirect.
    ///
    /// On success the state is consumed and the token bundle is left in the
    /// credential vault for a single [`Flow::credentials`] call. On failure
    /// nothing is written; a pending state is left to expire.
    pub async fn callback(&self, params: CallbackParams) -> Result<Authorized, Error> {
        if let Some(error) = params.error {
            let description = params.error_description.unwrap_or(error);
            warn!("Authorization denied by vendor: {}", description);
            return Err(oauth_error(OAuthErrorKind::AuthorizationDenied, &description));
        }

        let encoded_state = params
            .state
            .ok_or_else(|| oauth_error(OAuthErrorKind::InvalidState, "Missing state parameter"))?;
        let auth_state = self.states.verify(&encoded_state).await?;

        let code = params.code.ok_or_else(|| {
            oauth_error(
                OAuthErrorKind::AuthorizationDenied,
                "Missing authorization code",
            )
        })?;

        let tokens = self.provider.exchange_code(&code).await.inspect_err(|e| {
            warn!(
                "Failed to exchange OAuth code for org {} user {}: {:?}",
                auth_state.org_id, auth_state.user_id, e
            )
        })?;

        self.states.consume(&auth_state).await?;
        self.vault
            .store(&auth_state.user_id, &auth_state.org_id, &tokens)
            .await?;

        info!(
            "Stored {} credentials for org {} user {}",
            self.provider.provider().as_str(),
            auth_state.org_id,
            auth_state.user_id
        );

        Ok(Authorized {
            user_id: auth_state.user_id,
            org_id: auth_state.org_id,
        })
    }

    /// Hand out the token bundle obtained by the callback. Single use.
    pub async fn credentials(&self, user_id: &str, org_id: &str) -> Result<TokenBundle, Error> {
        self.vault.retrieve(user_id, org_id).await
    }
}
