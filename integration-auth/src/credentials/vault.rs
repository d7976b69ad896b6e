//! Single-read credential vault on top of a TTL store.

use std::sync::Arc;

use chrono::Duration;
use tracing::{debug, warn};

use crate::error::{credential_error, CredentialErrorKind, Error};
use crate::oauth::{token::TokenBundle, ProviderKind};
use crate::store::TtlStore;

/// Holds a freshly obtained token bundle until it is read once.
///
/// A bundle is destroyed by the first successful [`CredentialVault::retrieve`]
/// or by TTL expiry, whichever comes first. A bundle that expires unread is gone
/// for good and the user has to authorize again.
#[derive(Clone)]
pub struct CredentialVault {
    store: Arc<dyn TtlStore>,
    provider: ProviderKind,
    ttl: Duration,
}

impl CredentialVault {
    /// Create a vault with the default TTL of 10 minutes.
    pub fn new(store: Arc<dyn TtlStore>, provider: ProviderKind) -> Self {
        Self::with_ttl(store, provider, Duration::minutes(10))
    }

    pub fn with_ttl(store: Arc<dyn TtlStore>, provider: ProviderKind, ttl: Duration) -> Self {
        Self {
            store,
            provider,
            ttl,
        }
    }

    /// Store key for a `(org, user)` pair, e.g. `hubspot_credentials:{org_id}:{user_id}`.
    pub fn key(&self, org_id: &str, user_id: &str) -> String {
        format!("{}_credentials:{}:{}", self.provider.as_str(), org_id, user_id)
    }

    /// Store a bundle, replacing any unread one for the same pair.
    pub async fn store(
        &self,
        user_id: &str,
        org_id: &str,
        bundle: &TokenBundle,
    ) -> Result<(), Error> {
        self.store
            .put(&self.key(org_id, user_id), &bundle.to_json()?, self.ttl)
            .await?;
        debug!("Stored credentials for org {} user {}", org_id, user_id);
        Ok(())
    }

    /// Read and delete the bundle for a `(user, org)` pair.
    ///
    /// Fails with `NotFound` if nothing is stored, the bundle expired, or it was
    /// already retrieved.
    pub async fn retrieve(&self, user_id: &str, org_id: &str) -> Result<TokenBundle, Error> {
        let key = self.key(org_id, user_id);

        let raw = self.store.take(&key).await?.ok_or_else(|| {
            warn!("No credentials stored under {}", key);
            credential_error(
                CredentialErrorKind::NotFound,
                &format!("{} credentials not found.", self.provider.display_name()),
            )
        })?;

        let bundle = TokenBundle::from_json(&raw)?;
        debug!("Handed out credentials for org {} user {}", org_id, user_id);

        Ok(bundle)
    }
}
