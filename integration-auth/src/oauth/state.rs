//! CSRF state management for OAuth flows.

use std::sync::Arc;

use base64::{
    engine::general_purpose::{URL_SAFE, URL_SAFE_NO_PAD},
    Engine,
};
use chrono::Duration;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::ProviderKind;
use crate::error::{oauth_error, Error, OAuthErrorKind};
use crate::store::TtlStore;

/// State data bound to one authorize call.
///
/// Travels base64url-encoded through the vendor redirect and is stored as
/// plain JSON on our side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthState {
    /// Random nonce.
    pub state: String,
    pub user_id: String,
    pub org_id: String,
}

impl AuthState {
    /// Create a state with a fresh random nonce.
    pub fn new(user_id: &str, org_id: &str) -> Self {
        Self {
            state: generate_nonce(),
            user_id: user_id.to_string(),
            org_id: org_id.to_string(),
        }
    }

    /// Encode as base64url JSON for embedding in a URL.
    pub fn encode(&self) -> Result<String, Error> {
        let json = serde_json::to_vec(self)?;
        Ok(URL_SAFE.encode(json))
    }

    /// Decode a state produced by [`AuthState::encode`]. Padding is optional.
    pub fn decode(encoded: &str) -> Result<Self, Error> {
        let bytes = URL_SAFE
            .decode(encoded)
            .or_else(|_| URL_SAFE_NO_PAD.decode(encoded))
            .map_err(|_| oauth_error(OAuthErrorKind::InvalidState, "State is not valid base64"))?;

        serde_json::from_slice(&bytes)
            .map_err(|_| oauth_error(OAuthErrorKind::InvalidState, "State is not valid JSON"))
    }
}

/// A freshly issued state.
#[derive(Debug, Clone)]
pub struct IssuedState {
    pub nonce: String,
    /// Value for the `state` query parameter.
    pub encoded: String,
}

/// Manager for OAuth state parameters with expiration.
///
/// Generates and validates CSRF state tokens bound to a `(user, organization)` pair.
/// Only one state is live per pair; issuing again replaces the previous one.
#[derive(Clone)]
pub struct StateManager {
    store: Arc<dyn TtlStore>,
    provider: ProviderKind,
    ttl: Duration,
}

impl StateManager {
    /// Create a new state manager with default TTL of 10 minutes.
    pub fn new(store: Arc<dyn TtlStore>, provider: ProviderKind) -> Self {
        Self::with_ttl(store, provider, Duration::minutes(10))
    }

    /// Create a new state manager with custom TTL.
    pub fn with_ttl(store: Arc<dyn TtlStore>, provider: ProviderKind, ttl: Duration) -> Self {
        Self {
            store,
            provider,
            ttl,
        }
    }

    /// Store key for a `(org, user)` pair, e.g. `hubspot_state:{org_id}:{user_id}`.
    pub fn key(&self, org_id: &str, user_id: &str) -> String {
        format!("{}_state:{}:{}", self.provider.as_str(), org_id, user_id)
    }

    /// Generate a new state and persist it.
    ///
    /// # Returns
    ///
    /// The nonce and the encoded state to embed in the authorization URL.
    pub async fn issue(&self, user_id: &str, org_id: &str) -> Result<IssuedState, Error> {
        let auth_state = AuthState::new(user_id, org_id);
        let encoded = auth_state.encode()?;
        let stored = serde_json::to_string(&auth_state)?;

        self.store
            .put(&self.key(org_id, user_id), &stored, self.ttl)
            .await?;
        debug!("Issued OAuth state for org {} user {}", org_id, user_id);

        Ok(IssuedState {
            nonce: auth_state.state,
            encoded,
        })
    }

    /// Check an encoded state against the stored one without consuming it.
    ///
    /// Fails with `InvalidState` if the state cannot be decoded, nothing is stored
    /// for its `(org, user)` pair, or the nonces differ.
    pub async fn verify(&self, encoded: &str) -> Result<AuthState, Error> {
        let received = AuthState::decode(encoded)?;
        let key = self.key(&received.org_id, &received.user_id);

        let stored = self.store.get(&key).await?.ok_or_else(|| {
            warn!("No OAuth state stored under {}", key);
            oauth_error(OAuthErrorKind::InvalidState, "State does not match.")
        })?;

        let stored: AuthState = serde_json::from_str(&stored)?;
        if stored.state != received.state {
            warn!("OAuth state nonce mismatch for {}", key);
            return Err(oauth_error(
                OAuthErrorKind::InvalidState,
                "State does not match.",
            ));
        }

        Ok(received)
    }

    /// Delete the stored state so it cannot be used again.
    ///
    /// Fails with `InvalidState` if the state was consumed or replaced since it
    /// was verified, so at most one callback completes per issued state. A newer
    /// state for the same pair is never touched.
    pub async fn consume(&self, auth_state: &AuthState) -> Result<(), Error> {
        let key = self.key(&auth_state.org_id, &auth_state.user_id);
        let expected = serde_json::to_string(auth_state)?;

        if !self.store.take_if(&key, &expected).await? {
            warn!("OAuth state under {} was already used or replaced", key);
            return Err(oauth_error(
                OAuthErrorKind::InvalidState,
                "State does not match.",
            ));
        }
        Ok(())
    }

    /// Validate and consume a state token.
    pub async fn validate(&self, encoded: &str) -> Result<AuthState, Error> {
        let auth_state = self.verify(encoded).await?;
        self.consume(&auth_state).await?;
        Ok(auth_state)
    }
}

/// Generate a cryptographically random URL-safe nonce from 32 random bytes.
fn generate_nonce() -> String {
    let random_bytes: [u8; 32] = rand::thread_rng().gen();
    URL_SAFE_NO_PAD.encode(random_bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::store::MemoryStore;

    fn manager() -> (Arc<MemoryStore>, StateManager) {
        let store = Arc::new(MemoryStore::new());
        let manager = StateManager::new(store.clone(), ProviderKind::HubSpot);
        (store, manager)
    }

    fn assert_invalid_state(err: Error) {
        assert_eq!(err.error_kind, ErrorKind::OAuth(OAuthErrorKind::InvalidState));
    }

    #[test]
    fn test_nonce_is_url_safe_and_long_enough() {
        let nonce = generate_nonce();
        assert_eq!(nonce.len(), 43); // 32 bytes base64url without padding
        assert!(nonce
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn test_encode_decode() {
        let auth_state = AuthState::new("u1", "o1");
        let decoded = AuthState::decode(&auth_state.encode().unwrap()).unwrap();
        assert_eq!(decoded, auth_state);
    }

    #[test]
    fn test_decode_accepts_unpadded() {
        let auth_state = AuthState::new("user", "org");
        let unpadded = auth_state.encode().unwrap().trim_end_matches('=').to_string();
        assert_eq!(AuthState::decode(&unpadded).unwrap(), auth_state);
    }

    #[test]
    fn test_decode_garbage() {
        assert_invalid_state(AuthState::decode("%%%not-base64%%%").unwrap_err());
        assert_invalid_state(AuthState::decode(&URL_SAFE.encode(b"not json")).unwrap_err());
    }

    #[tokio::test]
    async fn test_issue_stores_plain_state() {
        let (store, manager) = manager();
        let issued = manager.issue("u1", "o1").await.unwrap();

        let stored = store.get("hubspot_state:o1:u1").await.unwrap().unwrap();
        let stored: AuthState = serde_json::from_str(&stored).unwrap();
        assert_eq!(stored.state, issued.nonce);
        assert_eq!(stored.user_id, "u1");
        assert_eq!(stored.org_id, "o1");
    }

    #[tokio::test]
    async fn test_validate_state() {
        let (store, manager) = manager();
        let issued = manager.issue("u1", "o1").await.unwrap();

        let auth_state = manager.validate(&issued.encoded).await.unwrap();
        assert_eq!(auth_state.state, issued.nonce);
        assert_eq!(store.get("hubspot_state:o1:u1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_verify_does_not_consume() {
        let (_store, manager) = manager();
        let issued = manager.issue("u1", "o1").await.unwrap();

        manager.verify(&issued.encoded).await.unwrap();
        assert!(manager.verify(&issued.encoded).await.is_ok());
    }

    #[tokio::test]
    async fn test_state_consumed_after_validation() {
        let (_store, manager) = manager();
        let issued = manager.issue("u1", "o1").await.unwrap();

        manager.validate(&issued.encoded).await.unwrap();
        assert_invalid_state(manager.validate(&issued.encoded).await.unwrap_err());
    }

    #[tokio::test]
    async fn test_tampered_nonce() {
        let (_store, manager) = manager();
        let issued = manager.issue("u1", "o1").await.unwrap();

        let mut tampered = AuthState::decode(&issued.encoded).unwrap();
        let mut bytes = tampered.state.into_bytes();
        bytes[0] ^= 0x01;
        tampered.state = String::from_utf8(bytes).unwrap();

        let result = manager.validate(&tampered.encode().unwrap()).await;
        assert_invalid_state(result.unwrap_err());
    }

    #[tokio::test]
    async fn test_state_for_other_user_rejected() {
        let (_store, manager) = manager();
        let issued = manager.issue("u1", "o1").await.unwrap();

        let mut forged = AuthState::decode(&issued.encoded).unwrap();
        forged.user_id = "u2".to_string();

        assert_invalid_state(manager.verify(&forged.encode().unwrap()).await.unwrap_err());
    }

    #[tokio::test]
    async fn test_reissue_invalidates_previous_state() {
        let (_store, manager) = manager();
        let first = manager.issue("u1", "o1").await.unwrap();
        let second = manager.issue("u1", "o1").await.unwrap();

        assert_invalid_state(manager.verify(&first.encoded).await.unwrap_err());
        assert!(manager.verify(&second.encoded).await.is_ok());
    }

    #[tokio::test]
    async fn test_expired_state() {
        let store = Arc::new(MemoryStore::new());
        let manager = StateManager::with_ttl(store, ProviderKind::HubSpot, Duration::seconds(-1));
        let issued = manager.issue("u1", "o1").await.unwrap();

        assert_invalid_state(manager.validate(&issued.encoded).await.unwrap_err());
    }

    #[tokio::test]
    async fn test_consume_after_reissue_keeps_newer_state() {
        let (_store, manager) = manager();
        let first = manager.issue("u1", "o1").await.unwrap();
        let verified = manager.verify(&first.encoded).await.unwrap();
        let second = manager.issue("u1", "o1").await.unwrap();

        assert_invalid_state(manager.consume(&verified).await.unwrap_err());
        assert!(manager.validate(&second.encoded).await.is_ok());
    }

    /// Issues a newer state for the same pair right before every `take_if`,
    /// as a concurrent authorize call would.
    struct InterleavingStore {
        inner: Arc<MemoryStore>,
        newer: std::sync::Mutex<Option<(String, String)>>,
    }

    #[async_trait::async_trait]
    impl TtlStore for InterleavingStore {
        async fn put(&self, key: &str, value: &str, ttl: Duration) -> Result<(), Error> {
            self.inner.put(key, value, ttl).await
        }

        async fn get(&self, key: &str) -> Result<Option<String>, Error> {
            self.inner.get(key).await
        }

        async fn delete(&self, key: &str) -> Result<(), Error> {
            self.inner.delete(key).await
        }

        async fn take(&self, key: &str) -> Result<Option<String>, Error> {
            self.inner.take(key).await
        }

        async fn take_if(&self, key: &str, expected: &str) -> Result<bool, Error> {
            let newer = self.newer.lock().unwrap().take();
            if let Some((newer_key, newer_value)) = newer {
                self.inner
                    .put(&newer_key, &newer_value, Duration::minutes(10))
                    .await?;
            }
            self.inner.take_if(key, expected).await
        }
    }

    #[tokio::test]
    async fn test_stale_consume_never_restores_replaced_state() {
        let inner = Arc::new(MemoryStore::new());
        let newest = AuthState::new("u1", "o1");
        let store = Arc::new(InterleavingStore {
            inner: inner.clone(),
            newer: std::sync::Mutex::new(Some((
                "hubspot_state:o1:u1".to_string(),
                serde_json::to_string(&newest).unwrap(),
            ))),
        });
        let manager = StateManager::new(store, ProviderKind::HubSpot);

        let first = manager.issue("u1", "o1").await.unwrap();
        let verified = manager.verify(&first.encoded).await.unwrap();
        let second = manager.issue("u1", "o1").await.unwrap();

        assert_invalid_state(manager.consume(&verified).await.unwrap_err());

        // Only the state issued last is live, with nothing written back
        assert!(manager.verify(&newest.encode().unwrap()).await.is_ok());
        assert_invalid_state(manager.verify(&second.encoded).await.unwrap_err());
        assert_invalid_state(manager.verify(&first.encoded).await.unwrap_err());
        assert_eq!(inner.len(), 1);
    }
}
