//! OAuth provider trait and types.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::token::TokenBundle;
use crate::error::Error;

/// Known OAuth providers for CRM integrations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    HubSpot,
}

impl ProviderKind {
    /// Get the provider identifier string.
    ///
    /// Used as the prefix of every TTL store key the provider owns.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::HubSpot => "hubspot",
        }
    }

    /// Vendor name as shown to users.
    pub fn display_name(&self) -> &'static str {
        match self {
            ProviderKind::HubSpot => "HubSpot",
        }
    }
}

/// Authorization request with URL and state management data.
#[derive(Debug, Clone)]
pub struct AuthorizationRequest {
    /// Authorization URL to redirect the user to.
    pub url: String,
    /// Encoded CSRF state parameter embedded in the URL.
    pub state: String,
}

/// Trait for OAuth 2.0 authorization code providers.
///
/// Implementations handle the vendor-specific parts of the flow:
/// - Authorization URL generation
/// - Authorization code exchange for a token bundle
#[async_trait]
pub trait Provider: Send + Sync {
    /// Get the provider kind.
    fn provider(&self) -> ProviderKind;

    /// Generate the authorization URL for an already encoded state.
    ///
    /// # Arguments
    ///
    /// * `state` - Encoded CSRF state parameter
    fn authorization_url(&self, state: &str) -> AuthorizationRequest;

    /// Exchange an authorization code for the vendor's token bundle.
    ///
    /// The code is single use, so implementations must not retry.
    ///
    /// # Arguments
    ///
    /// * `code` - Authorization code from OAuth callback
    async fn exchange_code(&self, code: &str) -> Result<TokenBundle, Error>;
}
