//! HubSpot OAuth provider implementation.

use async_trait::async_trait;
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{oauth_error, Error, OAuthErrorKind};
use crate::oauth::token::TokenBundle;
use crate::oauth::{AuthorizationRequest, ProviderKind};

pub const DEFAULT_AUTHORIZATION_URL: &str = "https://app.hubspot.com/oauth/authorize";
pub const DEFAULT_TOKEN_URL: &str = "https://api.hubapi.com/oauth/v1/token";
pub const DEFAULT_SCOPE: &str = "crm.objects.contacts.read crm.objects.contacts.write \
                                 crm.schemas.contacts.read crm.schemas.contacts.write";

/// Longest prefix of a vendor response body written to the log.
const LOGGED_BODY_LIMIT: usize = 500;

/// Immutable HubSpot app configuration.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub client_id: String,
    pub client_secret: SecretString,
    pub redirect_uri: String,
    /// Space separated scopes.
    pub scope: String,
    pub authorization_url: String,
    pub token_url: String,
}

impl ProviderConfig {
    /// Configuration pointing at the production HubSpot endpoints with the default scopes.
    pub fn new(client_id: String, client_secret: SecretString, redirect_uri: String) -> Self {
        Self {
            client_id,
            client_secret,
            redirect_uri,
            scope: DEFAULT_SCOPE.to_string(),
            authorization_url: DEFAULT_AUTHORIZATION_URL.to_string(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
        }
    }

    pub fn with_scope(mut self, scope: String) -> Self {
        self.scope = scope;
        self
    }

    /// Override both OAuth endpoints, e.g. to point at a mock server.
    pub fn with_endpoints(mut self, authorization_url: String, token_url: String) -> Self {
        self.authorization_url = authorization_url;
        self.token_url = token_url;
        self
    }
}

/// Form body for the authorization code grant.
#[derive(Debug, Serialize)]
struct TokenExchangeRequest<'a> {
    grant_type: &'a str,
    client_id: &'a str,
    client_secret: &'a str,
    redirect_uri: &'a str,
    code: &'a str,
}

/// HubSpot OAuth provider.
///
/// Handles the HubSpot authorization code flow:
/// - Authorization URL generation
/// - Authorization code exchange
pub struct Provider {
    config: ProviderConfig,
    http_client: reqwest::Client,
}

impl Provider {
    /// Create a new HubSpot OAuth provider.
    ///
    /// # Arguments
    ///
    /// * `config` - HubSpot app configuration
    /// * `http_client` - Client used for the token endpoint, see [`crate::http::VendorClientBuilder`]
    pub fn new(config: ProviderConfig, http_client: reqwest::Client) -> Self {
        Self {
            config,
            http_client,
        }
    }
}

#[async_trait]
impl crate::oauth::Provider for Provider {
    fn provider(&self) -> ProviderKind {
        ProviderKind::HubSpot
    }

    fn authorization_url(&self, state: &str) -> AuthorizationRequest {
        let url = format!(
            "{}?\
            client_id={}&\
            response_type=code&\
            redirect_uri={}&\
            scope={}&\
            state={}",
            self.config.authorization_url,
            urlencoding::encode(&self.config.client_id),
            urlencoding::encode(&self.config.redirect_uri),
            urlencoding::encode(&self.config.scope),
            urlencoding::encode(state)
        );

        AuthorizationRequest {
            url,
            state: state.to_string(),
        }
    }

    async fn exchange_code(&self, code: &str) -> Result<TokenBundle, Error> {
        let request = TokenExchangeRequest {
            grant_type: "authorization_code",
            client_id: &self.config.client_id,
            client_secret: self.config.client_secret.expose_secret(),
            redirect_uri: &self.config.redirect_uri,
            code,
        };

        debug!("Exchanging HubSpot OAuth code for tokens");

        let response = self
            .http_client
            .post(&self.config.token_url)
            .form(&request)
            .send()
            .await
            .inspect_err(|e| warn!("Failed to reach HubSpot token endpoint: {:?}", e))?;

        let status = response.status();
        let body = response.text().await?;

        if status != StatusCode::OK {
            warn!("HubSpot token endpoint returned {}: {}", status, truncated(&body));
            return Err(oauth_error(
                OAuthErrorKind::TokenExchangeFailed,
                &format!("Failed to get access token: {}", body),
            ));
        }

        let tokens = TokenBundle::from_json(&body).map_err(|e| {
            warn!("Failed to parse HubSpot token response: {:?}", e);
            oauth_error(
                OAuthErrorKind::InvalidResponse,
                "Invalid response from HubSpot token endpoint",
            )
        })?;

        info!("Successfully exchanged HubSpot OAuth code for tokens");
        Ok(tokens)
    }
}

fn truncated(body: &str) -> String {
    body.chars().take(LOGGED_BODY_LIMIT).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::oauth::Provider as _;
    use mockito::{Matcher, Server};
    use secrecy::ExposeSecret;

    fn config(token_url: String) -> ProviderConfig {
        ProviderConfig::new(
            "client-123".to_string(),
            SecretString::new("secret-456".to_string()),
            "http://localhost:8000/integrations/hubspot/oauth2callback".to_string(),
        )
        .with_endpoints(DEFAULT_AUTHORIZATION_URL.to_string(), token_url)
    }

    #[test]
    fn test_authorization_url() {
        let provider = Provider::new(config(DEFAULT_TOKEN_URL.to_string()), reqwest::Client::new());
        let request = provider.authorization_url("eyJzdGF0ZSI6ImFiYyJ9");

        assert_eq!(request.state, "eyJzdGF0ZSI6ImFiYyJ9");
        assert_eq!(
            request.url,
            "https://app.hubspot.com/oauth/authorize?client_id=client-123&response_type=code\
             &redirect_uri=http%3A%2F%2Flocalhost%3A8000%2Fintegrations%2Fhubspot%2Foauth2callback\
             &scope=crm.objects.contacts.read%20crm.objects.contacts.write%20\
             crm.schemas.contacts.read%20crm.schemas.contacts.write\
             &state=eyJzdGF0ZSI6ImFiYyJ9"
        );
    }

    #[test]
    fn test_authorization_url_encodes_padding() {
        let provider = Provider::new(config(DEFAULT_TOKEN_URL.to_string()), reqwest::Client::new());
        let request = provider.authorization_url("abc=");
        assert!(request.url.ends_with("&state=abc%3D"));
    }

    #[tokio::test]
    async fn test_exchange_code_success() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/oauth/v1/token")
            .match_header("content-type", "application/x-www-form-urlencoded")
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("grant_type".into(), "authorization_code".into()),
                Matcher::UrlEncoded("client_id".into(), "client-123".into()),
                Matcher::UrlEncoded("client_secret".into(), "secret-456".into()),
                Matcher::UrlEncoded(
                    "redirect_uri".into(),
                    "http://localhost:8000/integrations/hubspot/oauth2callback".into(),
                ),
                Matcher::UrlEncoded("code".into(), "abc".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"access_token":"t","refresh_token":"r","expires_in":1800}"#)
            .create_async()
            .await;

        let provider = Provider::new(
            config(format!("{}/oauth/v1/token", server.url())),
            reqwest::Client::new(),
        );
        let tokens = provider.exchange_code("abc").await.unwrap();

        mock.assert_async().await;
        assert_eq!(tokens.access_token().unwrap().expose_secret(), "t");
        assert_eq!(tokens.get("refresh_token"), Some(&serde_json::json!("r")));
    }

    #[tokio::test]
    async fn test_exchange_code_vendor_error() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/oauth/v1/token")
            .with_status(400)
            .with_body(r#"{"message":"invalid code"}"#)
            .create_async()
            .await;

        let provider = Provider::new(
            config(format!("{}/oauth/v1/token", server.url())),
            reqwest::Client::new(),
        );
        let err = provider.exchange_code("bad").await.unwrap_err();

        assert_eq!(
            err.error_kind,
            ErrorKind::OAuth(OAuthErrorKind::TokenExchangeFailed)
        );
        assert!(err.detail().unwrap().contains(r#"{"message":"invalid code"}"#));
    }

    #[tokio::test]
    async fn test_exchange_code_keeps_full_payload_beyond_log_limit() {
        let mut server = Server::new_async().await;
        let payload = format!(r#"{{"message":"{}"}}"#, "x".repeat(LOGGED_BODY_LIMIT * 2));
        let _mock = server
            .mock("POST", "/oauth/v1/token")
            .with_status(400)
            .with_body(&payload)
            .create_async()
            .await;

        let provider = Provider::new(
            config(format!("{}/oauth/v1/token", server.url())),
            reqwest::Client::new(),
        );
        let err = provider.exchange_code("bad").await.unwrap_err();

        assert_eq!(
            err.detail(),
            Some(format!("Failed to get access token: {payload}"))
        );
        assert_eq!(truncated(&payload).len(), LOGGED_BODY_LIMIT);
    }

    #[tokio::test]
    async fn test_exchange_code_non_object_body() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/oauth/v1/token")
            .with_status(200)
            .with_body("<html>oops</html>")
            .create_async()
            .await;

        let provider = Provider::new(
            config(format!("{}/oauth/v1/token", server.url())),
            reqwest::Client::new(),
        );
        let err = provider.exchange_code("abc").await.unwrap_err();

        assert_eq!(err.error_kind, ErrorKind::OAuth(OAuthErrorKind::InvalidResponse));
    }

    #[tokio::test]
    async fn test_exchange_code_unreachable() {
        // Port 9 (discard) on localhost is not expected to accept connections
        let provider = Provider::new(
            config("http://127.0.0.1:9/oauth/v1/token".to_string()),
            reqwest::Client::new(),
        );
        let err = provider.exchange_code("abc").await.unwrap_err();

        assert!(matches!(err.error_kind, ErrorKind::Http(_)));
    }
}
