//! HubSpot integration: OAuth authorization, credential handoff and item loading.
//!
//! Every call builds its components from the immutable [`Config`] and the shared
//! TTL store. No state is kept in process between requests.

use crate::error::{config_error, DomainErrorKind, Error, IntegrationErrorKind};
use crate::gateway::hubspot::{Contact, HubSpotCrmClient};
use crate::integration_item::IntegrationItem;
use integration_auth::credentials::CredentialVault;
use integration_auth::http::VendorClientBuilder;
use integration_auth::oauth::providers::hubspot::{self, ProviderConfig};
use integration_auth::oauth::{Flow, ProviderKind};
use integration_auth::store::TtlStore;
use log::*;
use secrecy::SecretString;
use service::config::Config;
use std::sync::Arc;

pub use integration_auth::oauth::token::TokenBundle;
pub use integration_auth::oauth::{CallbackParams, CLOSE_WINDOW_HTML};

/// Item type of every HubSpot contact.
pub const CONTACT_ITEM_TYPE: &str = "contact";
pub const UNKNOWN_CONTACT_ID: &str = "Unknown";
pub const UNNAMED_CONTACT: &str = "Unnamed Contact";

/// Start the OAuth flow for a user within an organization.
///
/// Returns the HubSpot authorization URL the user has to be sent to.
pub async fn authorize(
    store: Arc<dyn TtlStore>,
    config: &Config,
    user_id: &str,
    org_id: &str,
) -> Result<String, Error> {
    let flow = create_flow(store, config)?;
    let request = flow.authorize(user_id, org_id).await?;

    info!("Redirecting user {} of org {} to HubSpot OAuth", user_id, org_id);
    Ok(request.url)
}

/// Handle HubSpot's redirect back to us.
///
/// Returns the page that closes the popup window the flow ran in.
pub async fn oauth2callback(
    store: Arc<dyn TtlStore>,
    config: &Config,
    params: CallbackParams,
) -> Result<&'static str, Error> {
    let flow = create_flow(store, config)?;
    let authorized = flow.callback(params).await?;

    info!(
        "HubSpot authorization completed for user {} of org {}",
        authorized.user_id, authorized.org_id
    );
    Ok(CLOSE_WINDOW_HTML)
}

/// Hand out the credentials obtained by the callback. Works once per authorization.
pub async fn get_credentials(
    store: Arc<dyn TtlStore>,
    config: &Config,
    user_id: &str,
    org_id: &str,
) -> Result<TokenBundle, Error> {
    let vault = CredentialVault::with_ttl(store, ProviderKind::HubSpot, config.oauth_ttl());
    Ok(vault.retrieve(user_id, org_id).await?)
}

/// Parse credentials as sent back by a client.
pub fn parse_credentials(raw: &str) -> Result<TokenBundle, Error> {
    TokenBundle::from_json(raw).map_err(|e| Error {
        source: Some(Box::new(e)),
        error_kind: DomainErrorKind::Integration(IntegrationErrorKind::InvalidCredentials),
    })
}

/// Load the user's HubSpot contacts as integration items.
///
/// Fails with `MissingAccessToken` before any network call when the credentials
/// carry no access token.
pub async fn get_items(
    config: &Config,
    credentials: &TokenBundle,
) -> Result<Vec<IntegrationItem>, Error> {
    let access_token = credentials.access_token()?;

    let client = HubSpotCrmClient::new(
        vendor_http_client(config)?,
        config.hubspot_api_base_url(),
        access_token,
    );
    let contacts = client.list_contacts().await?;

    let items: Vec<IntegrationItem> = contacts.iter().map(contact_item).collect();
    info!("Processed {} contacts from HubSpot", items.len());
    Ok(items)
}

/// Map one contact, substituting placeholders for a missing id or first name.
fn contact_item(contact: &Contact) -> IntegrationItem {
    IntegrationItem::from_vendor_record(
        contact.id.as_deref().unwrap_or(UNKNOWN_CONTACT_ID),
        contact.first_name.as_deref().unwrap_or(UNNAMED_CONTACT),
        CONTACT_ITEM_TYPE,
        None,
        None,
    )
}

/// Create the HubSpot OAuth flow from config.
fn create_flow(
    store: Arc<dyn TtlStore>,
    config: &Config,
) -> Result<Flow<hubspot::Provider>, Error> {
    let client_id = config
        .hubspot_client_id()
        .ok_or_else(|| config_error("HubSpot client ID is not configured"))?;

    let client_secret = config
        .hubspot_client_secret()
        .ok_or_else(|| config_error("HubSpot client secret is not configured"))?;

    let provider_config = ProviderConfig::new(
        client_id,
        SecretString::new(client_secret),
        config.hubspot_redirect_uri().to_string(),
    )
    .with_scope(config.hubspot_scope().to_string())
    .with_endpoints(
        config.hubspot_authorization_url().to_string(),
        config.hubspot_token_url().to_string(),
    );

    let provider = hubspot::Provider::new(provider_config, vendor_http_client(config)?);
    Ok(Flow::with_ttl(provider, store, config.oauth_ttl()))
}

fn vendor_http_client(config: &Config) -> Result<reqwest::Client, Error> {
    Ok(VendorClientBuilder::new()
        .with_timeout(config.vendor_http_timeout())
        .build()?)
}
