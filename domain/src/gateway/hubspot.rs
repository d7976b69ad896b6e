//! HubSpot CRM API client.
//!
//! Reads CRM objects with an access token obtained through the OAuth flow.

use crate::error::{DomainErrorKind, Error, ExternalErrorKind};
use log::*;
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;

/// Contact properties requested from HubSpot.
pub const CONTACT_PROPERTIES: &str = "firstname,lastname,email,phone";

/// Longest prefix of a vendor response body written to the debug log.
const LOGGED_BODY_LIMIT: usize = 500;

/// A HubSpot contact as far as it could be read from the response.
///
/// Every field is optional so that one malformed record never fails a batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Contact {
    pub id: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl Contact {
    fn from_value(record: &Value) -> Self {
        let property = |name: &str| {
            record
                .get("properties")
                .and_then(|properties| properties.get(name))
                .and_then(Value::as_str)
                .map(str::to_string)
        };

        Self {
            // HubSpot sends ids as strings, but accept bare numbers as well
            id: match record.get("id") {
                Some(Value::String(id)) => Some(id.clone()),
                Some(Value::Number(id)) => Some(id.to_string()),
                _ => None,
            },
            first_name: property("firstname"),
            last_name: property("lastname"),
            email: property("email"),
            phone: property("phone"),
        }
    }
}

/// HubSpot CRM API client bound to one access token.
pub struct HubSpotCrmClient {
    client: reqwest::Client,
    base_url: String,
    access_token: SecretString,
}

impl HubSpotCrmClient {
    /// Create a new client.
    ///
    /// # Arguments
    ///
    /// * `client` - HTTP client, expected to carry the vendor timeout
    /// * `base_url` - CRM API base URL, e.g. `https://api.hubapi.com`
    /// * `access_token` - OAuth access token sent as a bearer token
    pub fn new(client: reqwest::Client, base_url: &str, access_token: SecretString) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            access_token,
        }
    }

    /// Fetch the first page of contacts, in the order HubSpot returns them.
    ///
    /// Fails with `VendorFetchFailed` on any status other than 200 and with
    /// `Network` when HubSpot cannot be reached or the body is not JSON.
    pub async fn list_contacts(&self) -> Result<Vec<Contact>, Error> {
        let url = format!("{}/crm/v3/objects/contacts", self.base_url);

        debug!("Fetching HubSpot contacts");

        let response = self
            .client
            .get(&url)
            .query(&[("properties", CONTACT_PROPERTIES)])
            .bearer_auth(self.access_token.expose_secret())
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .send()
            .await
            .map_err(|e| {
                warn!("Failed to connect to HubSpot: {:?}", e);
                Error {
                    source: Some(Box::new(e)),
                    error_kind: DomainErrorKind::External(ExternalErrorKind::Network),
                }
            })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| {
            warn!("Failed to read HubSpot response: {:?}", e);
            Error {
                source: Some(Box::new(e)),
                error_kind: DomainErrorKind::External(ExternalErrorKind::Network),
            }
        })?;
        debug!("HubSpot API response: {}", truncated(&text));

        if status != StatusCode::OK {
            warn!("HubSpot contacts API error ({}): {}", status, truncated(&text));
            let message = format!("Error fetching contacts ({}): {}", status.as_u16(), text);
            return Err(Error {
                source: Some(message.into()),
                error_kind: DomainErrorKind::External(ExternalErrorKind::VendorFetchFailed(
                    status.as_u16(),
                )),
            });
        }

        let data: Value = serde_json::from_str(&text).map_err(|e| {
            warn!("Failed to parse HubSpot contacts response: {:?}", e);
            Error {
                source: Some(Box::new(e)),
                error_kind: DomainErrorKind::External(ExternalErrorKind::Network),
            }
        })?;

        if let Some(after) = data.pointer("/paging/next/after") {
            debug!(
                "HubSpot has more contacts after cursor {}; only the first page is loaded",
                after
            );
        }

        let contacts = data
            .get("results")
            .and_then(Value::as_array)
            .map(|results| results.iter().map(Contact::from_value).collect())
            .unwrap_or_default();

        Ok(contacts)
    }
}

/// Prefix of a vendor body that is safe to put in a log line.
fn truncated(body: &str) -> String {
    body.chars().take(LOGGED_BODY_LIMIT).collect()
}
