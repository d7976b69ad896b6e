//! OAuth token bundle as returned by a vendor token endpoint.

use std::fmt;

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{credential_error, CredentialErrorKind, Error};

/// The JSON object returned by the token endpoint, kept verbatim.
///
/// Only `access_token` is interpreted; every other vendor-defined field
/// (`refresh_token`, `expires_in`, `token_type`, ...) is carried through untouched.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenBundle(Map<String, Value>);

impl TokenBundle {
    /// Parse a bundle from its JSON text. The text must be a JSON object.
    pub fn from_json(raw: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Serialize the bundle back to JSON text.
    pub fn to_json(&self) -> Result<String, Error> {
        Ok(serde_json::to_string(&self.0)?)
    }

    /// The bearer access token.
    ///
    /// Fails with `MissingAccessToken` when the field is absent, empty or not a string.
    pub fn access_token(&self) -> Result<SecretString, Error> {
        match self.0.get("access_token") {
            Some(Value::String(token)) if !token.is_empty() => {
                Ok(SecretString::new(token.clone()))
            }
            _ => Err(credential_error(
                CredentialErrorKind::MissingAccessToken,
                "Credential does not contain an access token",
            )),
        }
    }

    /// Look up any vendor-defined field.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }
}

// Token values must never end up in logs
impl fmt::Debug for TokenBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenBundle")
            .field("fields", &self.0.keys().collect::<Vec<_>>())
            .finish()
    }
}
