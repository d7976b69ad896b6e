//! Error types for the `domain` layer.
use integration_auth::error::{
    CredentialErrorKind, Error as AuthError, ErrorKind as AuthErrorKind, HttpErrorKind,
    OAuthErrorKind,
};
use std::error::Error as StdError;
use std::fmt;

/// Top-level domain error type.
/// Errors in the Domain layer are modeled as a tree structure
/// with `domain::error::Error` as the root type holding a tree of `error_kind`
/// enums that represent the kinds of errors that can occur in the domain layer or
/// in lower layers. The `source` field holds the original error, or the message
/// and vendor payload that describe it. The intent is to translate errors between
/// layers while maintaining layer boundaries. Ex. `domain` is dependent on
/// `integration-auth`, and `web` is dependent on `domain`, but `web` should not be
/// dependent, directly, on `integration-auth`. Ultimately the various `error_kind`s
/// are used by `web` to return appropriate HTTP status codes and messages to the client.
#[derive(Debug)]
pub struct Error {
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub error_kind: DomainErrorKind,
}

/// Enum representing the major categories of errors that can occur in the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum DomainErrorKind {
    Internal(InternalErrorKind),
    Integration(IntegrationErrorKind),
    External(ExternalErrorKind),
}

/// Enum representing the various kinds of internal errors that can occur in the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum InternalErrorKind {
    Config,
    Other(String),
}

/// Errors caused by the caller's side of an integration flow.
#[derive(Debug, PartialEq)]
pub enum IntegrationErrorKind {
    /// The callback state is missing, expired, already used or forged.
    StateMismatch,
    /// No unread credentials exist for the `(user, org)` pair.
    CredentialsNotFound,
    /// The supplied credential has no access token.
    MissingAccessToken,
    /// The supplied credential is not a JSON object.
    InvalidCredentials,
}

/// Enum representing the various kinds of external errors that can occur in the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum ExternalErrorKind {
    /// The vendor redirected back with an error instead of a code.
    VendorAuthDenied,
    /// The vendor token endpoint rejected the code exchange.
    TokenExchangeFailed,
    /// The vendor resource API answered with the given non-200 status.
    VendorFetchFailed(u16),
    /// The vendor could not be reached or returned an unreadable response.
    Network,
    Other(String),
}

impl Error {
    /// The message or vendor payload describing this error, if any.
    ///
    /// Looks through a translated `integration-auth` error to the message it carries.
    pub fn detail(&self) -> Option<String> {
        let source = self.source.as_ref()?;
        match (**source).downcast_ref::<AuthError>() {
            Some(auth_error) => auth_error.detail(),
            None => Some(source.to_string()),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Domain Error: {self:?}")
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        // Errors that result from issues building the reqwest::Client instance. This
        // type of error will occur prior to any network calls being made.
        if err.is_builder() {
            Error {
                source: Some(Box::new(err)),
                error_kind: DomainErrorKind::Internal(InternalErrorKind::Other(
                    "Failed to build reqwest client".to_string(),
                )),
            }
        // Errors that result from issues with the network call itself.
        } else {
            Error {
                source: Some(Box::new(err)),
                error_kind: DomainErrorKind::External(ExternalErrorKind::Network),
            }
        }
    }
}

// This is where we translate errors from the `integration-auth` layer to the `domain` layer.
// The lower error is kept as the source so that `web` can surface the message it carries.
impl From<AuthError> for Error {
    fn from(err: AuthError) -> Self {
        let error_kind = match &err.error_kind {
            AuthErrorKind::OAuth(OAuthErrorKind::AuthorizationDenied) => {
                DomainErrorKind::External(ExternalErrorKind::VendorAuthDenied)
            }
            AuthErrorKind::OAuth(OAuthErrorKind::InvalidState) => {
                DomainErrorKind::Integration(IntegrationErrorKind::StateMismatch)
            }
            AuthErrorKind::OAuth(OAuthErrorKind::TokenExchangeFailed)
            | AuthErrorKind::OAuth(OAuthErrorKind::InvalidResponse) => {
                DomainErrorKind::External(ExternalErrorKind::TokenExchangeFailed)
            }
            AuthErrorKind::Credential(CredentialErrorKind::NotFound) => {
                DomainErrorKind::Integration(IntegrationErrorKind::CredentialsNotFound)
            }
            AuthErrorKind::Credential(CredentialErrorKind::MissingAccessToken) => {
                DomainErrorKind::Integration(IntegrationErrorKind::MissingAccessToken)
            }
            AuthErrorKind::Http(HttpErrorKind::BuilderFailed) => DomainErrorKind::Internal(
                InternalErrorKind::Other("Failed to build reqwest client".to_string()),
            ),
            AuthErrorKind::Http(_) => DomainErrorKind::External(ExternalErrorKind::Network),
            AuthErrorKind::Store(_) => {
                DomainErrorKind::Internal(InternalErrorKind::Other(err.to_string()))
            }
        };
        Error {
            source: Some(Box::new(err)),
            error_kind,
        }
    }
}

/// Helper function to create configuration errors.
pub fn config_error(message: &str) -> Error {
    Error {
        source: Some(message.to_string().into()),
        error_kind: DomainErrorKind::Internal(InternalErrorKind::Config),
    }
}
