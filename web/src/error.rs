use std::error::Error as StdError;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use domain::error::{
    DomainErrorKind, Error as DomainError, ExternalErrorKind, IntegrationErrorKind,
};

extern crate log;
use log::*;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
    Domain(DomainError),
    Web(WebErrorKind),
}

/// Failures detected by the web layer itself, before any domain call.
#[derive(Debug, PartialEq)]
pub enum WebErrorKind {
    /// A required request field is missing or empty.
    Input(&'static str),
}

impl StdError for Error {}

impl std::fmt::Display for Error {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> core::result::Result<(), std::fmt::Error> {
        write!(fmt, "{self:?}")
    }
}

fn detail_response(status: StatusCode, detail: String) -> Response {
    (status, Json(json!({ "detail": detail }))).into_response()
}

// Every integration failure reaches the client as 400 with the vendor message
// as `detail`. Only faults on our side are reported as 500.
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::Web(WebErrorKind::Input(field)) => {
                detail_response(StatusCode::BAD_REQUEST, format!("Missing field: {field}"))
            }
            Error::Domain(domain_error) => {
                let detail = domain_error.detail();
                match domain_error.error_kind {
                    DomainErrorKind::Internal(internal_error_kind) => {
                        error!(
                            "Internal error: {:?}, detail: {:?}",
                            internal_error_kind, detail
                        );
                        detail_response(
                            StatusCode::INTERNAL_SERVER_ERROR,
                            "Internal Server Error".to_string(),
                        )
                    }
                    DomainErrorKind::Integration(integration_error_kind) => {
                        let fallback = match integration_error_kind {
                            IntegrationErrorKind::StateMismatch => "State does not match.",
                            IntegrationErrorKind::CredentialsNotFound => "Credentials not found.",
                            IntegrationErrorKind::MissingAccessToken => {
                                "Access token not found in credentials."
                            }
                            IntegrationErrorKind::InvalidCredentials => "Invalid credentials.",
                        };
                        warn!("Integration error: {:?}", integration_error_kind);
                        detail_response(
                            StatusCode::BAD_REQUEST,
                            detail.unwrap_or_else(|| fallback.to_string()),
                        )
                    }
                    DomainErrorKind::External(ExternalErrorKind::Other(message)) => {
                        error!("External error: {}, detail: {:?}", message, detail);
                        detail_response(
                            StatusCode::INTERNAL_SERVER_ERROR,
                            "Internal Server Error".to_string(),
                        )
                    }
                    DomainErrorKind::External(external_error_kind) => {
                        let fallback = match external_error_kind {
                            ExternalErrorKind::VendorAuthDenied => "Authorization denied.",
                            ExternalErrorKind::TokenExchangeFailed => "Failed to get access token.",
                            ExternalErrorKind::VendorFetchFailed(_) => "Error fetching items.",
                            _ => "Failed to connect to the vendor.",
                        };
                        warn!("External error: {:?}, detail: {:?}", external_error_kind, detail);
                        detail_response(
                            StatusCode::BAD_REQUEST,
                            detail.unwrap_or_else(|| fallback.to_string()),
                        )
                    }
                }
            }
        }
    }
}

impl<E> From<E> for Error
where
    E: Into<DomainError>,
{
    fn from(err: E) -> Self {
        Self::Domain(err.into())
    }
}
