//! Controller for the HubSpot integration.
//!
//! The browser drives the OAuth popup: `authorize` hands out the URL to open,
//! HubSpot redirects to `oauth2callback`, and the opener then picks up the
//! credentials once and uses them to load items.

use crate::params::hubspot::{ItemsParams, UserOrgParams};
use crate::{AppState, Error};

use axum::extract::{Query, State};
use axum::response::{Html, IntoResponse};
use axum::{Form, Json};

use domain::hubspot::{self, CallbackParams};
use log::*;

/// POST start the HubSpot OAuth flow
///
/// Returns the HubSpot authorization URL as a JSON string.
#[utoipa::path(
    post,
    path = "/integrations/hubspot/authorize",
    request_body(content = UserOrgParams, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Authorization URL to open in a popup", body = String),
        (status = 400, description = "Missing user_id or org_id"),
        (status = 500, description = "HubSpot app is not configured"),
    )
)]
pub async fn authorize(
    State(app_state): State<AppState>,
    Form(params): Form<UserOrgParams>,
) -> Result<impl IntoResponse, Error> {
    params.validate()?;
    debug!(
        "POST HubSpot authorize for user {} of org {}",
        params.user_id, params.org_id
    );

    let url = hubspot::authorize(
        app_state.store(),
        &app_state.config,
        &params.user_id,
        &params.org_id,
    )
    .await?;

    Ok(Json(url))
}

/// GET the HubSpot OAuth redirect
///
/// Exchanges the code for tokens and closes the popup window.
/// Note: called by HubSpot's redirect, so no headers can be required.
#[utoipa::path(
    get,
    path = "/integrations/hubspot/oauth2callback",
    params(
        ("code" = Option<String>, Query, description = "Authorization code from HubSpot"),
        ("state" = Option<String>, Query, description = "State issued by the authorize endpoint"),
        ("error" = Option<String>, Query, description = "Set when the user denied access"),
        ("error_description" = Option<String>, Query, description = "Reason for the denial"),
    ),
    responses(
        (status = 200, description = "Page closing the popup window", body = String, content_type = "text/html"),
        (status = 400, description = "Denied, state mismatch or token exchange failed"),
    )
)]
pub async fn oauth2callback(
    State(app_state): State<AppState>,
    Query(params): Query<CallbackParams>,
) -> Result<impl IntoResponse, Error> {
    debug!("GET HubSpot OAuth callback");

    let page = hubspot::oauth2callback(app_state.store(), &app_state.config, params).await?;

    Ok(Html(page))
}

/// POST read back the credentials of a finished authorization
///
/// The credentials can be read once; a second call fails.
#[utoipa::path(
    post,
    path = "/integrations/hubspot/credentials",
    request_body(content = UserOrgParams, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "HubSpot token response", body = serde_json::Value),
        (status = 400, description = "Credentials not found"),
    )
)]
pub async fn credentials(
    State(app_state): State<AppState>,
    Form(params): Form<UserOrgParams>,
) -> Result<impl IntoResponse, Error> {
    params.validate()?;
    debug!(
        "POST HubSpot credentials for user {} of org {}",
        params.user_id, params.org_id
    );

    let bundle = hubspot::get_credentials(
        app_state.store(),
        &app_state.config,
        &params.user_id,
        &params.org_id,
    )
    .await?;

    Ok(Json(bundle))
}

/// POST load HubSpot contacts as integration items
#[utoipa::path(
    post,
    path = "/integrations/hubspot/get_hubspot_items",
    request_body(content = ItemsParams, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Contacts in the order HubSpot returned them", body = [domain::IntegrationItem]),
        (status = 400, description = "Missing access token or HubSpot request failed"),
    )
)]
pub async fn get_hubspot_items(
    State(app_state): State<AppState>,
    Form(params): Form<ItemsParams>,
) -> Result<impl IntoResponse, Error> {
    debug!("POST HubSpot items");

    let credentials = hubspot::parse_credentials(&params.credentials)?;
    let items = hubspot::get_items(&app_state.config, &credentials).await?;

    Ok(Json(items))
}
