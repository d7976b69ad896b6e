use crate::{controller::health_check_controller, params, AppState};
use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use log::*;
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::controller::hubspot_controller;

use utoipa::OpenApi;
use utoipa_rapidoc::RapiDoc;

// This is the global definition of our OpenAPI spec. To be a part
// of the rendered spec, a path and schema must be listed here.
#[derive(OpenApi)]
#[openapi(
        info(
            title = "Integration Hub API"
        ),
        paths(
            health_check_controller::health_check,
            hubspot_controller::authorize,
            hubspot_controller::oauth2callback,
            hubspot_controller::credentials,
            hubspot_controller::get_hubspot_items,
        ),
        components(
            schemas(
                domain::IntegrationItem,
                params::hubspot::UserOrgParams,
                params::hubspot::ItemsParams,
            )
        ),
        tags(
            (name = "integration_hub", description = "Third-party integration authorization and item loading")
        )
    )]
struct ApiDoc;

pub fn define_routes(app_state: AppState) -> Router {
    let cors = cors_layer(&app_state.config.allowed_origins);

    Router::new()
        .merge(health_routes())
        .merge(hubspot_routes(app_state))
        .merge(RapiDoc::with_openapi("/api-docs/openapi.json", ApiDoc::openapi()).path("/rapidoc"))
        .layer(cors)
}

fn health_routes() -> Router {
    Router::new().route("/health", get(health_check_controller::health_check))
}

fn hubspot_routes(app_state: AppState) -> Router {
    Router::new()
        .route(
            "/integrations/hubspot/authorize",
            post(hubspot_controller::authorize),
        )
        // Called by HubSpot's redirect of the user's browser
        .route(
            "/integrations/hubspot/oauth2callback",
            get(hubspot_controller::oauth2callback),
        )
        .route(
            "/integrations/hubspot/credentials",
            post(hubspot_controller::credentials),
        )
        .route(
            "/integrations/hubspot/get_hubspot_items",
            post(hubspot_controller::get_hubspot_items),
        )
        .with_state(app_state)
}

/// Allow the configured frontend origins to call the API with credentials.
fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin.trim()) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid allowed origin: {origin}");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
        .allow_credentials(true)
}
