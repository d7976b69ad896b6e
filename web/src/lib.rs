//! HTTP surface of the integration hub.

use log::*;
use std::net::SocketAddr;
use tokio::net::TcpListener;

pub use self::error::{Error, Result, WebErrorKind};
pub use service::AppState;

mod controller;
mod error;
pub(crate) mod params;
mod router;

pub use router::define_routes;

/// Bind to the configured interface and port and serve until the process exits.
pub async fn init_server(app_state: AppState) -> std::io::Result<()> {
    let interface = app_state
        .config
        .interface
        .clone()
        .unwrap_or_else(|| "127.0.0.1".to_string());
    let server_url = format!("{}:{}", interface, app_state.config.port);

    let listener = TcpListener::bind(&server_url).await?;
    info!("Server starting... listening for connections on http://{server_url}");

    let router = router::define_routes(app_state);
    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
}
