use config::Config;
use log::{debug, info};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::{self, Duration};

pub mod config;
pub mod logging;

pub use integration_auth::store::{MemoryStore, TtlStore};

/// Creates the process-wide TTL store and starts a background task that
/// periodically drops expired entries from it.
pub fn init_store(cleanup_interval: Duration) -> (Arc<MemoryStore>, JoinHandle<()>) {
    info!(
        "Using in-memory TTL store (cleanup every {}s)",
        cleanup_interval.as_secs()
    );

    let store = Arc::new(MemoryStore::new());
    let janitor_store = Arc::clone(&store);
    let handle = tokio::spawn(async move {
        let mut interval = time::interval(cleanup_interval);
        loop {
            interval.tick().await;
            janitor_store.cleanup_expired();
            debug!("TTL store holds {} entries after cleanup", janitor_store.len());
        }
    });

    (store, handle)
}

// Service-level state containing only infrastructure concerns
// Needs to implement Clone to be able to be passed into Router as State
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn TtlStore>,
    pub config: Config,
}

impl AppState {
    pub fn new(app_config: Config, store: Arc<dyn TtlStore>) -> Self {
        Self {
            store,
            config: app_config,
        }
    }

    pub fn store(&self) -> Arc<dyn TtlStore> {
        Arc::clone(&self.store)
    }
}
