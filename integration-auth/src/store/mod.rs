//! TTL-capable key/value storage for short-lived OAuth data.

mod memory;

use async_trait::async_trait;
use chrono::Duration;

use crate::error::Error;

pub use memory::MemoryStore;

/// Trait for storing short-lived string values under a key.
///
/// Every operation on a single key must be atomic. The OAuth state and the
/// ephemeral credential vault rely on this and hold no locks of their own.
///
/// Implementations should:
/// - Expire values once their TTL has elapsed
/// - Treat an expired value exactly like a missing one
/// - Handle concurrent access safely
#[async_trait]
pub trait TtlStore: Send + Sync {
    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Arguments
    ///
    /// * `key` - Storage key
    /// * `value` - Value to store
    /// * `ttl` - How long the value stays readable
    async fn put(&self, key: &str, value: &str, ttl: Duration) -> Result<(), Error>;

    /// Retrieve the value stored under `key`.
    ///
    /// # Returns
    ///
    /// `Some(value)` if present and not expired, `None` otherwise.
    async fn get(&self, key: &str) -> Result<Option<String>, Error>;

    /// Delete the value stored under `key`. Deleting a missing key is not an error.
    async fn delete(&self, key: &str) -> Result<(), Error>;

    /// Atomically read and delete the value stored under `key`.
    ///
    /// Of several concurrent callers at most one receives `Some(value)`.
    async fn take(&self, key: &str) -> Result<Option<String>, Error>;

    /// Atomically delete the value stored under `key` if it equals `expected`.
    ///
    /// Returns `true` if the value matched and was deleted. A different or
    /// expired value is left untouched.
    async fn take_if(&self, key: &str, expected: &str) -> Result<bool, Error>;
}
