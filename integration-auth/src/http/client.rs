//! Vendor HTTP client builder.

use std::time::Duration;

/// HTTP client configuration.
#[derive(Debug, Clone)]
struct HttpClientConfig {
    /// Request timeout. Applies to every vendor call.
    timeout: Duration,
    /// User agent string.
    user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            user_agent: format!("integration-auth/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Builder for the HTTP clients used to talk to vendor APIs.
///
/// Vendor calls are never retried: authorization codes are single use and every
/// failure is terminal for the request, so the client only carries a bounded
/// timeout and a user agent.
pub struct VendorClientBuilder {
    config: HttpClientConfig,
}

impl VendorClientBuilder {
    /// Create a new client builder with default configuration.
    pub fn new() -> Self {
        Self {
            config: HttpClientConfig::default(),
        }
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Build the configured HTTP client.
    pub fn build(self) -> Result<reqwest::Client, reqwest::Error> {
        reqwest::Client::builder()
            .timeout(self.config.timeout)
            .user_agent(self.config.user_agent)
            .build()
    }
}

impl Default for VendorClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
