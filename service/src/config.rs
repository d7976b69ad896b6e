use clap::builder::TypedValueParser as _;
use clap::Parser;
use dotenvy::dotenv;
use log::LevelFilter;
use std::ffi::OsString;
use std::fmt;
use std::str::FromStr;

/// Default HubSpot redirect URI registered for local development.
pub const DEFAULT_HUBSPOT_REDIRECT_URI: &str =
    "http://localhost:8000/integrations/hubspot/oauth2callback";

/// Default base URL of the HubSpot CRM API.
pub const DEFAULT_HUBSPOT_API_BASE_URL: &str = "https://api.hubapi.com";

#[derive(Clone, Debug, PartialEq)]
pub enum RustEnv {
    Development,
    Production,
    Staging,
}

#[derive(Debug, PartialEq, Eq)]
pub struct RustEnvParseError;

impl FromStr for RustEnv {
    type Err = RustEnvParseError;
    fn from_str(level: &str) -> Result<RustEnv, Self::Err> {
        match level.to_lowercase().as_str() {
            "development" => Ok(RustEnv::Development),
            "production" => Ok(RustEnv::Production),
            "staging" => Ok(RustEnv::Staging),
            _ => Err(RustEnvParseError),
        }
    }
}

impl fmt::Display for RustEnv {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RustEnv::Development => write!(f, "development"),
            RustEnv::Production => write!(f, "production"),
            RustEnv::Staging => write!(f, "staging"),
        }
    }
}

#[derive(Clone, Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// A list of full CORS origin URLs that allowed to receive server responses.
    #[arg(
        long,
        env,
        value_delimiter = ',',
        use_value_delimiter = true,
        default_value = "http://localhost:3000"
    )]
    pub allowed_origins: Vec<String>,

    /// The HubSpot app client ID.
    #[arg(long, env)]
    hubspot_client_id: Option<String>,

    /// The HubSpot app client secret.
    #[arg(long, env, hide_env_values = true)]
    hubspot_client_secret: Option<String>,

    /// The redirect URI registered with the HubSpot app. HubSpot sends the user back here.
    #[arg(long, env, default_value = DEFAULT_HUBSPOT_REDIRECT_URI)]
    hubspot_redirect_uri: String,

    /// Space separated OAuth scopes requested from HubSpot.
    #[arg(long, env, default_value = integration_auth::oauth::providers::hubspot::DEFAULT_SCOPE)]
    hubspot_scope: String,

    /// The HubSpot OAuth authorization page.
    /// Override in tests to point at a mock server.
    #[arg(
        long,
        env,
        default_value = integration_auth::oauth::providers::hubspot::DEFAULT_AUTHORIZATION_URL
    )]
    hubspot_authorization_url: String,

    /// The HubSpot OAuth token endpoint.
    /// Override in tests to point at a mock server.
    #[arg(
        long,
        env,
        default_value = integration_auth::oauth::providers::hubspot::DEFAULT_TOKEN_URL
    )]
    hubspot_token_url: String,

    /// The base URL of the HubSpot CRM API.
    /// Override in tests to point at a mock server.
    #[arg(long, env, default_value = DEFAULT_HUBSPOT_API_BASE_URL)]
    hubspot_api_base_url: String,

    /// Seconds a pending OAuth state or an unread credential stays valid
    #[arg(
        long,
        env,
        default_value_t = 600,
        value_parser = clap::value_parser!(i64).range(1..=86_400)
    )]
    pub oauth_ttl_secs: i64,

    /// Timeout in seconds for every outbound call to a vendor API
    #[arg(
        long,
        env,
        default_value_t = 10,
        value_parser = clap::value_parser!(u64).range(1..=300)
    )]
    pub vendor_http_timeout_secs: u64,

    /// The host interface to listen for incoming connections
    #[arg(short, long, env, default_value = "127.0.0.1")]
    pub interface: Option<String>,

    /// The host TCP port to listen for incoming connections
    #[arg(short, long, env, default_value_t = 8000)]
    pub port: u16,

    /// Set the log level verbosity threshold (level) to control what gets displayed on console output
    #[arg(
        short,
        long,
        env,
        default_value_t = LevelFilter::Info,
        value_parser = clap::builder::PossibleValuesParser::new(["OFF", "ERROR", "WARN", "INFO", "DEBUG", "TRACE"])
            .map(|s| s.parse::<LevelFilter>().unwrap()),
        )]
    pub log_level_filter: LevelFilter,

    /// Set the Rust runtime environment to use.
    #[arg(
    short,
    long,
    env,
    default_value_t = RustEnv::Development,
    value_parser = clap::builder::PossibleValuesParser::new([
        "DEVELOPMENT", "PRODUCTION", "STAGING",
        "development", "production", "staging"
    ])
        .map(|s| s.parse::<RustEnv>().unwrap()),
    )]
    pub runtime_env: RustEnv,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        // Load .env file first
        dotenv().ok();
        // Then parse the command line parameters and flags
        Config::parse()
    }

    /// Parse from an explicit argument list instead of the process arguments.
    /// The first item is the binary name.
    pub fn from_args<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        Config::try_parse_from(args)
    }

    /// Returns the HubSpot client ID. A blank value counts as not configured.
    pub fn hubspot_client_id(&self) -> Option<String> {
        self.hubspot_client_id
            .clone()
            .filter(|id| !id.trim().is_empty())
    }

    /// Returns the HubSpot client secret. A blank value counts as not configured.
    pub fn hubspot_client_secret(&self) -> Option<String> {
        self.hubspot_client_secret
            .clone()
            .filter(|secret| !secret.trim().is_empty())
    }

    pub fn hubspot_redirect_uri(&self) -> &str {
        &self.hubspot_redirect_uri
    }

    pub fn hubspot_scope(&self) -> &str {
        &self.hubspot_scope
    }

    pub fn hubspot_authorization_url(&self) -> &str {
        &self.hubspot_authorization_url
    }

    pub fn hubspot_token_url(&self) -> &str {
        &self.hubspot_token_url
    }

    /// Returns the HubSpot CRM API base URL without a trailing slash.
    pub fn hubspot_api_base_url(&self) -> &str {
        self.hubspot_api_base_url.trim_end_matches('/')
    }

    /// TTL shared by pending OAuth states and unread credentials.
    pub fn oauth_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.oauth_ttl_secs)
    }

    pub fn vendor_http_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.vendor_http_timeout_secs)
    }

    pub fn runtime_env(&self) -> RustEnv {
        self.runtime_env.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Config {
        let mut argv = vec!["integration_hub"];
        argv.extend_from_slice(args);
        Config::from_args(argv).unwrap()
    }

    #[test]
    fn test_rust_env_from_str_is_case_insensitive() {
        assert_eq!("PRODUCTION".parse::<RustEnv>(), Ok(RustEnv::Production));
        assert_eq!("staging".parse::<RustEnv>(), Ok(RustEnv::Staging));
        assert_eq!("qa".parse::<RustEnv>(), Err(RustEnvParseError));
    }

    #[test]
    fn test_hubspot_overrides() {
        let config = parse(&[
            "--hubspot-client-id",
            "client-123",
            "--hubspot-client-secret",
            "secret-456",
            "--hubspot-api-base-url",
            "http://127.0.0.1:1234/",
            "--oauth-ttl-secs",
            "60",
            "--vendor-http-timeout-secs",
            "3",
        ]);

        assert_eq!(config.hubspot_client_id(), Some("client-123".to_string()));
        assert_eq!(config.hubspot_client_secret(), Some("secret-456".to_string()));
        assert_eq!(config.hubspot_api_base_url(), "http://127.0.0.1:1234");
        assert_eq!(config.oauth_ttl(), chrono::Duration::seconds(60));
        assert_eq!(
            config.vendor_http_timeout(),
            std::time::Duration::from_secs(3)
        );
    }

    #[test]
    fn test_blank_hubspot_credentials_are_not_configured() {
        let config = parse(&["--hubspot-client-id", "", "--hubspot-client-secret", " "]);

        assert_eq!(config.hubspot_client_id(), None);
        assert_eq!(config.hubspot_client_secret(), None);
    }

    #[test]
    fn test_runtime_env_flag() {
        let config = parse(&["--runtime-env", "PRODUCTION"]);
        assert_eq!(config.runtime_env(), RustEnv::Production);
    }

    #[test]
    fn test_ttl_and_timeout_must_be_in_range() {
        for args in [
            ["--oauth-ttl-secs", "0"],
            ["--oauth-ttl-secs", "-5"],
            ["--oauth-ttl-secs", "9223372036854775807"],
            ["--vendor-http-timeout-secs", "0"],
            ["--vendor-http-timeout-secs", "100000"],
        ] {
            let mut argv = vec!["integration_hub"];
            argv.extend_from_slice(&args);
            assert!(Config::from_args(argv).is_err(), "{args:?} was accepted");
        }
    }
}
