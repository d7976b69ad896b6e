//! # integration-auth
//!
//! Authentication plumbing for third-party CRM integrations:
//! - TTL key/value store abstraction with an in-process implementation
//! - OAuth 2.0 authorization code flow with CSRF state binding
//! - OAuth provider implementations (HubSpot)
//! - Single-read credential vault for freshly obtained tokens
//! - Vendor HTTP client building
//!
//! ## Architecture
//!
//! Nothing in this crate keeps per-request state in process. Pending OAuth
//! states and obtained token bundles live in a [`store::TtlStore`] keyed by
//! `(org_id, user_id)` and expire on their own:
//! - `domain` builds a [`oauth::Flow`] from configuration for each request
//! - the flow validates the callback and hands tokens over exactly once
//!
//! ## Usage
//!
//! ```rust,ignore
//! use integration_auth::{
//!     oauth::{providers::hubspot, CallbackParams, Flow},
//!     store::MemoryStore,
//!     http::VendorClientBuilder,
//! };
//! ```

pub mod credentials;
pub mod error;
pub mod http;
pub mod oauth;
pub mod store;

// Re-export commonly used types
pub use error::{Error, ErrorKind};
