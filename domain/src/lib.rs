//! Integration use cases built on top of `integration-auth` and the service configuration.
//!
//! `web` depends only on this crate for integration behavior and on its error
//! type for translating failures into HTTP responses.

pub mod error;
pub mod gateway;
pub mod hubspot;
pub mod integration_item;

pub use integration_item::IntegrationItem;
