//! HTTP client building for vendor calls.

mod client;

pub use client::VendorClientBuilder;
