//! Clients for third-party vendor APIs.

pub mod hubspot;
