//! Ephemeral credential handoff between the OAuth callback and the caller.

mod vault;

pub use vault::CredentialVault;
