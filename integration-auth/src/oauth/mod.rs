//! OAuth 2.0 authorization code infrastructure.
//!
//! Provides the CSRF state binding, provider abstraction and the flow that ties
//! them to the ephemeral credential vault.

mod flow;
mod provider;
mod state;

pub mod providers;
pub mod token;

pub use flow::{Authorized, CallbackParams, Flow, CLOSE_WINDOW_HTML};
pub use provider::{AuthorizationRequest, Provider, ProviderKind};
pub use state::{AuthState, IssuedState, StateManager};
