//! The session and authentication layer for the SEENTIA styling service.
//!
//! This crate owns the bearer-token lifecycle on the client side: a
//! [`SessionStore`] holding the single source of truth for authentication
//! state, durable token persistence behind the [`TokenStore`] trait, the
//! pure route-guard decision in [`guard`], and the HTTP glue to the
//! backend's auth endpoints in [`endpoints`].

#![forbid(unsafe_code)]

#[cfg(test)]
#[macro_use]
extern crate pretty_assertions;

mod backend;
pub mod config;
pub mod endpoints;
pub mod guard;
mod session;
mod storage;
mod store;

pub use backend::{AuthBackend, BackendError, HttpBackend};
pub use session::{Session, SessionStatus, UserProfile};
pub use storage::{
    FileTokenStore, MemoryTokenStore, StorageError, TokenStore,
    AUTH_TOKEN_KEY,
};
pub use store::{SessionError, SessionStore, MIN_PASSWORD_LEN};

/// The default user agent to use when communicating with the SEENTIA
/// backend.
pub const DEFAULT_USER_AGENT: &str =
    concat!(env!("CARGO_PKG_NAME"), "-", env!("CARGO_PKG_VERSION"));
