use serde_derive::{Deserialize, Serialize};

/// Where the current session sits in its lifecycle.
///
/// `Initializing` is entered exactly once, at startup, and is left as soon
/// as [`SessionStore::initialize()`][crate::SessionStore::initialize] has
/// looked at the persisted token. It is never re-entered.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SessionStatus {
    /// The startup check hasn't finished yet. Consumers should render a
    /// neutral waiting state and make no redirect decision.
    Initializing,
    /// No usable token. Protected views redirect to login.
    Unauthenticated,
    /// A token is present and is treated optimistically as valid.
    Authenticated,
}

/// The in-memory record of the current user's authentication state.
///
/// Invariant: `status` is [`SessionStatus::Authenticated`] if and only if
/// `token` holds a non-empty string. `user` is independent of that - a
/// session can be authenticated long before (or without) a profile fetch.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub struct Session {
    pub token: Option<String>,
    pub user: Option<UserProfile>,
    pub status: SessionStatus,
}

impl Session {
    /// A fresh session, before the startup check has run.
    pub fn initializing() -> Self {
        Session {
            token: None,
            user: None,
            status: SessionStatus::Initializing,
        }
    }

    /// A signed-out session.
    pub fn unauthenticated() -> Self {
        Session {
            token: None,
            user: None,
            status: SessionStatus::Unauthenticated,
        }
    }

    /// A session backed by `token`. The profile is left unset.
    pub fn authenticated(token: impl Into<String>) -> Self {
        Session {
            token: Some(token.into()),
            user: None,
            status: SessionStatus::Authenticated,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.status == SessionStatus::Authenticated
    }

    /// Checks the status/token invariant. Mutations go through
    /// [`SessionStore`][crate::SessionStore], which upholds this.
    pub fn invariant_holds(&self) -> bool {
        let has_token = self.token.as_deref().map_or(false, |t| !t.is_empty());
        has_token == (self.status == SessionStatus::Authenticated)
    }
}

/// The signed-in user, as reported by the backend.
///
/// Only ever populated by an explicit profile fetch - never inferred from
/// the token contents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
}
