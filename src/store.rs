use crate::{
    backend::{AuthBackend, BackendError},
    session::{Session, SessionStatus, UserProfile},
    storage::TokenStore,
};

/// The shortest password the backend will accept. Checked locally so an
/// obviously weak password never costs a network round trip.
pub const MIN_PASSWORD_LEN: usize = 8;

/// The single source of truth for authentication state.
///
/// Owns the in-memory [`Session`], the persisted token slot, and the only
/// handle to the auth backend. Construct one at application start, call
/// [`initialize()`][SessionStore::initialize], and pass it by reference to
/// whatever consumes it - there is no ambient singleton.
///
/// Authentication is optimistic: a persisted token is treated as a valid
/// session without a server round trip. [`refresh_profile()`][SessionStore::refresh_profile]
/// is the opt-in validation step for callers that want the round trip.
pub struct SessionStore<B> {
    backend: B,
    tokens: Box<dyn TokenStore>,
    session: Session,
    /// Bumped by every mutation of `token`/`status`. A profile refresh only
    /// applies its result if the epoch it started under is still current,
    /// so a login completing mid-refresh always wins.
    epoch: u64,
}

/// What the session operations can fail with.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// A local pre-flight check failed; nothing was sent.
    #[error("{0}")]
    Validation(String),
    /// The backend rejected the credentials or registration data. The
    /// message is the backend's own, passed through verbatim.
    #[error("{0}")]
    Auth(String),
    /// An authenticated call came back 401 - the session has been
    /// invalidated and the route guard will redirect to login.
    #[error("The session is no longer valid")]
    Unauthorized,
    /// The backend couldn't be reached. The session is left as it was; a
    /// flaky connection must not log anyone out.
    #[error("Unable to reach the backend")]
    Network(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl<B: AuthBackend> SessionStore<B> {
    /// A store in the `Initializing` state. Call
    /// [`initialize()`][SessionStore::initialize] next.
    pub fn new(backend: B, tokens: Box<dyn TokenStore>) -> Self {
        SessionStore {
            backend,
            tokens,
            session: Session::initializing(),
            epoch: 0,
        }
    }

    pub fn status(&self) -> SessionStatus {
        self.session.status
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn token(&self) -> Option<&str> {
        self.session.token.as_deref()
    }

    pub fn user(&self) -> Option<&UserProfile> {
        self.session.user.as_ref()
    }

    /// Resolve the startup state from the persisted token.
    ///
    /// No network I/O happens here: a stored token yields `Authenticated`
    /// on presence alone. An unreadable slot degrades to `Unauthenticated`
    /// (best-effort clearing the slot) rather than failing the app.
    pub fn initialize(&mut self) {
        self.epoch += 1;

        match self.tokens.load() {
            Ok(Some(token)) => {
                log::debug!("Found a stored token; starting authenticated");
                self.session = Session::authenticated(token);
            },
            Ok(None) => {
                log::debug!("No stored token; starting unauthenticated");
                self.session = Session::unauthenticated();
            },
            Err(e) => {
                log::warn!("Unable to read the stored token: {}", e);
                if let Err(e) = self.tokens.clear() {
                    log::warn!("Unable to clear the stored token: {}", e);
                }
                self.session = Session::unauthenticated();
            },
        }
    }

    /// Exchange credentials for a session.
    ///
    /// On success the token is persisted and the session becomes
    /// `Authenticated`; the profile is NOT populated (fetch it with
    /// [`refresh_profile()`][SessionStore::refresh_profile] or
    /// [`set_user()`][SessionStore::set_user]). On any failure the session
    /// is left exactly as it was and the error is resurfaced to the caller.
    pub async fn login(
        &mut self,
        email: &str,
        password: &str,
    ) -> Result<(), SessionError> {
        validate_credentials(email, password)?;

        let token = self.backend.login(email, password).await.map_err(
            |e| match e {
                BackendError::Rejected { message } => {
                    SessionError::Auth(message)
                },
                BackendError::Unauthorized => SessionError::Auth(
                    String::from("The credentials were not accepted"),
                ),
                BackendError::Network(source) => {
                    SessionError::Network(source)
                },
            },
        )?;

        // an empty token would claim Authenticated with nothing to send
        if token.is_empty() {
            return Err(SessionError::Auth(String::from(
                "The backend returned an empty token",
            )));
        }

        self.epoch += 1;
        if let Err(e) = self.tokens.save(&token) {
            // the in-memory session still works for this run
            log::error!("Unable to persist the token: {}", e);
        }
        self.session = Session::authenticated(token);

        Ok(())
    }

    /// Create an account. Succeeding here does NOT sign the user in and
    /// never mutates the session; backend rejections (weak password, taken
    /// email) come back verbatim.
    pub async fn register(
        &mut self,
        email: &str,
        password: &str,
        name: Option<&str>,
    ) -> Result<UserProfile, SessionError> {
        validate_credentials(email, password)?;

        self.backend
            .register(email, password, name)
            .await
            .map_err(|e| match e {
                BackendError::Rejected { message } => {
                    SessionError::Auth(message)
                },
                BackendError::Unauthorized => SessionError::Auth(
                    String::from("The registration was not accepted"),
                ),
                BackendError::Network(source) => {
                    SessionError::Network(source)
                },
            })
    }

    /// Drop the session and the persisted token. Purely local, no network
    /// call. Logging out twice is the same as logging out once.
    pub fn logout(&mut self) {
        log::info!("Logging out");
        self.reset();
    }

    /// The 401 hand-off: any layer that sees an unauthorized response on an
    /// authenticated call reports it here, invalidating the session so the
    /// next route-guard evaluation redirects to login. Idempotent.
    pub fn note_unauthorized(&mut self) {
        if self.session.status == SessionStatus::Authenticated {
            log::warn!("The backend rejected the session; signing out");
        }
        self.reset();
    }

    /// Populate the profile without touching the token or status. For
    /// consumers that fetched profile data through their own calls.
    pub fn set_user(&mut self, profile: UserProfile) {
        self.session.user = Some(profile);
    }

    /// The optional validation round trip: fetch the profile with the
    /// current token and store it on the session.
    ///
    /// A 401 invalidates the session (token cleared, `Unauthenticated`); a
    /// network failure leaves the session untouched. If some other
    /// operation mutated the session while the fetch was in flight, the
    /// stale result is discarded.
    pub async fn refresh_profile(&mut self) -> Result<(), SessionError> {
        let token = match self.session.token.clone() {
            Some(token) => token,
            None => return Ok(()),
        };

        let epoch = self.epoch;
        let result = self.backend.fetch_profile(&token).await;

        self.apply_profile_result(epoch, result)
    }

    fn apply_profile_result(
        &mut self,
        epoch: u64,
        result: Result<UserProfile, BackendError>,
    ) -> Result<(), SessionError> {
        if self.epoch != epoch {
            log::debug!("Discarding a stale profile check result");
            return Ok(());
        }

        match result {
            Ok(profile) => {
                self.session.user = Some(profile);
                Ok(())
            },
            Err(BackendError::Unauthorized) => {
                self.note_unauthorized();
                Err(SessionError::Unauthorized)
            },
            Err(BackendError::Rejected { message }) => {
                Err(SessionError::Auth(message))
            },
            Err(BackendError::Network(source)) => {
                Err(SessionError::Network(source))
            },
        }
    }

    fn reset(&mut self) {
        self.epoch += 1;
        if let Err(e) = self.tokens.clear() {
            log::warn!("Unable to clear the stored token: {}", e);
        }
        self.session = Session::unauthenticated();
    }
}

fn validate_credentials(
    email: &str,
    password: &str,
) -> Result<(), SessionError> {
    if email.trim().is_empty() || !email.contains('@') {
        return Err(SessionError::Validation(String::from(
            "Enter a valid email address",
        )));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(SessionError::Validation(format!(
            "The password must be at least {} characters long",
            MIN_PASSWORD_LEN
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryTokenStore;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use std::sync::{Arc, Mutex};

    /// A scripted [`AuthBackend`] that records every call it receives.
    #[derive(Default)]
    struct FakeBackend {
        login_token: Option<String>,
        login_rejection: Option<String>,
        profile: Option<UserProfile>,
        profile_unauthorized: bool,
        profile_unreachable: bool,
        calls: Arc<Mutex<Vec<String>>>,
    }

    impl FakeBackend {
        fn record(&self, call: &str) {
            self.calls.lock().unwrap().push(call.to_string());
        }
    }

    #[async_trait]
    impl AuthBackend for FakeBackend {
        async fn login(
            &self,
            _email: &str,
            _password: &str,
        ) -> Result<String, BackendError> {
            self.record("login");
            if let Some(message) = &self.login_rejection {
                return Err(BackendError::Rejected {
                    message: message.clone(),
                });
            }
            Ok(self.login_token.clone().unwrap())
        }

        async fn register(
            &self,
            email: &str,
            _password: &str,
            name: Option<&str>,
        ) -> Result<UserProfile, BackendError> {
            self.record("register");
            Ok(UserProfile {
                id: String::from("1"),
                email: email.to_string(),
                name: name.map(String::from),
            })
        }

        async fn fetch_profile(
            &self,
            _token: &str,
        ) -> Result<UserProfile, BackendError> {
            self.record("fetch_profile");
            if self.profile_unauthorized {
                return Err(BackendError::Unauthorized);
            }
            if self.profile_unreachable {
                return Err(BackendError::Network(Box::new(
                    std::io::Error::new(
                        std::io::ErrorKind::ConnectionRefused,
                        "connection refused",
                    ),
                )));
            }
            Ok(self.profile.clone().unwrap())
        }
    }

    fn sample_profile() -> UserProfile {
        UserProfile {
            id: String::from("42"),
            email: String::from("user@x.com"),
            name: Some(String::from("Sam")),
        }
    }

    #[test]
    fn initialize_without_token_stays_offline() {
        let backend = FakeBackend::default();
        let calls = Arc::clone(&backend.calls);
        let mut store =
            SessionStore::new(backend, Box::new(MemoryTokenStore::new()));

        store.initialize();

        assert_eq!(store.status(), SessionStatus::Unauthenticated);
        assert!(calls.lock().unwrap().is_empty());
    }

    #[test]
    fn initialize_with_token_is_optimistically_authenticated() {
        let backend = FakeBackend::default();
        let calls = Arc::clone(&backend.calls);
        let mut store = SessionStore::new(
            backend,
            Box::new(MemoryTokenStore::with_token("stored-token")),
        );

        store.initialize();

        assert_eq!(store.status(), SessionStatus::Authenticated);
        assert_eq!(store.token(), Some("stored-token"));
        assert!(calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn login_success_persists_the_token() {
        let backend = FakeBackend {
            login_token: Some(String::from("abc")),
            ..FakeBackend::default()
        };
        let mut store =
            SessionStore::new(backend, Box::new(MemoryTokenStore::new()));
        store.initialize();

        store.login("user@x.com", "validpass").await.unwrap();

        assert_eq!(store.status(), SessionStatus::Authenticated);
        assert_eq!(store.token(), Some("abc"));
        assert_eq!(
            store.tokens.load().unwrap(),
            Some(String::from("abc"))
        );
        assert_eq!(store.user(), None);
    }

    #[tokio::test]
    async fn login_rejection_surfaces_the_backend_message() {
        let backend = FakeBackend {
            login_rejection: Some(String::from("Invalid credentials")),
            ..FakeBackend::default()
        };
        let mut store =
            SessionStore::new(backend, Box::new(MemoryTokenStore::new()));
        store.initialize();

        let err = store.login("user@x.com", "validpass").await.unwrap_err();

        match err {
            SessionError::Auth(message) => {
                assert_eq!(message, "Invalid credentials")
            },
            other => panic!("expected an auth error, got {:?}", other),
        }
        assert_eq!(store.status(), SessionStatus::Unauthenticated);
        assert_eq!(store.tokens.load().unwrap(), None);
    }

    #[tokio::test]
    async fn short_password_never_reaches_the_network() {
        let backend = FakeBackend::default();
        let calls = Arc::clone(&backend.calls);
        let mut store =
            SessionStore::new(backend, Box::new(MemoryTokenStore::new()));
        store.initialize();

        let err = store.login("user@x.com", "short").await.unwrap_err();

        assert!(matches!(err, SessionError::Validation(_)));
        assert!(calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn logout_is_idempotent() {
        let backend = FakeBackend {
            login_token: Some(String::from("abc")),
            ..FakeBackend::default()
        };
        let mut store =
            SessionStore::new(backend, Box::new(MemoryTokenStore::new()));
        store.initialize();
        store.login("user@x.com", "validpass").await.unwrap();

        store.logout();
        let after_first = store.session().clone();
        store.logout();

        assert_eq!(store.session(), &after_first);
        assert_eq!(store.status(), SessionStatus::Unauthenticated);
        assert_eq!(store.tokens.load().unwrap(), None);
    }

    #[test]
    fn unauthorized_signal_invalidates_the_session() {
        let mut store = SessionStore::new(
            FakeBackend::default(),
            Box::new(MemoryTokenStore::with_token("stale")),
        );
        store.initialize();
        assert_eq!(store.status(), SessionStatus::Authenticated);

        store.note_unauthorized();

        assert_eq!(store.status(), SessionStatus::Unauthenticated);
        assert_eq!(store.tokens.load().unwrap(), None);
    }

    #[tokio::test]
    async fn unauthorized_profile_check_clears_the_stored_token() {
        let backend = FakeBackend {
            profile_unauthorized: true,
            ..FakeBackend::default()
        };
        let mut store = SessionStore::new(
            backend,
            Box::new(MemoryTokenStore::with_token("stale")),
        );
        store.initialize();

        let err = store.refresh_profile().await.unwrap_err();

        assert!(matches!(err, SessionError::Unauthorized));
        assert_eq!(store.status(), SessionStatus::Unauthenticated);
        assert_eq!(store.tokens.load().unwrap(), None);
    }

    #[tokio::test]
    async fn network_failure_does_not_log_the_user_out() {
        let backend = FakeBackend {
            profile_unreachable: true,
            ..FakeBackend::default()
        };
        let mut store = SessionStore::new(
            backend,
            Box::new(MemoryTokenStore::with_token("still-good")),
        );
        store.initialize();

        let err = store.refresh_profile().await.unwrap_err();

        assert!(matches!(err, SessionError::Network(_)));
        assert_eq!(store.status(), SessionStatus::Authenticated);
        assert_eq!(
            store.tokens.load().unwrap(),
            Some(String::from("still-good"))
        );
    }

    #[tokio::test]
    async fn successful_profile_check_populates_the_user() {
        let backend = FakeBackend {
            profile: Some(sample_profile()),
            ..FakeBackend::default()
        };
        let mut store = SessionStore::new(
            backend,
            Box::new(MemoryTokenStore::with_token("stored")),
        );
        store.initialize();

        store.refresh_profile().await.unwrap();

        assert_eq!(store.user(), Some(&sample_profile()));
        assert_eq!(store.token(), Some("stored"));
    }

    #[tokio::test]
    async fn login_supersedes_an_in_flight_profile_check() {
        let backend = FakeBackend {
            login_token: Some(String::from("fresh")),
            ..FakeBackend::default()
        };
        let mut store = SessionStore::new(
            backend,
            Box::new(MemoryTokenStore::with_token("stale")),
        );
        store.initialize();
        let stale_epoch = store.epoch;

        // a login lands while the startup profile check is still in flight
        store.login("user@x.com", "validpass").await.unwrap();
        let outcome = store
            .apply_profile_result(stale_epoch, Err(BackendError::Unauthorized));

        // the stale 401 must not clobber the fresh login
        outcome.unwrap();
        assert_eq!(store.status(), SessionStatus::Authenticated);
        assert_eq!(store.token(), Some("fresh"));
    }

    #[tokio::test]
    async fn register_does_not_mutate_the_session() {
        let mut store = SessionStore::new(
            FakeBackend::default(),
            Box::new(MemoryTokenStore::new()),
        );
        store.initialize();

        let user = store
            .register("new@x.com", "longenough", Some("Sam"))
            .await
            .unwrap();

        assert_eq!(user.email, "new@x.com");
        assert_eq!(store.status(), SessionStatus::Unauthenticated);
        assert_eq!(store.tokens.load().unwrap(), None);
    }

    #[test]
    fn set_user_leaves_token_and_status_alone() {
        let mut store = SessionStore::new(
            FakeBackend::default(),
            Box::new(MemoryTokenStore::with_token("stored")),
        );
        store.initialize();

        store.set_user(sample_profile());

        assert_eq!(store.user(), Some(&sample_profile()));
        assert_eq!(store.token(), Some("stored"));
        assert_eq!(store.status(), SessionStatus::Authenticated);
    }
}
