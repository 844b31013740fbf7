use crate::{config, endpoints, UserProfile};
use async_trait::async_trait;
use reqwest::Client;

/// The network side of the session lifecycle.
///
/// [`SessionStore`][crate::SessionStore] talks to the backend only through
/// this trait, so a UI shell gets the production [`HttpBackend`] while tests
/// script their own. This is also the pluggable seam for the optional
/// token-validation step.
#[async_trait]
pub trait AuthBackend: Send + Sync {
    /// Exchange credentials for a bearer token.
    async fn login(
        &self,
        email: &str,
        password: &str,
    ) -> Result<String, BackendError>;

    /// Create an account. Does not sign the user in.
    async fn register(
        &self,
        email: &str,
        password: &str,
        name: Option<&str>,
    ) -> Result<UserProfile, BackendError>;

    /// Fetch the profile for `token`, proving the token is still good.
    async fn fetch_profile(
        &self,
        token: &str,
    ) -> Result<UserProfile, BackendError>;
}

/// What the backend seam can fail with.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// The server processed the request and said no. The message is the
    /// backend's own `detail` text when it sent one.
    #[error("{}", message)]
    Rejected { message: String },
    /// A 401 on an authenticated call - the token is no longer good.
    #[error("The session is no longer valid")]
    Unauthorized,
    /// The request never completed (offline, backend unreachable). Callers
    /// must not treat this as a sign-out.
    #[error("Unable to reach the backend")]
    Network(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// The production [`AuthBackend`], speaking to the SEENTIA backend over
/// HTTP via the [`endpoints`] module.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        HttpBackend {
            client,
            base_url: base_url.into(),
        }
    }

    /// A backend pointed at [`config::api_url()`], with the crate's default
    /// user agent.
    pub fn from_env() -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(crate::DEFAULT_USER_AGENT)
            .build()?;

        Ok(HttpBackend::new(client, config::api_url()))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl AuthBackend for HttpBackend {
    async fn login(
        &self,
        email: &str,
        password: &str,
    ) -> Result<String, BackendError> {
        let token =
            endpoints::login(&self.client, &self.base_url, email, password)
                .await
                .map_err(|e| match e {
                    endpoints::LoginError::Rejected { message } => {
                        BackendError::Rejected { message }
                    },
                    endpoints::LoginError::HttpClient(source) => {
                        BackendError::Network(Box::new(source))
                    },
                })?;

        Ok(token.access_token)
    }

    async fn register(
        &self,
        email: &str,
        password: &str,
        name: Option<&str>,
    ) -> Result<UserProfile, BackendError> {
        endpoints::register(
            &self.client,
            &self.base_url,
            email,
            password,
            name,
        )
        .await
        .map_err(|e| match e {
            endpoints::RegisterError::Rejected { message } => {
                BackendError::Rejected { message }
            },
            endpoints::RegisterError::HttpClient(source) => {
                BackendError::Network(Box::new(source))
            },
        })
    }

    async fn fetch_profile(
        &self,
        token: &str,
    ) -> Result<UserProfile, BackendError> {
        endpoints::get_profile(&self.client, &self.base_url, token)
            .await
            .map_err(|e| match e {
                endpoints::ProfileError::Unauthorized => {
                    BackendError::Unauthorized
                },
                endpoints::ProfileError::Rejected { message } => {
                    BackendError::Rejected { message }
                },
                endpoints::ProfileError::HttpClient(source) => {
                    BackendError::Network(Box::new(source))
                },
            })
    }
}
