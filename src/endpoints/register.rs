use crate::UserProfile;
use reqwest::{Client, Error as ReqwestError};
use serde_derive::{Deserialize, Serialize};

/// Create a new account.
///
/// Succeeding here does NOT sign the user in - the caller still has to
/// [`login()`][super::login] with the same credentials.
pub async fn register(
    client: &Client,
    base_url: &str,
    email: &str,
    password: &str,
    name: Option<&str>,
) -> Result<UserProfile, RegisterError> {
    let data = Data {
        email,
        password,
        name,
    };
    let response =
        super::post_json(client, base_url, "auth/register", None, &data)
            .await?;

    if !response.status().is_success() {
        let message = super::rejection_message(response).await;
        log::error!("Registration failed: {}", message);
        return Err(RegisterError::Rejected { message });
    }

    let user: UserProfile = response.json().await?;
    log::info!("Registered {}", user.email);

    Ok(user)
}

/// The registration body. `name` is optional and stays out of the payload
/// entirely when the caller didn't provide one.
#[derive(Debug, Copy, Clone, Serialize, Deserialize)]
struct Data<'a> {
    email: &'a str,
    password: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
}

/// Possible errors that may be returned by [`register()`].
#[derive(Debug, thiserror::Error)]
pub enum RegisterError {
    /// The request never completed, or the success body couldn't be read.
    #[error("Unable to send the registration request")]
    HttpClient(#[from] ReqwestError),
    /// The server rejected the registration data, e.g. a weak password or
    /// an email that's already taken. The message is the backend's `detail`
    /// text when it sent one.
    #[error("{}", message)]
    Rejected { message: String },
}
