use crate::UserProfile;
use reqwest::{Client, Error as ReqwestError, StatusCode};

/// Fetch the signed-in user's profile.
///
/// This doubles as the session validation probe: a 401 here means the token
/// the session was built on is no longer good.
pub async fn get_profile(
    client: &Client,
    base_url: &str,
    token: &str,
) -> Result<UserProfile, ProfileError> {
    let response =
        super::get(client, base_url, "auth/me", Some(token)).await?;

    if response.status() == StatusCode::UNAUTHORIZED {
        log::warn!("The backend no longer accepts the stored token");
        return Err(ProfileError::Unauthorized);
    }

    if !response.status().is_success() {
        let message = super::rejection_message(response).await;
        return Err(ProfileError::Rejected { message });
    }

    let user: UserProfile = response.json().await?;
    log::debug!("Fetched the profile for {}", user.email);

    Ok(user)
}

/// Possible errors that may be returned by [`get_profile()`].
#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    /// The request never completed, or the success body couldn't be read.
    #[error("Unable to send the profile request")]
    HttpClient(#[from] ReqwestError),
    /// The token was missing, invalid, or expired. Callers must route this
    /// into [`SessionStore::note_unauthorized()`][crate::SessionStore::note_unauthorized]
    /// so the session gets invalidated.
    #[error("The session is no longer valid")]
    Unauthorized,
    /// Any other rejection.
    #[error("{}", message)]
    Rejected { message: String },
}
