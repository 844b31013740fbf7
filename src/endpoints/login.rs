use reqwest::{Client, Error as ReqwestError};
use serde_derive::{Deserialize, Serialize};

/// Exchange credentials for a bearer token.
///
/// The backend takes the classic OAuth2 password-grant shape: a
/// form-encoded body where the `username` field carries the email address.
pub async fn login(
    client: &Client,
    base_url: &str,
    email: &str,
    password: &str,
) -> Result<TokenResponse, LoginError> {
    let data = Data {
        username: email,
        password,
    };
    let response =
        super::post_form(client, base_url, "auth/login", None, &data).await?;

    if !response.status().is_success() {
        let message = super::rejection_message(response).await;
        log::error!("Login failed: {}", message);
        return Err(LoginError::Rejected { message });
    }

    let token: TokenResponse = response.json().await?;
    log::info!("Logged in as {}", email);

    Ok(token)
}

/// A freshly issued credential, as returned by the login endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenResponse {
    /// The opaque bearer string to attach to subsequent requests.
    pub access_token: String,
    /// Always `"bearer"` in practice.
    pub token_type: String,
}

#[derive(Debug, Copy, Clone, Serialize, Deserialize)]
struct Data<'a> {
    username: &'a str,
    password: &'a str,
}

/// Possible errors that may be returned by [`login()`].
#[derive(Debug, thiserror::Error)]
pub enum LoginError {
    /// The request never completed, or the success body couldn't be read.
    #[error("Unable to send the login request")]
    HttpClient(#[from] ReqwestError),
    /// The server turned the credentials down. The message is the backend's
    /// own `detail` text when it sent one.
    #[error("{}", message)]
    Rejected { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parse_happy_login_response() {
        let src = r#"{"access_token": "abc", "token_type": "bearer"}"#;
        let should_be = TokenResponse {
            access_token: String::from("abc"),
            token_type: String::from("bearer"),
        };

        let got: TokenResponse = serde_json::from_str(src).unwrap();

        assert_eq!(got, should_be);
    }

    // The email travels in the `username` field, per the password-grant
    // convention the backend follows.
    #[test]
    fn credentials_go_out_as_username_and_password() {
        let data = Data {
            username: "user@x.com",
            password: "validpass",
        };

        let got = serde_json::to_value(&data).unwrap();

        assert_eq!(
            got,
            serde_json::json!({
                "username": "user@x.com",
                "password": "validpass",
            })
        );
    }

    #[test]
    fn rejection_keeps_the_backend_message() {
        let err = LoginError::Rejected {
            message: String::from("Invalid credentials"),
        };

        assert_eq!(err.to_string(), "Invalid credentials");
    }
}
