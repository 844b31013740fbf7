//! The SEENTIA backend's authentication endpoints.

mod login;
mod profile;
mod register;

pub use login::{login, LoginError, TokenResponse};
pub use profile::{get_profile, ProfileError};
pub use register::{register, RegisterError};

use reqwest::{Client, Error, RequestBuilder, Response, StatusCode};
use serde::Serialize;
use serde_derive::Deserialize;
use std::fmt::Debug;

/// Send a form-encoded POST, attaching the bearer token when one exists.
async fn post_form<D>(
    client: &Client,
    base_url: &str,
    path: &str,
    token: Option<&str>,
    data: &D,
) -> Result<Response, Error>
where
    D: Debug + Serialize,
{
    let url = format!("{}/{}", base_url, path);

    log::debug!("Sending a request to {}", url);
    log::trace!("Payload: {:#?}", data);
    let response = with_bearer(client.post(&url), token)
        .form(&data)
        .send()
        .await?;

    log::trace!("Headers: {:#?}", response.headers());

    Ok(response)
}

/// Send a JSON POST, attaching the bearer token when one exists.
async fn post_json<D>(
    client: &Client,
    base_url: &str,
    path: &str,
    token: Option<&str>,
    data: &D,
) -> Result<Response, Error>
where
    D: Debug + Serialize,
{
    let url = format!("{}/{}", base_url, path);

    log::debug!("Sending a request to {}", url);
    log::trace!("Payload: {:#?}", data);
    let response = with_bearer(client.post(&url), token)
        .json(&data)
        .send()
        .await?;

    log::trace!("Headers: {:#?}", response.headers());

    Ok(response)
}

/// Send a GET, attaching the bearer token when one exists.
async fn get(
    client: &Client,
    base_url: &str,
    path: &str,
    token: Option<&str>,
) -> Result<Response, Error> {
    let url = format!("{}/{}", base_url, path);

    log::debug!("Sending a request to {}", url);
    let response = with_bearer(client.get(&url), token).send().await?;

    log::trace!("Headers: {:#?}", response.headers());

    Ok(response)
}

/// Requests go out without an `Authorization` header when no token exists.
fn with_bearer(builder: RequestBuilder, token: Option<&str>) -> RequestBuilder {
    match token {
        Some(token) => builder.bearer_auth(token),
        None => builder,
    }
}

/// The error body the backend sends with non-2xx responses.
#[derive(Debug, Clone, PartialEq, Deserialize)]
struct ErrorBody {
    detail: String,
}

/// Pull the backend's `detail` message out of a rejection, falling back to a
/// generic description when the body isn't the documented shape.
async fn rejection_message(response: Response) -> String {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    log::trace!("Rejection body: {}", body);

    match serde_json::from_str::<ErrorBody>(&body) {
        Ok(parsed) => parsed.detail,
        Err(_) => generic_rejection(status),
    }
}

fn generic_rejection(status: StatusCode) -> String {
    format!("The request was rejected with HTTP {}", status.as_u16())
}
