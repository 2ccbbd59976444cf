//! Firefox Accounts OAuth client.
//!
//! The browser returns from the authorization server with a redirect carrying
//! `code` and `state`. [`FxaClient`] checks the state, trades the code for an
//! access token at `/v1/token` and resolves the token to an email at
//! `/v1/verify`.

use anyhow::Result;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::{Value, json};
use std::fmt;
use tracing::{debug, instrument, warn};

use crate::auth::{ExchangeError, FxaAuthorizer, RemoteError, federated::ExchangeFuture};

pub const DEFAULT_OAUTH_URL: &str = "https://oauth.accounts.firefox.com";

#[derive(Deserialize, Debug)]
struct TokenResponse {
    access_token: Option<String>,
}

#[derive(Deserialize, Debug)]
struct VerifyResponse {
    email: Option<String>,
}

#[derive(Debug, PartialEq, Eq)]
struct AuthorizationResponse {
    code: String,
    state: String,
}

/// Extract `code` and `state` from a redirect URL or bare query string.
fn parse_auth_response(auth_response: &str) -> Result<AuthorizationResponse, ExchangeError> {
    let query = auth_response
        .split_once('?')
        .map_or(auth_response, |(_, query)| query);
    let query = query.split_once('#').map_or(query, |(query, _)| query);

    let mut code = None;
    let mut state = None;
    let mut error = None;
    for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
        match key.as_ref() {
            "code" => code = Some(value.into_owned()),
            "state" => state = Some(value.into_owned()),
            "error" => error = Some(value.into_owned()),
            _ => {}
        }
    }

    if let Some(error) = error {
        return Err(ExchangeError::Remote(RemoteError {
            error: Some(error),
            ..RemoteError::default()
        }));
    }

    Ok(AuthorizationResponse {
        code: code
            .filter(|code| !code.is_empty())
            .ok_or(ExchangeError::MissingParameter("code"))?,
        state: state
            .filter(|state| !state.is_empty())
            .ok_or(ExchangeError::MissingParameter("state"))?,
    })
}

#[derive(Clone)]
pub struct FxaClient {
    client: Client,
    oauth_url: String,
    client_id: String,
    client_secret: SecretString,
}

impl fmt::Debug for FxaClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FxaClient")
            .field("oauth_url", &self.oauth_url)
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl FxaClient {
    /// # Errors
    /// Returns an error if the URL is invalid or the HTTP client cannot be built.
    pub fn new(oauth_url: &str, client_id: String, client_secret: SecretString) -> Result<Self> {
        Ok(Self {
            client: super::http_client()?,
            oauth_url: super::base_url(oauth_url)?,
            client_id,
            client_secret,
        })
    }

    async fn post(&self, path: &str, body: Value) -> Result<Value, ExchangeError> {
        let response = self
            .client
            .post(format!("{}{path}", self.oauth_url))
            .json(&body)
            .send()
            .await
            .map_err(|err| ExchangeError::Unavailable(err.to_string()))?;

        let status = response.status();
        let body: Value = response.json().await.map_err(|err| {
            if status.is_success() {
                ExchangeError::Unavailable(format!("invalid response body: {err}"))
            } else {
                ExchangeError::Remote(RemoteError {
                    code: Some(status.as_u16()),
                    ..RemoteError::default()
                })
            }
        })?;

        if !status.is_success() || body.get("errno").is_some() {
            let mut remote: RemoteError = serde_json::from_value(body).unwrap_or_default();
            remote.code = remote.code.or(Some(status.as_u16()));
            warn!(
                "Authorization server error on {path}: code={:?} errno={:?}",
                remote.code, remote.errno
            );
            return Err(ExchangeError::Remote(remote));
        }

        Ok(body)
    }

    #[instrument(skip_all)]
    async fn exchange(&self, state: &str, auth_response: &str) -> Result<String, ExchangeError> {
        let response = parse_auth_response(auth_response)?;
        if response.state != state {
            return Err(ExchangeError::StateMismatch);
        }

        let token: TokenResponse = serde_json::from_value(
            self.post(
                "/v1/token",
                json!({
                    "client_id": self.client_id,
                    "client_secret": self.client_secret.expose_secret(),
                    "code": response.code,
                }),
            )
            .await?,
        )
        .map_err(|err| ExchangeError::Unavailable(err.to_string()))?;
        let access_token = token
            .access_token
            .ok_or(ExchangeError::MissingParameter("access_token"))?;

        let verified: VerifyResponse =
            serde_json::from_value(self.post("/v1/verify", json!({ "token": access_token })).await?)
                .map_err(|err| ExchangeError::Unavailable(err.to_string()))?;
        let email = verified
            .email
            .ok_or(ExchangeError::MissingParameter("email"))?;

        debug!("Authorization code exchanged");
        Ok(email)
    }
}

impl FxaAuthorizer for FxaClient {
    fn authorize<'a>(&'a self, state: &'a str, auth_response: &'a str) -> ExchangeFuture<'a> {
        Box::pin(self.exchange(state, auth_response))
    }
}
