//! HTTP clients for the remote collaborators of [`crate::auth::AuthService`].
//!
//! - [`browserid`]: assertion verifier backend.
//! - [`solitude`]: buyer/account service.
//! - [`marketplace`]: marketplace account service (permissions).
//! - [`fxa`]: Firefox Accounts OAuth server.
//!
//! Every client carries [`crate::APP_USER_AGENT`] and a request timeout; no
//! call is retried.

pub mod browserid;
pub mod fxa;
pub mod marketplace;
pub mod solitude;

pub use browserid::BrowserIdVerifier;
pub use fxa::FxaClient;
pub use marketplace::MarketplaceClient;
pub use solitude::SolitudeClient;

use anyhow::{Context, Result, anyhow};
use reqwest::Client;
use std::time::Duration;
use url::Url;

const REQUEST_TIMEOUT_SECONDS: u64 = 10;

fn http_client() -> Result<Client> {
    Client::builder()
        .user_agent(crate::APP_USER_AGENT)
        .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECONDS))
        .build()
        .context("Failed to build HTTP client")
}

/// Validate a base URL and strip any trailing slash so paths can be appended.
fn base_url(url: &str) -> Result<String> {
    let parsed = Url::parse(url).with_context(|| format!("Invalid URL: {url}"))?;
    match parsed.scheme() {
        "http" | "https" => Ok(url.trim_end_matches('/').to_string()),
        scheme => Err(anyhow!("Unsupported URL scheme {scheme}: {url}")),
    }
}
