//! Marketplace account client used for permission import.

use anyhow::{Context, Result, anyhow};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::{future::Future, pin::Pin};
use tracing::instrument;

use crate::auth::{PermissionSet, PermissionSource};

const LOGIN_PATH: &str = "/api/v2/account/login/";

#[derive(Deserialize, Debug)]
struct LoginResponse {
    #[serde(default)]
    permissions: PermissionSet,
}

#[derive(Debug, Clone)]
pub struct MarketplaceClient {
    client: Client,
    base_url: String,
}

impl MarketplaceClient {
    /// # Errors
    /// Returns an error if the URL is invalid or the HTTP client cannot be built.
    pub fn new(base_url: &str) -> Result<Self> {
        Ok(Self {
            client: super::http_client()?,
            base_url: super::base_url(base_url)?,
        })
    }

    #[instrument(skip(self))]
    async fn login(&self, uuid: &str) -> Result<PermissionSet> {
        let response = self
            .client
            .post(format!("{}{LOGIN_PATH}", self.base_url))
            .json(&json!({ "uuid": uuid }))
            .send()
            .await
            .context("Marketplace login request failed")?;

        let status = response.status();
        if !status.is_success() {
            return Err(anyhow!("Marketplace login returned {status}"));
        }

        let body: LoginResponse = response
            .json()
            .await
            .context("Marketplace login returned an invalid body")?;
        Ok(body.permissions)
    }
}

impl PermissionSource for MarketplaceClient {
    fn fetch_permissions<'a>(
        &'a self,
        uuid: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<PermissionSet>> + Send + 'a>> {
        Box::pin(self.login(uuid))
    }
}
