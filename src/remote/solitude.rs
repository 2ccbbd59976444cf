//! Buyer service client (`/generic/buyer/` resource).

use anyhow::Result;
use reqwest::{Client, Response};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, instrument};

use crate::auth::{BridgeError, Buyer, BuyerService, bridge::BridgeFuture};

const BUYER_PATH: &str = "/generic/buyer/";

#[derive(Deserialize, Debug)]
struct BuyerList {
    #[serde(default)]
    objects: Vec<Buyer>,
}

#[derive(Debug, Clone)]
pub struct SolitudeClient {
    client: Client,
    base_url: String,
}

impl SolitudeClient {
    /// Build a client for the buyer service at `base_url`.
    ///
    /// # Errors
    /// Returns an error if the URL is invalid or the HTTP client cannot be built.
    pub fn new(base_url: &str) -> Result<Self> {
        Ok(Self {
            client: super::http_client()?,
            base_url: super::base_url(base_url)?,
        })
    }

    fn buyers_url(&self) -> String {
        format!("{}{BUYER_PATH}", self.base_url)
    }

    #[instrument(skip(self))]
    async fn fetch(&self, uuid: &str) -> Result<Option<Buyer>, BridgeError> {
        let response = self
            .client
            .get(self.buyers_url())
            .query(&[("uuid", uuid)])
            .send()
            .await
            .map_err(unavailable)?;
        let list: BuyerList = parse(check_status(response)?).await?;
        Ok(list.objects.into_iter().next())
    }

    #[instrument(skip(self, email))]
    async fn create(&self, uuid: &str, email: &str) -> Result<Buyer, BridgeError> {
        let response = self
            .client
            .post(self.buyers_url())
            .json(&json!({ "uuid": uuid, "email": email }))
            .send()
            .await
            .map_err(unavailable)?;
        parse(check_status(response)?).await
    }

    #[instrument(skip(self, buyer, email), fields(uuid = %buyer.uuid))]
    async fn update(&self, buyer: &Buyer, email: &str) -> Result<(), BridgeError> {
        let pk = buyer
            .resource_pk
            .ok_or_else(|| BridgeError::InvalidResponse("buyer has no resource_pk".to_string()))?;
        let response = self
            .client
            .patch(format!("{}{pk}/", self.buyers_url()))
            .json(&json!({ "email": email }))
            .send()
            .await
            .map_err(unavailable)?;
        check_status(response)?;
        debug!("Buyer email updated");
        Ok(())
    }
}

impl BuyerService for SolitudeClient {
    fn get_buyer<'a>(&'a self, uuid: &'a str) -> BridgeFuture<'a, Option<Buyer>> {
        Box::pin(self.fetch(uuid))
    }

    fn create_buyer<'a>(&'a self, uuid: &'a str, email: &'a str) -> BridgeFuture<'a, Buyer> {
        Box::pin(self.create(uuid, email))
    }

    fn update_buyer<'a>(&'a self, buyer: &'a Buyer, email: &'a str) -> BridgeFuture<'a, ()> {
        Box::pin(self.update(buyer, email))
    }
}

fn unavailable(err: reqwest::Error) -> BridgeError {
    BridgeError::Unavailable(err.to_string())
}

fn check_status(response: Response) -> Result<Response, BridgeError> {
    if response.status().is_success() {
        Ok(response)
    } else {
        Err(BridgeError::Status(response.status().as_u16()))
    }
}

async fn parse<T: serde::de::DeserializeOwned>(response: Response) -> Result<T, BridgeError> {
    response
        .json()
        .await
        .map_err(|err| BridgeError::InvalidResponse(err.to_string()))
}
