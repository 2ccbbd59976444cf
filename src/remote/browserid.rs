//! BrowserID assertion verifier.
//!
//! The verifier takes the form `assertion=<..>&audience=<..>` and answers
//! `{"status": "okay", "email": ".."}` or `{"status": "failure", "reason": ".."}`.

use anyhow::Result;
use reqwest::Client;
use serde::Deserialize;
use std::{future::Future, pin::Pin};
use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::auth::{IdentityVerifier, VerificationResult, bridge::valid_email};

pub const DEFAULT_VERIFY_URL: &str = "https://verifier.login.persona.org/verify";

#[derive(Debug, Error)]
enum VerifierError {
    #[error("empty assertion")]
    EmptyAssertion,
    #[error("verifier unreachable: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("verifier returned status {0}")]
    Status(u16),
    #[error("assertion rejected: {0}")]
    Rejected(String),
    #[error("verifier returned an invalid email")]
    InvalidEmail,
}

#[derive(Deserialize, Debug)]
struct VerifierResponse {
    status: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    reason: Option<String>,
}

#[derive(Debug, Clone)]
pub struct BrowserIdVerifier {
    client: Client,
    verify_url: String,
}

impl BrowserIdVerifier {
    /// Build a verifier posting to `verify_url`.
    ///
    /// # Errors
    /// Returns an error if the URL is invalid or the HTTP client cannot be built.
    pub fn new(verify_url: &str) -> Result<Self> {
        Ok(Self {
            client: super::http_client()?,
            verify_url: super::base_url(verify_url)?,
        })
    }

    #[instrument(skip(self, assertion))]
    async fn check(&self, assertion: &str, audience: &str) -> Result<String, VerifierError> {
        if assertion.trim().is_empty() {
            return Err(VerifierError::EmptyAssertion);
        }

        let response = self
            .client
            .post(&self.verify_url)
            .form(&[("assertion", assertion), ("audience", audience)])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(VerifierError::Status(response.status().as_u16()));
        }

        let body: VerifierResponse = response.json().await?;
        if body.status != "okay" {
            return Err(VerifierError::Rejected(
                body.reason.unwrap_or(body.status),
            ));
        }

        match body.email {
            Some(email) if valid_email(&email) => Ok(email),
            _ => Err(VerifierError::InvalidEmail),
        }
    }
}

impl IdentityVerifier for BrowserIdVerifier {
    fn verify<'a>(
        &'a self,
        assertion: &'a str,
        audience: &'a str,
    ) -> Pin<Box<dyn Future<Output = VerificationResult> + Send + 'a>> {
        Box::pin(async move {
            match self.check(assertion, audience).await {
                Ok(email) => {
                    debug!("Assertion verified");
                    VerificationResult::Verified { email }
                }
                Err(err) => {
                    warn!("Assertion verification failed: {err}");
                    VerificationResult::Failed
                }
            }
        })
    }
}
