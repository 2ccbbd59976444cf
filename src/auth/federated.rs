//! Federated (Firefox Accounts) authorization exchange seam.

use serde::{Deserialize, Serialize};
use std::{future::Future, pin::Pin};
use thiserror::Error;

/// Error document returned by the authorization server, e.g.
/// `{"code": 400, "errno": 101, "error": "Bad Request", "message": "Unknown client"}`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteError {
    #[serde(default)]
    pub code: Option<u16>,
    #[serde(default)]
    pub errno: Option<i64>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExchangeError {
    #[error("authorization response is missing `{0}`")]
    MissingParameter(&'static str),
    #[error("authorization state mismatch")]
    StateMismatch,
    #[error("authorization server rejected the exchange: {}", .0.error.as_deref().unwrap_or("unknown"))]
    Remote(RemoteError),
    #[error("authorization server unavailable: {0}")]
    Unavailable(String),
}

impl ExchangeError {
    /// Remote `errno`, when the authorization server supplied one.
    #[must_use]
    pub fn errno(&self) -> Option<i64> {
        match self {
            Self::Remote(remote) => remote.errno,
            _ => None,
        }
    }

    /// Human readable detail safe to return to the client.
    #[must_use]
    pub fn detail(&self) -> Option<String> {
        match self {
            Self::Remote(remote) => remote.message.clone(),
            Self::MissingParameter(_) | Self::StateMismatch => Some(self.to_string()),
            Self::Unavailable(_) => None,
        }
    }
}

pub type ExchangeFuture<'a> = Pin<Box<dyn Future<Output = Result<String, ExchangeError>> + Send + 'a>>;

/// Trades an OAuth authorization response for the authorized email.
pub trait FxaAuthorizer: Send + Sync {
    fn authorize<'a>(&'a self, state: &'a str, auth_response: &'a str) -> ExchangeFuture<'a>;
}
