//! Account bridge: stable user identifiers and the remote buyer record.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::{future::Future, pin::Pin};
use thiserror::Error;
use tracing::{debug, info};

pub type BridgeFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, BridgeError>> + Send + 'a>>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BridgeError {
    #[error("account service unavailable: {0}")]
    Unavailable(String),
    #[error("account service returned status {0}")]
    Status(u16),
    #[error("invalid account service response: {0}")]
    InvalidResponse(String),
}

/// Buyer as stored by the remote account service.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Buyer {
    pub uuid: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub pin: bool,
    #[serde(default)]
    pub needs_pin_reset: bool,
    #[serde(default)]
    pub resource_pk: Option<u64>,
}

/// PIN state of a buyer, as needed by the payment flow.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BuyerRecord {
    pub pin_set: bool,
    pub needs_pin_reset: bool,
}

impl From<&Buyer> for BuyerRecord {
    fn from(buyer: &Buyer) -> Self {
        Self {
            pin_set: buyer.pin,
            needs_pin_reset: buyer.needs_pin_reset,
        }
    }
}

/// Remote account service holding buyers.
pub trait BuyerService: Send + Sync {
    fn get_buyer<'a>(&'a self, uuid: &'a str) -> BridgeFuture<'a, Option<Buyer>>;
    fn create_buyer<'a>(&'a self, uuid: &'a str, email: &'a str) -> BridgeFuture<'a, Buyer>;
    fn update_buyer<'a>(&'a self, buyer: &'a Buyer, email: &'a str) -> BridgeFuture<'a, ()>;
}

/// Normalize an email for hashing and allow-list checks.
pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

static EMAIL_RE: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").ok());

/// Basic email format check.
pub(crate) fn valid_email(email: &str) -> bool {
    EMAIL_RE
        .as_ref()
        .is_some_and(|regex| regex.is_match(email))
}

/// Derive the domain-scoped user identifier for `email`.
///
/// Pure: the same normalized email and domain always give the same value.
#[must_use]
pub fn resolve_uuid(email: &str, domain: &str) -> String {
    let digest = Sha256::digest(normalize_email(email).as_bytes());
    format!("{domain}:{digest:x}")
}

/// Fetch the buyer for `uuid`, creating it or bringing its email up to date.
///
/// # Errors
/// Returns `BridgeError` if any call to the account service fails.
pub async fn sync_buyer(
    service: &dyn BuyerService,
    uuid: &str,
    email: &str,
) -> Result<BuyerRecord, BridgeError> {
    let Some(buyer) = service.get_buyer(uuid).await? else {
        info!("Creating buyer {uuid}");
        let buyer = service.create_buyer(uuid, email).await?;
        return Ok(BuyerRecord::from(&buyer));
    };

    if buyer.email.as_deref() != Some(email) {
        debug!("Updating email of buyer {uuid}");
        service.update_buyer(&buyer, email).await?;
    }

    Ok(BuyerRecord::from(&buyer))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingService {
        existing: Option<Buyer>,
        fail_get: bool,
        calls: Mutex<Vec<String>>,
    }

    impl RecordingService {
        fn calls(&self) -> Vec<String> {
            self.calls.lock().map(|calls| calls.clone()).unwrap_or_default()
        }

        fn record(&self, call: String) {
            if let Ok(mut calls) = self.calls.lock() {
                calls.push(call);
            }
        }
    }

    impl BuyerService for RecordingService {
        fn get_buyer<'a>(&'a self, uuid: &'a str) -> BridgeFuture<'a, Option<Buyer>> {
            Box::pin(async move {
                self.record(format!("get {uuid}"));
                if self.fail_get {
                    return Err(BridgeError::Status(500));
                }
                Ok(self.existing.clone())
            })
        }

        fn create_buyer<'a>(&'a self, uuid: &'a str, email: &'a str) -> BridgeFuture<'a, Buyer> {
            Box::pin(async move {
                self.record(format!("create {uuid} {email}"));
                Ok(Buyer {
                    uuid: uuid.to_string(),
                    email: Some(email.to_string()),
                    pin: false,
                    needs_pin_reset: false,
                    resource_pk: Some(1),
                })
            })
        }

        fn update_buyer<'a>(&'a self, buyer: &'a Buyer, email: &'a str) -> BridgeFuture<'a, ()> {
            Box::pin(async move {
                self.record(format!("update {} {email}", buyer.uuid));
                Ok(())
            })
        }
    }

    fn buyer(email: &str) -> Buyer {
        Buyer {
            uuid: "web.pay:abc".to_string(),
            email: Some(email.to_string()),
            pin: true,
            needs_pin_reset: true,
            resource_pk: Some(7),
        }
    }

    #[test]
    fn resolve_uuid_is_domain_scoped_and_stable() {
        let first = resolve_uuid("a@a.com", "web.pay");
        let second = resolve_uuid("a@a.com", "web.pay");
        assert_eq!(first, second);
        assert!(first.starts_with("web.pay:"));
        assert_eq!(first.len(), "web.pay:".len() + 64);
        assert_ne!(first, resolve_uuid("b@b.com", "web.pay"));
        assert_ne!(first, resolve_uuid("a@a.com", "other.pay"));
    }

    #[test]
    fn resolve_uuid_ignores_display_form() {
        assert_eq!(
            resolve_uuid(" A@A.com ", "web.pay"),
            resolve_uuid("a@a.com", "web.pay")
        );
    }

    #[test]
    fn valid_email_accepts_basic_format() {
        assert!(EMAIL_RE.is_some());
        assert!(valid_email("a@a.com"));
        assert!(!valid_email("not-an-email"));
        assert!(!valid_email("a b@a.com"));
    }

    #[tokio::test]
    async fn sync_buyer_creates_missing_buyer() -> Result<(), BridgeError> {
        let service = RecordingService::default();
        let record = sync_buyer(&service, "web.pay:abc", "a@a.com").await?;
        assert_eq!(record, BuyerRecord::default());
        assert_eq!(
            service.calls(),
            vec!["get web.pay:abc", "create web.pay:abc a@a.com"]
        );
        Ok(())
    }

    #[tokio::test]
    async fn sync_buyer_updates_changed_email() -> Result<(), BridgeError> {
        let service = RecordingService {
            existing: Some(buyer("old@a.com")),
            ..RecordingService::default()
        };
        let record = sync_buyer(&service, "web.pay:abc", "a@a.com").await?;
        assert!(record.pin_set);
        assert!(record.needs_pin_reset);
        assert_eq!(
            service.calls(),
            vec!["get web.pay:abc", "update web.pay:abc a@a.com"]
        );
        Ok(())
    }

    #[tokio::test]
    async fn sync_buyer_leaves_matching_email_alone() -> Result<(), BridgeError> {
        let service = RecordingService {
            existing: Some(buyer("a@a.com")),
            ..RecordingService::default()
        };
        sync_buyer(&service, "web.pay:abc", "a@a.com").await?;
        assert_eq!(service.calls(), vec!["get web.pay:abc"]);
        Ok(())
    }

    #[tokio::test]
    async fn sync_buyer_propagates_errors() {
        let service = RecordingService {
            fail_get: true,
            ..RecordingService::default()
        };
        let result = sync_buyer(&service, "web.pay:abc", "a@a.com").await;
        assert_eq!(result, Err(BridgeError::Status(500)));
    }
}
