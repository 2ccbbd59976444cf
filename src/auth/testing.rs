//! Deterministic in-process collaborators for auth tests.

use anyhow::{Result, anyhow};
use std::{
    collections::HashMap,
    future::Future,
    pin::Pin,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
};

use super::{
    AuthConfig, AuthService, BridgeError, Buyer, BuyerService, ExchangeError, FxaAuthorizer,
    IdentityVerifier, PermissionSet, PermissionSource, VerificationResult,
    bridge::BridgeFuture, federated::ExchangeFuture,
};

/// Accepts the assertions it was told about, fails everything else.
#[derive(Default)]
pub(crate) struct FakeVerifier {
    assertions: Mutex<HashMap<String, String>>,
    audiences: Mutex<Vec<String>>,
}

impl FakeVerifier {
    pub(crate) fn accept(&self, assertion: &str, email: &str) {
        if let Ok(mut assertions) = self.assertions.lock() {
            assertions.insert(assertion.to_string(), email.to_string());
        }
    }

    pub(crate) fn audiences(&self) -> Vec<String> {
        self.audiences
            .lock()
            .map(|audiences| audiences.clone())
            .unwrap_or_default()
    }
}

impl IdentityVerifier for FakeVerifier {
    fn verify<'a>(
        &'a self,
        assertion: &'a str,
        audience: &'a str,
    ) -> Pin<Box<dyn Future<Output = VerificationResult> + Send + 'a>> {
        Box::pin(async move {
            if let Ok(mut audiences) = self.audiences.lock() {
                audiences.push(audience.to_string());
            }
            self.assertions
                .lock()
                .ok()
                .and_then(|assertions| assertions.get(assertion).cloned())
                .map_or(VerificationResult::Failed, |email| {
                    VerificationResult::Verified { email }
                })
        })
    }
}

/// In-memory buyer service recording email updates.
#[derive(Default)]
pub(crate) struct FakeBuyers {
    buyers: Mutex<HashMap<String, Buyer>>,
    updates: Mutex<Vec<(String, String)>>,
    fail: AtomicBool,
}

impl FakeBuyers {
    pub(crate) fn insert(&self, buyer: Buyer) {
        if let Ok(mut buyers) = self.buyers.lock() {
            buyers.insert(buyer.uuid.clone(), buyer);
        }
    }

    pub(crate) fn get(&self, uuid: &str) -> Option<Buyer> {
        self.buyers
            .lock()
            .ok()
            .and_then(|buyers| buyers.get(uuid).cloned())
    }

    pub(crate) fn updates(&self) -> Vec<(String, String)> {
        self.updates
            .lock()
            .map(|updates| updates.clone())
            .unwrap_or_default()
    }

    pub(crate) fn fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), BridgeError> {
        if self.fail.load(Ordering::SeqCst) {
            Err(BridgeError::Status(503))
        } else {
            Ok(())
        }
    }
}

impl BuyerService for FakeBuyers {
    fn get_buyer<'a>(&'a self, uuid: &'a str) -> BridgeFuture<'a, Option<Buyer>> {
        Box::pin(async move {
            self.check()?;
            Ok(self.get(uuid))
        })
    }

    fn create_buyer<'a>(&'a self, uuid: &'a str, email: &'a str) -> BridgeFuture<'a, Buyer> {
        Box::pin(async move {
            self.check()?;
            let buyer = Buyer {
                uuid: uuid.to_string(),
                email: Some(email.to_string()),
                pin: false,
                needs_pin_reset: false,
                resource_pk: None,
            };
            self.insert(buyer.clone());
            Ok(buyer)
        })
    }

    fn update_buyer<'a>(&'a self, buyer: &'a Buyer, email: &'a str) -> BridgeFuture<'a, ()> {
        Box::pin(async move {
            self.check()?;
            if let Ok(mut updates) = self.updates.lock() {
                updates.push((buyer.uuid.clone(), email.to_string()));
            }
            self.insert(Buyer {
                email: Some(email.to_string()),
                ..buyer.clone()
            });
            Ok(())
        })
    }
}

/// Marketplace returning a fixed permission set, or failing when unset.
#[derive(Default)]
pub(crate) struct FakePermissions {
    permissions: Mutex<Option<PermissionSet>>,
    calls: AtomicUsize,
}

impl FakePermissions {
    pub(crate) fn set(&self, permissions: Option<PermissionSet>) {
        if let Ok(mut current) = self.permissions.lock() {
            *current = permissions;
        }
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl PermissionSource for FakePermissions {
    fn fetch_permissions<'a>(
        &'a self,
        _uuid: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<PermissionSet>> + Send + 'a>> {
        Box::pin(async move {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.permissions
                .lock()
                .ok()
                .and_then(|permissions| permissions.clone())
                .ok_or_else(|| anyhow!("marketplace unavailable"))
        })
    }
}

/// Authorization server answering every exchange with a fixed outcome.
pub(crate) struct FakeFxa {
    outcome: Mutex<Result<String, ExchangeError>>,
}

impl Default for FakeFxa {
    fn default() -> Self {
        Self {
            outcome: Mutex::new(Ok("fxa@example.com".to_string())),
        }
    }
}

impl FakeFxa {
    pub(crate) fn respond(&self, outcome: Result<String, ExchangeError>) {
        if let Ok(mut current) = self.outcome.lock() {
            *current = outcome;
        }
    }
}

impl FxaAuthorizer for FakeFxa {
    fn authorize<'a>(&'a self, _state: &'a str, _auth_response: &'a str) -> ExchangeFuture<'a> {
        Box::pin(async move {
            self.outcome
                .lock()
                .map_err(|_| ExchangeError::Unavailable("poisoned".to_string()))?
                .clone()
        })
    }
}

/// Handles to every fake so tests can program and inspect them.
#[derive(Default, Clone)]
pub(crate) struct Fakes {
    pub(crate) verifier: Arc<FakeVerifier>,
    pub(crate) buyers: Arc<FakeBuyers>,
    pub(crate) permissions: Arc<FakePermissions>,
    pub(crate) fxa: Arc<FakeFxa>,
}

impl Fakes {
    pub(crate) fn service(&self, config: AuthConfig) -> AuthService {
        AuthService::new(
            config,
            self.verifier.clone(),
            self.buyers.clone(),
            self.permissions.clone(),
            self.fxa.clone(),
        )
    }
}

pub(crate) fn config() -> AuthConfig {
    AuthConfig::new("web.pay".to_string())
}
