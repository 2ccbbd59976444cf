//! Buyer authentication.
//!
//! [`AuthService`] coordinates three collaborators reached through trait
//! seams: an [`IdentityVerifier`] for assertions, a [`BuyerService`] holding
//! buyer records and a [`PermissionSource`] for marketplace permissions. The
//! federated login path swaps the verifier for an [`FxaAuthorizer`].
//!
//! ## Identifier stability
//!
//! [`resolve_uuid`] is a pure function of the normalized email and the
//! deployment domain. Re-verification compares identifiers, so it must never
//! depend on hidden state.

pub mod bridge;
mod config;
mod error;
pub mod federated;
pub mod permissions;
mod service;
pub mod verifier;

pub use bridge::{BridgeError, Buyer, BuyerRecord, BuyerService, resolve_uuid, sync_buyer};
pub use config::AuthConfig;
pub use error::AuthError;
pub use federated::{ExchangeError, FxaAuthorizer, RemoteError};
pub use permissions::{PermissionImporter, PermissionSet, PermissionSource};
pub use service::{AuthService, VerifiedUser};
pub use verifier::{IdentityVerifier, VerificationResult};

#[cfg(test)]
pub(crate) mod testing;
