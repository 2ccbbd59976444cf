//! Session orchestration for assertion, re-verification and federated login.
//!
//! Every operation works on a session loaded for the current request. Remote
//! calls run in order (verify, resolve/sync, import) and nothing is written to
//! the session until the fatal steps succeeded, so an aborted operation leaves
//! the session as it found it. The single exception is a failed verification,
//! which clears the identity on purpose.

use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::{
    bridge::{BuyerService, resolve_uuid, sync_buyer},
    config::AuthConfig,
    error::AuthError,
    federated::FxaAuthorizer,
    permissions::{PermissionImporter, PermissionSource},
    verifier::{IdentityVerifier, VerificationResult},
};
use crate::session::Session;

/// Identity established by verify or reverify.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VerifiedUser {
    pub user_hash: String,
    pub user_email: String,
}

pub struct AuthService {
    config: AuthConfig,
    verifier: Arc<dyn IdentityVerifier>,
    buyers: Arc<dyn BuyerService>,
    permissions: PermissionImporter,
    fxa: Arc<dyn FxaAuthorizer>,
}

impl AuthService {
    #[must_use]
    pub fn new(
        config: AuthConfig,
        verifier: Arc<dyn IdentityVerifier>,
        buyers: Arc<dyn BuyerService>,
        permission_source: Arc<dyn PermissionSource>,
        fxa: Arc<dyn FxaAuthorizer>,
    ) -> Self {
        let permissions =
            PermissionImporter::new(config.allow_admin_simulations(), permission_source);
        Self {
            config,
            verifier,
            buyers,
            permissions,
            fxa,
        }
    }

    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Verify an assertion and bind its identity to the session.
    ///
    /// # Errors
    /// `VerificationFailed` (identity cleared from the session) or `Bridge`
    /// (session untouched).
    #[instrument(skip_all)]
    pub async fn verify(
        &self,
        session: &mut Session,
        assertion: &str,
    ) -> Result<VerifiedUser, AuthError> {
        let email = self.verify_assertion(session, assertion).await?;
        let uuid = resolve_uuid(&email, self.config.domain());
        let buyer = sync_buyer(self.buyers.as_ref(), &uuid, &email).await?;
        let permissions = self.permissions.import_permissions(&uuid).await;

        session.set_identity(uuid.clone(), email.clone(), &buyer);
        session.mkt_permissions = permissions;

        info!("Verified {uuid}");

        Ok(VerifiedUser {
            user_hash: uuid,
            user_email: email,
        })
    }

    /// Re-prove the identity of an authenticated session.
    ///
    /// # Errors
    /// `VerificationFailed` (identity cleared), `AccountMismatch` when the
    /// assertion belongs to another account or the session is anonymous, or
    /// `Bridge`. The last two leave the session untouched.
    #[instrument(skip_all)]
    pub async fn reverify(
        &self,
        session: &mut Session,
        assertion: &str,
    ) -> Result<VerifiedUser, AuthError> {
        let email = self.verify_assertion(session, assertion).await?;
        let uuid = resolve_uuid(&email, self.config.domain());

        if session.uuid.as_deref() != Some(uuid.as_str()) {
            warn!(
                "Reverify resolved {uuid}, session holds {}",
                session.uuid.as_deref().unwrap_or("nothing")
            );
            return Err(AuthError::AccountMismatch);
        }

        let buyer = sync_buyer(self.buyers.as_ref(), &uuid, &email).await?;
        let permissions = self.permissions.import_permissions(&uuid).await;

        session.set_identity(uuid.clone(), email.clone(), &buyer);
        session.was_reverified = Some(true);
        session.mkt_permissions = permissions;

        info!("Reverified {uuid}");

        Ok(VerifiedUser {
            user_hash: uuid,
            user_email: email,
        })
    }

    /// Log in through the federated authorization exchange.
    ///
    /// Returns the authorized email.
    ///
    /// # Errors
    /// `Exchange` or `Bridge`; neither touches the session.
    #[instrument(skip_all)]
    pub async fn federated_login(
        &self,
        session: &mut Session,
        state: &str,
        auth_response: &str,
    ) -> Result<String, AuthError> {
        let email = match self.fxa.authorize(state, auth_response).await {
            Ok(email) => email,
            Err(err) => {
                warn!("Federated exchange failed: {err}");
                return Err(err.into());
            }
        };
        let uuid = resolve_uuid(&email, self.config.domain());
        let buyer = sync_buyer(self.buyers.as_ref(), &uuid, &email).await?;

        session.set_identity(uuid.clone(), email.clone(), &buyer);
        session.was_reverified = Some(true);
        session.super_powers = Some(self.config.has_super_powers(&email));

        info!("Federated login for {uuid}");

        Ok(email)
    }

    /// Forget the logged in user and the markers it earned. Idempotent.
    pub fn reset_user(&self, session: &mut Session) {
        session.clear_identity();
    }

    async fn verify_assertion(
        &self,
        session: &mut Session,
        assertion: &str,
    ) -> Result<String, AuthError> {
        match self.verifier.verify(assertion, self.config.audience()).await {
            VerificationResult::Verified { email } => Ok(email),
            VerificationResult::Failed => {
                session.clear_identity();
                Err(AuthError::VerificationFailed)
            }
        }
    }
}
