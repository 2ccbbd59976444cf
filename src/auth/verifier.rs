//! Identity assertion verification seam.

use std::{future::Future, pin::Pin};

/// Outcome of checking one assertion. Never persisted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VerificationResult {
    Verified { email: String },
    Failed,
}

/// Backend that proves an assertion and returns the asserted email.
///
/// Implementations normalize every error (malformed input, rejection,
/// transport failure) to [`VerificationResult::Failed`].
pub trait IdentityVerifier: Send + Sync {
    fn verify<'a>(
        &'a self,
        assertion: &'a str,
        audience: &'a str,
    ) -> Pin<Box<dyn Future<Output = VerificationResult> + Send + 'a>>;
}
