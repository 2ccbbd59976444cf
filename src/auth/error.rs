use axum::http::StatusCode;
use thiserror::Error;

use super::{bridge::BridgeError, federated::ExchangeError};

/// Failures of an auth operation that reach the caller.
///
/// Permission import problems are not listed: they degrade to "no
/// permissions" inside the importer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("bad verification")]
    VerificationFailed,
    #[error("mismatched account")]
    AccountMismatch,
    #[error(transparent)]
    Bridge(#[from] BridgeError),
    #[error(transparent)]
    Exchange(#[from] ExchangeError),
}

impl AuthError {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::VerificationFailed | Self::AccountMismatch => StatusCode::BAD_REQUEST,
            Self::Bridge(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Exchange(_) => StatusCode::FORBIDDEN,
        }
    }

    /// Message returned to clients; remote details stay in the logs.
    #[must_use]
    pub fn public_message(&self) -> String {
        match self {
            Self::Bridge(_) => "account service unavailable".to_string(),
            Self::Exchange(_) => "authorization failed".to_string(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::federated::RemoteError;

    #[test]
    fn auth_error_maps_status() {
        assert_eq!(
            AuthError::VerificationFailed.status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(AuthError::AccountMismatch.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AuthError::from(BridgeError::Status(503)).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AuthError::from(ExchangeError::Remote(RemoteError::default())).status(),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn bridge_detail_is_not_public() {
        let err = AuthError::from(BridgeError::Unavailable("10.0.0.3 refused".to_string()));
        assert_eq!(err.public_message(), "account service unavailable");
        assert!(err.to_string().contains("10.0.0.3"));
    }
}
