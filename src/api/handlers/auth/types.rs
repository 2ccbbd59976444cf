use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct VerifyRequest {
    pub assertion: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct VerifyResponse {
    pub user_hash: String,
    pub user_email: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct FxaLoginRequest {
    /// State value issued when the authorization flow started.
    pub state: String,
    /// Redirect URL (or its query string) returned by the authorization server.
    pub auth_response: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct FxaLoginResponse {
    pub user_email: String,
}

/// Always serialized as `{}`.
#[derive(ToSchema, Serialize, Deserialize, Debug, Default)]
pub struct ResetUserResponse {}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct SessionResponse {
    pub user_hash: String,
    pub user_email: String,
    #[serde(default)]
    pub was_reverified: bool,
    #[serde(default)]
    pub super_powers: bool,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errno: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: &str) -> Self {
        Self {
            error: error.to_string(),
            errno: None,
            message: None,
        }
    }
}
