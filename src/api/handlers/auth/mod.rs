//! Auth handlers.
//!
//! Each handler loads the caller's session, hands it to
//! [`crate::auth::AuthService`] and persists the result. Clients without a
//! session only get a cookie once something worth keeping was written.

pub(crate) mod fxa;
pub(crate) mod reset;
pub(crate) mod session;
mod state;
pub(crate) mod types;
pub(crate) mod verify;

pub use state::AuthState;

use axum::{
    Json,
    response::{IntoResponse, Response},
};

use crate::auth::AuthError;
use types::ErrorResponse;

fn error_response(err: &AuthError) -> Response {
    let (errno, message) = match err {
        AuthError::Exchange(exchange) => (exchange.errno(), exchange.detail()),
        _ => (None, None),
    };
    (
        err.status(),
        Json(ErrorResponse {
            error: err.public_message(),
            errno,
            message,
        }),
    )
        .into_response()
}

fn missing_payload() -> Response {
    (
        axum::http::StatusCode::BAD_REQUEST,
        Json(ErrorResponse::new("Missing payload")),
    )
        .into_response()
}
