//! Assertion verification endpoints.

use axum::{
    Json,
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use std::sync::Arc;

use super::{
    error_response, missing_payload,
    session::ClientSession,
    state::AuthState,
    types::{ErrorResponse, VerifyRequest, VerifyResponse},
};

#[derive(Clone, Copy, Debug)]
enum Mode {
    Verify,
    Reverify,
}

#[utoipa::path(
    post,
    path = "/v1/auth/verify",
    request_body = VerifyRequest,
    responses(
        (status = 200, description = "Assertion verified, identity bound to the session", body = VerifyResponse),
        (status = 400, description = "Missing payload or bad verification", body = ErrorResponse),
        (status = 500, description = "Account service unavailable", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn verify(
    headers: HeaderMap,
    auth_state: Extension<Arc<AuthState>>,
    payload: Option<Json<VerifyRequest>>,
) -> impl IntoResponse {
    handle(Mode::Verify, &headers, &auth_state, payload).await
}

#[utoipa::path(
    post,
    path = "/v1/auth/reverify",
    request_body = VerifyRequest,
    responses(
        (status = 200, description = "Identity re-proven for the same account", body = VerifyResponse),
        (status = 400, description = "Missing payload, bad verification or mismatched account", body = ErrorResponse),
        (status = 500, description = "Account service unavailable", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn reverify(
    headers: HeaderMap,
    auth_state: Extension<Arc<AuthState>>,
    payload: Option<Json<VerifyRequest>>,
) -> impl IntoResponse {
    handle(Mode::Reverify, &headers, &auth_state, payload).await
}

async fn handle(
    mode: Mode,
    headers: &HeaderMap,
    auth_state: &AuthState,
    payload: Option<Json<VerifyRequest>>,
) -> axum::response::Response {
    let Some(Json(request)) = payload else {
        return missing_payload();
    };

    let mut client = match ClientSession::load(headers, auth_state).await {
        Ok(client) => client,
        Err(response) => return response,
    };

    let service = auth_state.service();
    let result = match mode {
        Mode::Verify => service.verify(&mut client.session, &request.assertion).await,
        Mode::Reverify => service.reverify(&mut client.session, &request.assertion).await,
    };

    // Failed operations either cleared the identity or left the session as
    // loaded, so persisting is always safe.
    let response_headers = match client.persist(auth_state).await {
        Ok(response_headers) => response_headers,
        Err(response) => return response,
    };

    match result {
        Ok(user) => (
            StatusCode::OK,
            response_headers,
            Json(VerifyResponse {
                user_hash: user.user_hash,
                user_email: user.user_email,
            }),
        )
            .into_response(),
        Err(err) => (response_headers, error_response(&err)).into_response(),
    }
}
