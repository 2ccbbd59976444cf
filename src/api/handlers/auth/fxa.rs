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
    types::{ErrorResponse, FxaLoginRequest, FxaLoginResponse},
};

#[utoipa::path(
    post,
    path = "/v1/auth/fxa-login",
    request_body = FxaLoginRequest,
    responses(
        (status = 200, description = "Federated login completed", body = FxaLoginResponse),
        (status = 400, description = "Missing payload", body = ErrorResponse),
        (status = 403, description = "Authorization exchange failed", body = ErrorResponse),
        (status = 500, description = "Account service unavailable", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn fxa_login(
    headers: HeaderMap,
    auth_state: Extension<Arc<AuthState>>,
    payload: Option<Json<FxaLoginRequest>>,
) -> impl IntoResponse {
    let Some(Json(request)) = payload else {
        return missing_payload();
    };

    let mut client = match ClientSession::load(&headers, &auth_state).await {
        Ok(client) => client,
        Err(response) => return response,
    };

    let result = auth_state
        .service()
        .federated_login(&mut client.session, &request.state, &request.auth_response)
        .await;

    let response_headers = match client.persist(&auth_state).await {
        Ok(response_headers) => response_headers,
        Err(response) => return response,
    };

    match result {
        Ok(user_email) => (
            StatusCode::OK,
            response_headers,
            Json(FxaLoginResponse { user_email }),
        )
            .into_response(),
        Err(err) => (response_headers, error_response(&err)).into_response(),
    }
}
