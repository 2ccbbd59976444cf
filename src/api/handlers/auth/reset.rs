use axum::{
    Json,
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use std::sync::Arc;

use super::{session::ClientSession, state::AuthState, types::ResetUserResponse};

#[utoipa::path(
    post,
    path = "/v1/auth/reset-user",
    responses(
        (status = 200, description = "Identity removed from the session", body = ResetUserResponse)
    ),
    tag = "auth"
)]
pub async fn reset_user(
    headers: HeaderMap,
    auth_state: Extension<Arc<AuthState>>,
) -> impl IntoResponse {
    let mut client = match ClientSession::load(&headers, &auth_state).await {
        Ok(client) => client,
        Err(response) => return response,
    };

    auth_state.service().reset_user(&mut client.session);

    match client.persist(&auth_state).await {
        Ok(response_headers) => (
            StatusCode::OK,
            response_headers,
            Json(ResetUserResponse::default()),
        )
            .into_response(),
        Err(response) => response,
    }
}
