//! Session cookie handling and the session introspection endpoint.

use axum::{
    Json,
    extract::Extension,
    http::{
        HeaderMap, HeaderValue, StatusCode,
        header::{AUTHORIZATION, COOKIE, InvalidHeaderValue, SET_COOKIE},
    },
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::{debug, error};

use super::{
    state::AuthState,
    types::{ErrorResponse, SessionResponse},
};
use crate::session::{Session, generate_session_token};

pub(crate) const SESSION_COOKIE_NAME: &str = "webpay_session";

/// Session loaded for one request, plus the token it was stored under.
///
/// `token` is `None` for clients without a live session; a token that no
/// longer resolves is dropped so a fresh one gets issued.
pub(crate) struct ClientSession {
    token: Option<String>,
    pub(crate) session: Session,
}

impl ClientSession {
    pub(crate) async fn load(
        headers: &HeaderMap,
        auth_state: &AuthState,
    ) -> Result<Self, Response> {
        let Some(token) = extract_session_token(headers) else {
            return Ok(Self::anonymous());
        };
        match auth_state.sessions().load(&token).await {
            Ok(Some(session)) => Ok(Self {
                token: Some(token),
                session,
            }),
            Ok(None) => {
                debug!("Unknown session token, starting a new session");
                Ok(Self::anonymous())
            }
            Err(err) => {
                error!("Failed to load session: {err:#}");
                Err(store_failure())
            }
        }
    }

    fn anonymous() -> Self {
        Self {
            token: None,
            session: Session::default(),
        }
    }

    /// Write the session back and return the headers to attach.
    ///
    /// A `Set-Cookie` header is only produced when a new token was issued.
    pub(crate) async fn persist(self, auth_state: &AuthState) -> Result<HeaderMap, Response> {
        let mut headers = HeaderMap::new();
        let result = match self.token {
            Some(token) => auth_state.sessions().save(&token, self.session).await,
            None if self.session.is_empty() => Ok(()),
            None => {
                let token = generate_session_token().map_err(|err| {
                    error!("Failed to generate session token: {err:#}");
                    store_failure()
                })?;
                let cookie = session_cookie(auth_state, &token).map_err(|err| {
                    error!("Failed to build session cookie: {err}");
                    store_failure()
                })?;
                headers.insert(SET_COOKIE, cookie);
                auth_state.sessions().save(&token, self.session).await
            }
        };

        result.map_err(|err| {
            error!("Failed to save session: {err:#}");
            store_failure()
        })?;
        Ok(headers)
    }
}

fn store_failure() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse::new("session unavailable")),
    )
        .into_response()
}

#[utoipa::path(
    get,
    path = "/v1/auth/session",
    responses(
        (status = 200, description = "Session is authenticated", body = SessionResponse),
        (status = 204, description = "No authenticated session")
    ),
    tag = "auth"
)]
pub async fn session(
    headers: HeaderMap,
    auth_state: Extension<Arc<AuthState>>,
) -> impl IntoResponse {
    let client = match ClientSession::load(&headers, &auth_state).await {
        Ok(client) => client,
        Err(response) => return response,
    };
    let Session {
        uuid: Some(user_hash),
        logged_in_user: Some(user_email),
        was_reverified,
        super_powers,
        ..
    } = client.session
    else {
        return StatusCode::NO_CONTENT.into_response();
    };

    let response = SessionResponse {
        user_hash,
        user_email,
        was_reverified: was_reverified.unwrap_or(false),
        super_powers: super_powers.unwrap_or(false),
    };
    (StatusCode::OK, Json(response)).into_response()
}

/// Build an `HttpOnly` cookie for the session token.
pub(super) fn session_cookie(
    auth_state: &AuthState,
    token: &str,
) -> Result<HeaderValue, InvalidHeaderValue> {
    let ttl_seconds = auth_state.config().session_ttl_seconds();
    // Only mark cookies secure when the site is served over HTTPS.
    let secure = auth_state.config().session_cookie_secure();
    let mut cookie = format!(
        "{SESSION_COOKIE_NAME}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={ttl_seconds}"
    );
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

pub(crate) fn extract_session_token(headers: &HeaderMap) -> Option<String> {
    if let Some(token) = extract_bearer_token(headers) {
        return Some(token);
    }
    let value = headers.get(COOKIE)?.to_str().ok()?;
    value.split(';').find_map(|pair| {
        let (key, val) = pair.trim().split_once('=')?;
        let val = val.trim();
        (key.trim() == SESSION_COOKIE_NAME && !val.is_empty()).then(|| val.to_string())
    })
}

fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let trimmed = value.trim();
    let token = trimmed
        .strip_prefix("Bearer ")
        .or_else(|| trimmed.strip_prefix("bearer "))?
        .trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}
