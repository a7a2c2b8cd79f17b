//! Admin login endpoint.
//!
//! Flow Overview:
//! 1) Count the attempt against the client address before anything else.
//! 2) Reject malformed bodies and out-of-range input without hashing.
//! 3) Verify the password on the blocking pool.
//! 4) On success issue the session cookie and forget earlier failures.
//!
//! Every failure answers 401 `{"success":false}`; only the logs tell them apart.

use axum::{
    Json,
    extract::{Extension, rejection::JsonRejection},
    http::{HeaderMap, StatusCode, header::SET_COOKIE},
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};

use super::{
    session::set_session_cookie,
    state::AuthState,
    types::{LoginRequest, LoginResponse},
    utils::{audit_username, extract_client_ip, valid_login_input},
};

#[derive(Debug, Error)]
enum LoginFailure {
    #[error("rate limited")]
    RateLimited,
    #[error("malformed request body")]
    MalformedBody(#[from] JsonRejection),
    #[error("username or password out of bounds")]
    InvalidInput,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("internal error: {0}")]
    Internal(String),
}

impl LoginFailure {
    const fn audit_action(&self) -> &'static str {
        match self {
            Self::RateLimited => "login.rate_limited",
            _ => "login.failed",
        }
    }
}

impl IntoResponse for LoginFailure {
    fn into_response(self) -> Response {
        (
            StatusCode::UNAUTHORIZED,
            Json(LoginResponse { success: false }),
        )
            .into_response()
    }
}

#[utoipa::path(
    post,
    path = "/api/admin/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in, session cookie set", body = LoginResponse),
        (status = 401, description = "Login rejected", body = LoginResponse)
    ),
    tag = "auth"
)]
pub async fn login(
    headers: HeaderMap,
    auth_state: Extension<Arc<AuthState>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Response {
    let client_ip = extract_client_ip(&headers);
    let username = payload
        .as_ref()
        .map_or_else(|_| "-".to_string(), |Json(request)| audit_username(&request.username));

    match authenticate(&auth_state, &client_ip, payload).await {
        Ok(response) => {
            info!(
                target: "audit",
                action = "login.success",
                client_ip = %client_ip,
                username = %username,
            );
            response
        }
        Err(failure) => {
            warn!(
                target: "audit",
                action = failure.audit_action(),
                client_ip = %client_ip,
                username = %username,
                reason = %failure,
            );
            failure.into_response()
        }
    }
}

async fn authenticate(
    auth_state: &Arc<AuthState>,
    client_ip: &str,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Response, LoginFailure> {
    if auth_state.rate_limiter().check(client_ip).is_limited() {
        return Err(LoginFailure::RateLimited);
    }

    let Json(request) = payload?;
    if !valid_login_input(&request.username, &request.password) {
        return Err(LoginFailure::InvalidInput);
    }

    let state = Arc::clone(auth_state);
    let username = request.username;
    let password = request.password;
    let (username, valid) = tokio::task::spawn_blocking(move || {
        let valid = state.credentials().validate(&username, &password);
        (username, valid)
    })
    .await
    .map_err(|err| {
        error!("Credential validation task failed: {err}");
        LoginFailure::Internal(err.to_string())
    })?;

    if !valid {
        return Err(LoginFailure::InvalidCredentials);
    }

    let cookie = set_session_cookie(auth_state, &username).map_err(|err| {
        error!("Failed to issue session cookie: {err}");
        LoginFailure::Internal(err.to_string())
    })?;

    auth_state.rate_limiter().reset(client_ip);

    let mut response_headers = HeaderMap::new();
    response_headers.insert(SET_COOKIE, cookie);
    Ok((
        StatusCode::OK,
        response_headers,
        Json(LoginResponse { success: true }),
    )
        .into_response())
}
