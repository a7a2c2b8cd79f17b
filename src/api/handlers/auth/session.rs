//! Session cookie handling and the session/logout endpoints.

use axum::{
    Json,
    extract::Extension,
    http::{
        HeaderMap, HeaderValue, StatusCode,
        header::{COOKIE, InvalidHeaderValue, SET_COOKIE},
    },
    response::IntoResponse,
};
use std::sync::Arc;
use tracing::{error, info};

use super::{
    state::{AuthConfig, AuthState},
    token::SessionPayload,
    types::{LoginResponse, SessionResponse},
    utils::extract_client_ip,
};

pub const SESSION_COOKIE_NAME: &str = "pos_session";

#[utoipa::path(
    get,
    path = "/api/admin/session",
    responses(
        (status = 200, description = "Session is active", body = SessionResponse),
        (status = 401, description = "No valid session", body = SessionResponse)
    ),
    tag = "auth"
)]
pub async fn session(
    headers: HeaderMap,
    auth_state: Extension<Arc<AuthState>>,
) -> impl IntoResponse {
    match get_session(&auth_state, &headers) {
        Some(payload) => (
            StatusCode::OK,
            Json(SessionResponse {
                authenticated: true,
                username: Some(payload.username),
                expires_at: Some(payload.expires_at),
            }),
        ),
        None => (
            StatusCode::UNAUTHORIZED,
            Json(SessionResponse {
                authenticated: false,
                username: None,
                expires_at: None,
            }),
        ),
    }
}

#[utoipa::path(
    post,
    path = "/api/admin/logout",
    responses(
        (status = 200, description = "Session cookie cleared", body = LoginResponse)
    ),
    tag = "auth"
)]
pub async fn logout(
    headers: HeaderMap,
    auth_state: Extension<Arc<AuthState>>,
) -> impl IntoResponse {
    let client_ip = extract_client_ip(&headers);
    let username = get_session(&auth_state, &headers).map(|payload| payload.username);
    info!(
        target: "audit",
        action = "logout",
        client_ip = %client_ip,
        username = username.as_deref().unwrap_or("-"),
    );

    // Always clear the cookie, even without a valid session.
    let mut response_headers = HeaderMap::new();
    match clear_session_cookie(auth_state.config()) {
        Ok(cookie) => {
            response_headers.insert(SET_COOKIE, cookie);
        }
        Err(err) => error!("Failed to build session cookie: {err}"),
    }
    (
        StatusCode::OK,
        response_headers,
        Json(LoginResponse { success: true }),
    )
}

/// Issue a fresh token for `username` and wrap it in a `Set-Cookie` value.
///
/// # Errors
/// Fails when no session secret is configured or the cookie is not a valid header.
pub(crate) fn set_session_cookie(
    auth_state: &AuthState,
    username: &str,
) -> anyhow::Result<HeaderValue> {
    let token = auth_state.codec().create(username)?;
    Ok(session_cookie(auth_state.config(), &token)?)
}

pub(crate) fn session_cookie(
    config: &AuthConfig,
    token: &str,
) -> Result<HeaderValue, InvalidHeaderValue> {
    let max_age = config.session_ttl().as_secs();
    let mut cookie = format!(
        "{SESSION_COOKIE_NAME}={token}; Path=/; HttpOnly; SameSite=Strict; Max-Age={max_age}"
    );
    if config.session_cookie_secure() {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

pub(crate) fn clear_session_cookie(config: &AuthConfig) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie =
        format!("{SESSION_COOKIE_NAME}=; Path=/; HttpOnly; SameSite=Strict; Max-Age=0");
    if config.session_cookie_secure() {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

/// Read the raw `pos_session` value from the `Cookie` header, if any.
pub(crate) fn extract_session_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .find_map(|pair| {
            let (key, val) = pair.trim().split_once('=')?;
            (key.trim() == SESSION_COOKIE_NAME).then(|| val.trim().to_string())
        })
}

/// Resolve the session cookie into a verified payload.
#[must_use]
pub fn get_session(auth_state: &AuthState, headers: &HeaderMap) -> Option<SessionPayload> {
    let token = extract_session_token(headers)?;
    auth_state.codec().verify(&token)
}

/// Compare visitor input to the configured admin keyword.
///
/// Plain equality after trimming; this only hides the login form.
#[must_use]
pub fn check_admin_keyword(config: &AuthConfig, input: &str) -> bool {
    config
        .admin_keyword()
        .is_some_and(|keyword| !keyword.is_empty() && input.trim() == keyword)
}

#[cfg(test)]
mod tests {
    use super::super::credentials::tests::USERNAME;
    use super::super::state::DEFAULT_SITE_URL;
    use super::*;
    use anyhow::{Context, Result};
    use secrecy::SecretString;

    fn config(site_url: &str) -> AuthConfig {
        AuthConfig::new(site_url.to_string())
            .with_session_secret(Some(SecretString::from("cookie-secret".to_string())))
            .with_admin_keyword(Some("open-sesame".to_string()))
    }

    fn cookie_headers(value: &str) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_str(value)?);
        Ok(headers)
    }

    #[test]
    fn session_cookie_attributes_in_development() -> Result<()> {
        let cookie = session_cookie(&config(DEFAULT_SITE_URL), "abc.def")?;
        assert_eq!(
            cookie.to_str()?,
            "pos_session=abc.def; Path=/; HttpOnly; SameSite=Strict; Max-Age=7200"
        );
        Ok(())
    }

    #[test]
    fn session_cookie_is_secure_over_https() -> Result<()> {
        let config = config("https://portfolio.example").with_session_expiry_hours(1);
        let cookie = session_cookie(&config, "abc.def")?;
        assert_eq!(
            cookie.to_str()?,
            "pos_session=abc.def; Path=/; HttpOnly; SameSite=Strict; Max-Age=3600; Secure"
        );

        let cleared = clear_session_cookie(&config)?;
        assert_eq!(
            cleared.to_str()?,
            "pos_session=; Path=/; HttpOnly; SameSite=Strict; Max-Age=0; Secure"
        );
        Ok(())
    }

    #[test]
    fn extract_session_token_finds_named_cookie() -> Result<()> {
        let headers = cookie_headers("theme=dark; pos_session=abc.def ; lang=en")?;
        assert_eq!(extract_session_token(&headers).as_deref(), Some("abc.def"));

        let headers = cookie_headers("theme=dark")?;
        assert_eq!(extract_session_token(&headers), None);
        assert_eq!(extract_session_token(&HeaderMap::new()), None);
        Ok(())
    }

    #[test]
    fn get_session_verifies_the_cookie() -> Result<()> {
        let state = AuthState::with_memory_rate_limiter(config(DEFAULT_SITE_URL));
        let cookie = set_session_cookie(&state, USERNAME)?;
        let pair = cookie
            .to_str()?
            .split(';')
            .next()
            .context("cookie pair")?
            .to_string();

        let payload = get_session(&state, &cookie_headers(&pair)?);
        assert_eq!(payload.map(|p| p.username).as_deref(), Some(USERNAME));

        assert!(get_session(&state, &cookie_headers("pos_session=forged.token")?).is_none());
        assert!(get_session(&state, &HeaderMap::new()).is_none());
        Ok(())
    }

    #[test]
    fn set_session_cookie_needs_a_secret() {
        let state = AuthState::with_memory_rate_limiter(AuthConfig::new(
            DEFAULT_SITE_URL.to_string(),
        ));
        assert!(set_session_cookie(&state, USERNAME).is_err());
    }

    #[test]
    fn admin_keyword_is_exact_after_trim() {
        let config = config(DEFAULT_SITE_URL);
        assert!(check_admin_keyword(&config, "open-sesame"));
        assert!(check_admin_keyword(&config, "  open-sesame\n"));
        assert!(!check_admin_keyword(&config, "Open-Sesame"));
        assert!(!check_admin_keyword(&config, "open-sesame!"));
        assert!(!check_admin_keyword(&config, "open-"));
        assert!(!check_admin_keyword(&config, "open-sesam"));
        assert!(!check_admin_keyword(&config, ""));
    }

    #[test]
    fn missing_keyword_never_matches() {
        let config = AuthConfig::new(DEFAULT_SITE_URL.to_string());
        assert!(!check_admin_keyword(&config, ""));
        assert!(!check_admin_keyword(&config, "anything"));

        let config = config.with_admin_keyword(Some(String::new()));
        assert!(!check_admin_keyword(&config, ""));
    }
}
