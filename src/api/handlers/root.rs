//! Page placeholders. The real front ends are served elsewhere; these exist so
//! the gate and the session check have something to guard.

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};

use super::auth::AdminSession;

pub async fn root() -> impl IntoResponse {
    Html(concat!(
        "<!doctype html><title>Portfolio OS</title><main id=\"terminal\">",
        env!("CARGO_PKG_NAME"),
        " ",
        env!("CARGO_PKG_VERSION"),
        "</main>"
    ))
}

/// Admin shell. A cookie that passed the gate but fails verification is
/// treated like no cookie at all.
pub async fn admin(session: Result<AdminSession, StatusCode>) -> Response {
    match session {
        Ok(AdminSession(payload)) => Html(format!(
            "<!doctype html><title>Portfolio OS admin</title><main id=\"admin\" data-user=\"{}\"></main>",
            escape_attribute(&payload.username)
        ))
        .into_response(),
        Err(_) => Redirect::temporary("/").into_response(),
    }
}

pub async fn not_found() -> impl IntoResponse {
    StatusCode::NOT_FOUND
}

fn escape_attribute(value: &str) -> String {
    value
        .chars()
        .map(|c| match c {
            '&' => "&amp;".to_string(),
            '"' => "&quot;".to_string(),
            '<' => "&lt;".to_string(),
            '>' => "&gt;".to_string(),
            _ => c.to_string(),
        })
        .collect()
}
