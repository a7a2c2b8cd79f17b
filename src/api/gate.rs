//! Edge request gate.
//!
//! Runs in front of every route. Requests under a protected prefix must carry
//! a `pos_session` cookie shaped like `<payload>.<signature>`; the signature
//! itself is checked later by the `AdminSession` extractor. Anonymous page
//! requests are sent home, never to a login route.

use axum::{
    Json,
    body::Body,
    extract::{Request, State},
    http::{HeaderName, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use serde_json::json;
use std::sync::Arc;
use tower_http::set_header::SetResponseHeaderLayer;
use tracing::debug;

use super::handlers::auth::{session::extract_session_token, token::split_token};

pub const DEFAULT_PROTECTED_PREFIXES: [&str; 2] = ["/admin", "/api/admin"];
// Login must be reachable anonymously. Branding and visual settings are read by
// the public site from the content service mounted beside this one; the gate
// fronts both, so those reads stay open.
pub const DEFAULT_EXCLUDED_PATHS: [&str; 3] = [
    "/api/admin/login",
    "/api/admin/branding",
    "/api/admin/visual",
];

pub const SECURITY_HEADERS: [(&str, &str); 5] = [
    ("x-content-type-options", "nosniff"),
    ("x-frame-options", "DENY"),
    ("referrer-policy", "strict-origin-when-cross-origin"),
    ("x-xss-protection", "1; mode=block"),
    ("permissions-policy", "camera=(), microphone=(), geolocation=()"),
];

/// Which paths the gate guards.
#[derive(Clone, Debug)]
pub struct GatePolicy {
    protected_prefixes: Vec<String>,
    excluded_paths: Vec<String>,
}

impl Default for GatePolicy {
    fn default() -> Self {
        Self::new(
            DEFAULT_PROTECTED_PREFIXES.map(str::to_string).to_vec(),
            DEFAULT_EXCLUDED_PATHS.map(str::to_string).to_vec(),
        )
    }
}

impl GatePolicy {
    #[must_use]
    pub const fn new(protected_prefixes: Vec<String>, excluded_paths: Vec<String>) -> Self {
        Self {
            protected_prefixes,
            excluded_paths,
        }
    }

    /// Exclusions are exact matches; protection is a plain prefix match.
    #[must_use]
    pub fn requires_session(&self, path: &str) -> bool {
        if self.excluded_paths.iter().any(|excluded| excluded == path) {
            return false;
        }
        self.protected_prefixes
            .iter()
            .any(|prefix| path.starts_with(prefix.as_str()))
    }
}

#[derive(Debug, PartialEq, Eq)]
enum GateDecision {
    Pass,
    Unauthorized,
    RedirectHome,
}

fn decide(policy: &GatePolicy, path: &str, token: Option<&str>) -> GateDecision {
    if !policy.requires_session(path) {
        return GateDecision::Pass;
    }
    if token.and_then(split_token).is_some() {
        return GateDecision::Pass;
    }
    if path.starts_with("/api/") {
        GateDecision::Unauthorized
    } else {
        GateDecision::RedirectHome
    }
}

/// Structural session check, applied with `axum::middleware::from_fn_with_state`.
pub async fn gate(
    State(policy): State<Arc<GatePolicy>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();
    let token = extract_session_token(request.headers());

    match decide(&policy, &path, token.as_deref()) {
        GateDecision::Pass => next.run(request).await,
        GateDecision::Unauthorized => {
            debug!("Gate rejected {path}: no session cookie");
            (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "Unauthorized" })),
            )
                .into_response()
        }
        GateDecision::RedirectHome => {
            debug!("Gate redirected {path}: no session cookie");
            Redirect::temporary("/").into_response()
        }
    }
}

/// One overriding response-header layer per hardening header.
pub fn security_header_layers() -> Vec<SetResponseHeaderLayer<HeaderValue>> {
    SECURITY_HEADERS
        .into_iter()
        .map(|(name, value)| {
            SetResponseHeaderLayer::overriding(
                HeaderName::from_static(name),
                HeaderValue::from_static(value),
            )
        })
        .collect()
}
