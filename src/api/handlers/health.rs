use crate::GIT_COMMIT_HASH;
use axum::{
    body::Body,
    http::{HeaderMap, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Json},
};
use serde::{Deserialize, Serialize};
use tracing::error;
use utoipa::ToSchema;

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct Health {
    commit: String,
    name: String,
    version: String,
}

/// `name:version:short-commit`, e.g. `portfolio-os:0.1.0:1a2b3c4`.
fn x_app(health: &Health) -> Option<HeaderValue> {
    let short_commit: String = health.commit.chars().take(7).collect();
    HeaderValue::from_str(&format!("{}:{}:{short_commit}", health.name, health.version))
        .inspect_err(|err| error!("X-App header rejected: {err}"))
        .ok()
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Build information of the running binary", body = Health)
    ),
    tag = "health"
)]
pub async fn health(method: Method) -> impl IntoResponse {
    let health = Health {
        commit: GIT_COMMIT_HASH.to_string(),
        name: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    };

    let mut headers = HeaderMap::new();
    if let Some(value) = x_app(&health) {
        headers.insert("X-App", value);
    }

    // HEAD gets the header only.
    let body = match method {
        Method::GET => Json(health).into_response(),
        _ => Body::empty().into_response(),
    };

    (StatusCode::OK, headers, body)
}
