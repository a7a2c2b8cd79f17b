use axum::{Json, extract::Extension, response::IntoResponse};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use super::auth::AuthState;

#[derive(ToSchema, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct SetupStatus {
    pub initialized: bool,
}

#[utoipa::path(
    get,
    path = "/api/setup/status",
    responses(
        (status = 200, description = "Whether the admin identity and session secret are configured", body = SetupStatus)
    ),
    tag = "setup"
)]
pub async fn status(auth_state: Extension<Arc<AuthState>>) -> impl IntoResponse {
    Json(SetupStatus {
        initialized: auth_state.is_initialized(),
    })
}
