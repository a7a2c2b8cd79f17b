use axum::{
    Json,
    extract::{Extension, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use std::sync::Arc;
use tracing::debug;

use super::{
    session::check_admin_keyword,
    state::AuthState,
    types::{KeywordRequest, KeywordResponse},
};

#[utoipa::path(
    post,
    path = "/api/keyword",
    request_body = KeywordRequest,
    responses(
        (status = 200, description = "Whether the input reveals the admin login", body = KeywordResponse)
    ),
    tag = "auth"
)]
// Visitor form check. Anything unreadable is simply "not the keyword".
pub async fn keyword(
    auth_state: Extension<Arc<AuthState>>,
    payload: Result<Json<KeywordRequest>, JsonRejection>,
) -> impl IntoResponse {
    let admin = match payload {
        Ok(Json(request)) => check_admin_keyword(auth_state.config(), &request.input),
        Err(err) => {
            debug!("Ignoring unreadable keyword check: {err}");
            false
        }
    };
    (StatusCode::OK, Json(KeywordResponse { admin }))
}
