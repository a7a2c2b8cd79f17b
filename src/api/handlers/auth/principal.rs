//! Authenticated admin extraction for protected handlers.
//!
//! The edge gate only checks that a session cookie is shaped like a token.
//! Handlers that act on behalf of the admin take an `AdminSession`, which
//! verifies the signature and expiry and rejects with 401 otherwise.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
};
use std::sync::Arc;
use tracing::error;

use super::{session::get_session, state::AuthState, token::SessionPayload};

/// Verified session payload of the signed-in admin.
#[derive(Clone, Debug)]
pub struct AdminSession(pub SessionPayload);

impl<S> FromRequestParts<S> for AdminSession
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Some(auth_state) = parts.extensions.get::<Arc<AuthState>>() else {
            error!("AuthState extension missing from router");
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        };
        get_session(auth_state, &parts.headers)
            .map(Self)
            .ok_or(StatusCode::UNAUTHORIZED)
    }
}
