//! Stateless session tokens.
//!
//! Token format: `base64(json(payload)).hex(hmac_sha256(secret, base64 part))`.
//! The server stores nothing; the signature binds the payload to the secret and
//! the payload carries its own expiry.

use anyhow::{Result, anyhow};
use base64::{Engine, engine::general_purpose::STANDARD};
use chrono::Utc;
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::{fmt, time::Duration};
use utoipa::ToSchema;

type HmacSha256 = Hmac<Sha256>;

/// Claims embedded in a session token. Timestamps are epoch milliseconds.
#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SessionPayload {
    pub username: String,
    pub created_at: i64,
    pub expires_at: i64,
}

impl SessionPayload {
    /// A token stays valid up to and including `expires_at`.
    #[must_use]
    pub const fn is_expired_at(&self, now_ms: i64) -> bool {
        now_ms > self.expires_at
    }
}

/// Signs and verifies session tokens with the server secret.
pub struct SessionCodec {
    secret: Option<SecretString>,
    ttl: Duration,
}

impl SessionCodec {
    #[must_use]
    pub fn new(secret: Option<SecretString>, ttl: Duration) -> Self {
        let secret = secret.filter(|secret| !secret.expose_secret().is_empty());
        Self { secret, ttl }
    }

    #[must_use]
    pub const fn is_configured(&self) -> bool {
        self.secret.is_some()
    }

    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    fn mac(&self) -> Option<HmacSha256> {
        let secret = self.secret.as_ref()?;
        HmacSha256::new_from_slice(secret.expose_secret().as_bytes()).ok()
    }

    /// Issue a token for `username` valid for the configured TTL.
    ///
    /// # Errors
    /// Returns an error when no session secret is configured.
    pub fn create(&self, username: &str) -> Result<String> {
        self.create_at(username, Utc::now().timestamp_millis())
    }

    /// # Errors
    /// Returns an error when no session secret is configured.
    pub fn create_at(&self, username: &str, now_ms: i64) -> Result<String> {
        let ttl_ms = i64::try_from(self.ttl.as_millis()).unwrap_or(i64::MAX);
        let payload = SessionPayload {
            username: username.to_string(),
            created_at: now_ms,
            expires_at: now_ms.saturating_add(ttl_ms),
        };
        let data = STANDARD.encode(serde_json::to_vec(&payload)?);

        let mut mac = self
            .mac()
            .ok_or_else(|| anyhow!("session secret is not configured"))?;
        mac.update(data.as_bytes());
        let signature = hex::encode(mac.finalize().into_bytes());

        Ok(format!("{data}.{signature}"))
    }

    /// Verify a token and return its payload, or `None` for anything invalid:
    /// wrong shape, bad signature, undecodable payload, or expired.
    #[must_use]
    pub fn verify(&self, token: &str) -> Option<SessionPayload> {
        self.verify_at(token, Utc::now().timestamp_millis())
    }

    #[must_use]
    pub fn verify_at(&self, token: &str, now_ms: i64) -> Option<SessionPayload> {
        let (data, signature) = split_token(token)?;

        // Only canonical lowercase hex is accepted, so one signature has one spelling.
        if !signature
            .bytes()
            .all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
        {
            return None;
        }
        let signature = hex::decode(signature).ok()?;
        let mut mac = self.mac()?;
        mac.update(data.as_bytes());
        mac.verify_slice(&signature).ok()?;

        let json = STANDARD.decode(data).ok()?;
        let payload: SessionPayload = serde_json::from_slice(&json).ok()?;

        if payload.is_expired_at(now_ms) {
            return None;
        }

        Some(payload)
    }
}

impl fmt::Debug for SessionCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionCodec")
            .field("secret", &self.secret.as_ref().map(|_| "***"))
            .field("ttl", &self.ttl)
            .finish()
    }
}

/// Split `<payload>.<signature>`; both parts must be non-empty and there must
/// be exactly one separator.
pub(crate) fn split_token(token: &str) -> Option<(&str, &str)> {
    let (data, signature) = token.split_once('.')?;
    if data.is_empty() || signature.is_empty() || signature.contains('.') {
        return None;
    }
    Some((data, signature))
}
