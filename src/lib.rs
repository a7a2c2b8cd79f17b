//! # Portfolio OS (admin session gate)
//!
//! `portfolio-os` serves the authentication edge of the Portfolio OS personal
//! site: the hidden admin login, the signed session cookie, and the gate that
//! keeps `/admin` and `/api/admin` closed to anonymous visitors.
//!
//! ## Sessions
//!
//! Sessions are stateless. The cookie `pos_session` carries
//! `base64(payload).hex(hmac_sha256(payload))`, where the payload records the
//! username, issue time, and expiry time in epoch milliseconds. Rotating the
//! session secret revokes every outstanding session at once.
//!
//! ## Stealth
//!
//! Failed logins never say why they failed. Rate-limited, malformed, and
//! wrong-credential attempts all produce the same response, and unauthenticated
//! page requests are redirected to `/` rather than to a login route.
//!
//! > **Note:** the admin keyword that reveals the login form is a plain string
//! > match. It hides the form, it does not protect anything.

pub mod api;
pub mod cli;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};
