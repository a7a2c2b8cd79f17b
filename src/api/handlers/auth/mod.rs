//! Auth handlers and supporting modules.
//!
//! This module coordinates the single-admin login, the stateless session
//! cookie, and the login rate limiter.
//!
//! ## Login Rate Limiting
//!
//! `POST /api/admin/login` is limited per client address before credentials
//! are checked.
//!
//! - **Attempt Limit:** 5 attempts per address within a 15-minute window.
//! - **Reset:** a successful login clears the address.
//! - **Sweep:** expired entries are purged every 30 minutes.
//!
//! ## Session Secret
//!
//! Tokens are signed with `POS_SESSION_SECRET`. Every instance must share it.
//!
//! > **Warning:** Rotating the secret signs every admin out immediately.

pub mod credentials;
pub(crate) mod keyword;
pub(crate) mod login;
pub(crate) mod principal;
pub mod rate_limit;
pub(crate) mod session;
mod state;
pub mod token;
pub(crate) mod types;
mod utils;

pub use credentials::{MIN_PASSWORD_LEN, hash_password};
pub use principal::AdminSession;
pub use rate_limit::spawn_sweeper;
pub use state::{AuthConfig, AuthState, DEFAULT_SESSION_EXPIRY_HOURS, DEFAULT_SITE_URL};
