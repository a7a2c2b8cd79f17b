//! Auth state and configuration.

use secrecy::SecretString;
use std::{fmt, sync::Arc, time::Duration};

use super::{
    credentials::AdminCredentials,
    rate_limit::{
        DEFAULT_MAX_ATTEMPTS, DEFAULT_SWEEP_INTERVAL, DEFAULT_WINDOW, MemoryRateLimiter,
        RateLimiter,
    },
    token::SessionCodec,
};

pub const DEFAULT_SESSION_EXPIRY_HOURS: u64 = 2;
pub const DEFAULT_SITE_URL: &str = "http://localhost:8080";

/// Typed auth configuration, built once at startup.
///
/// Identity fields are optional on purpose: a half-configured system boots and
/// rejects every login instead of refusing to start.
#[derive(Clone)]
pub struct AuthConfig {
    site_url: String,
    admin_username: Option<String>,
    admin_password_hash: Option<SecretString>,
    admin_keyword: Option<String>,
    session_secret: Option<SecretString>,
    session_expiry_hours: u64,
    login_max_attempts: u32,
    login_window: Duration,
    rate_limit_sweep_interval: Duration,
}

impl AuthConfig {
    #[must_use]
    pub fn new(site_url: String) -> Self {
        Self {
            site_url,
            admin_username: None,
            admin_password_hash: None,
            admin_keyword: None,
            session_secret: None,
            session_expiry_hours: DEFAULT_SESSION_EXPIRY_HOURS,
            login_max_attempts: DEFAULT_MAX_ATTEMPTS,
            login_window: DEFAULT_WINDOW,
            rate_limit_sweep_interval: DEFAULT_SWEEP_INTERVAL,
        }
    }

    #[must_use]
    pub fn with_admin_username(mut self, username: Option<String>) -> Self {
        self.admin_username = username;
        self
    }

    #[must_use]
    pub fn with_admin_password_hash(mut self, hash: Option<SecretString>) -> Self {
        self.admin_password_hash = hash;
        self
    }

    #[must_use]
    pub fn with_admin_keyword(mut self, keyword: Option<String>) -> Self {
        self.admin_keyword = keyword;
        self
    }

    #[must_use]
    pub fn with_session_secret(mut self, secret: Option<SecretString>) -> Self {
        self.session_secret = secret;
        self
    }

    #[must_use]
    pub fn with_session_expiry_hours(mut self, hours: u64) -> Self {
        self.session_expiry_hours = hours;
        self
    }

    #[must_use]
    pub fn with_login_max_attempts(mut self, attempts: u32) -> Self {
        self.login_max_attempts = attempts;
        self
    }

    #[must_use]
    pub fn with_login_window(mut self, window: Duration) -> Self {
        self.login_window = window;
        self
    }

    #[must_use]
    pub fn with_rate_limit_sweep_interval(mut self, interval: Duration) -> Self {
        self.rate_limit_sweep_interval = interval;
        self
    }

    #[must_use]
    pub fn site_url(&self) -> &str {
        &self.site_url
    }

    #[must_use]
    pub fn admin_keyword(&self) -> Option<&str> {
        self.admin_keyword.as_deref()
    }

    #[must_use]
    pub const fn session_expiry_hours(&self) -> u64 {
        self.session_expiry_hours
    }

    #[must_use]
    pub const fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_expiry_hours.saturating_mul(60 * 60))
    }

    #[must_use]
    pub const fn login_max_attempts(&self) -> u32 {
        self.login_max_attempts
    }

    #[must_use]
    pub const fn login_window(&self) -> Duration {
        self.login_window
    }

    #[must_use]
    pub const fn rate_limit_sweep_interval(&self) -> Duration {
        self.rate_limit_sweep_interval
    }

    /// Only mark cookies secure when the site is served over HTTPS.
    pub(crate) fn session_cookie_secure(&self) -> bool {
        self.site_url.starts_with("https://")
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("site_url", &self.site_url)
            .field("admin_username", &self.admin_username)
            .field(
                "admin_password_hash",
                &self.admin_password_hash.as_ref().map(|_| "***"),
            )
            .field("admin_keyword", &self.admin_keyword.as_ref().map(|_| "***"))
            .field("session_secret", &self.session_secret.as_ref().map(|_| "***"))
            .field("session_expiry_hours", &self.session_expiry_hours)
            .field("login_max_attempts", &self.login_max_attempts)
            .field("login_window", &self.login_window)
            .field("rate_limit_sweep_interval", &self.rate_limit_sweep_interval)
            .finish()
    }
}

/// Everything the auth handlers share, behind one `Arc`.
pub struct AuthState {
    config: AuthConfig,
    credentials: AdminCredentials,
    codec: SessionCodec,
    rate_limiter: Arc<dyn RateLimiter>,
}

impl AuthState {
    pub fn new(config: AuthConfig, rate_limiter: Arc<dyn RateLimiter>) -> Self {
        let credentials = AdminCredentials::new(
            config.admin_username.clone(),
            config.admin_password_hash.clone(),
        );
        let codec = SessionCodec::new(config.session_secret.clone(), config.session_ttl());
        Self {
            config,
            credentials,
            codec,
            rate_limiter,
        }
    }

    /// State backed by the in-process rate limiter sized from `config`.
    #[must_use]
    pub fn with_memory_rate_limiter(config: AuthConfig) -> Self {
        let limiter = MemoryRateLimiter::new(config.login_max_attempts(), config.login_window());
        Self::new(config, Arc::new(limiter))
    }

    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    #[must_use]
    pub fn credentials(&self) -> &AdminCredentials {
        &self.credentials
    }

    #[must_use]
    pub fn codec(&self) -> &SessionCodec {
        &self.codec
    }

    pub fn rate_limiter(&self) -> &dyn RateLimiter {
        self.rate_limiter.as_ref()
    }

    #[must_use]
    pub fn shared_rate_limiter(&self) -> Arc<dyn RateLimiter> {
        Arc::clone(&self.rate_limiter)
    }

    /// The admin identity and the session secret are both present.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.credentials.is_configured() && self.codec.is_configured()
    }
}

impl fmt::Debug for AuthState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthState")
            .field("config", &self.config)
            .field("credentials", &self.credentials)
            .field("codec", &self.codec)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::super::credentials::tests::{USERNAME, fast_hash};
    use super::*;

    #[test]
    fn auth_config_defaults_and_overrides() {
        let config = AuthConfig::new(DEFAULT_SITE_URL.to_string());

        assert_eq!(config.site_url(), DEFAULT_SITE_URL);
        assert_eq!(config.session_expiry_hours(), 2);
        assert_eq!(config.session_ttl(), Duration::from_secs(7_200));
        assert_eq!(config.login_max_attempts(), 5);
        assert_eq!(config.login_window(), Duration::from_secs(900));
        assert_eq!(config.rate_limit_sweep_interval(), Duration::from_secs(1_800));
        assert_eq!(config.admin_keyword(), None);
        assert!(!config.session_cookie_secure());

        let config = config
            .with_session_expiry_hours(8)
            .with_login_max_attempts(3)
            .with_login_window(Duration::from_secs(60))
            .with_rate_limit_sweep_interval(Duration::from_secs(120))
            .with_admin_keyword(Some("sudo".to_string()));

        assert_eq!(config.session_ttl(), Duration::from_secs(8 * 3_600));
        assert_eq!(config.login_max_attempts(), 3);
        assert_eq!(config.login_window(), Duration::from_secs(60));
        assert_eq!(config.rate_limit_sweep_interval(), Duration::from_secs(120));
        assert_eq!(config.admin_keyword(), Some("sudo"));
    }

    #[test]
    fn secure_cookie_follows_site_scheme() {
        assert!(AuthConfig::new("https://portfolio.example".to_string()).session_cookie_secure());
        assert!(!AuthConfig::new("http://portfolio.example".to_string()).session_cookie_secure());
    }

    #[test]
    fn debug_output_redacts_secrets() {
        let config = AuthConfig::new(DEFAULT_SITE_URL.to_string())
            .with_admin_username(Some(USERNAME.to_string()))
            .with_admin_password_hash(Some(SecretString::from("$argon2id$hash".to_string())))
            .with_session_secret(Some(SecretString::from("topsecret".to_string())))
            .with_admin_keyword(Some("open-sesame".to_string()));
        let rendered = format!("{config:?}");
        assert!(rendered.contains(USERNAME));
        assert!(!rendered.contains("topsecret"));
        assert!(!rendered.contains("open-sesame"));
        assert!(!rendered.contains("$argon2id$hash"));
    }

    #[test]
    fn initialized_requires_identity_and_secret() {
        let base = AuthConfig::new(DEFAULT_SITE_URL.to_string())
            .with_admin_username(Some(USERNAME.to_string()))
            .with_admin_password_hash(Some(SecretString::from(fast_hash("pw-123456"))));

        let state = AuthState::with_memory_rate_limiter(base.clone());
        assert!(!state.is_initialized());

        let state = AuthState::with_memory_rate_limiter(
            base.with_session_secret(Some(SecretString::from("s3cret".to_string()))),
        );
        assert!(state.is_initialized());
    }
}
