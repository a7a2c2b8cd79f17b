use crate::{api, cli::telemetry};
use anyhow::Result;
use secrecy::SecretString;
use std::time::Duration;
use tracing::debug;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub site_url: String,
    pub admin_username: Option<String>,
    pub admin_password_hash: Option<SecretString>,
    pub admin_keyword: Option<String>,
    pub session_secret: Option<SecretString>,
    pub session_expiry_hours: u64,
    pub login_max_attempts: u32,
    pub login_window_seconds: u64,
    pub rate_limit_sweep_seconds: u64,
}

impl Args {
    #[must_use]
    pub fn auth_config(self) -> api::AuthConfig {
        api::AuthConfig::new(self.site_url)
            .with_admin_username(self.admin_username)
            .with_admin_password_hash(self.admin_password_hash)
            .with_admin_keyword(self.admin_keyword)
            .with_session_secret(self.session_secret)
            .with_session_expiry_hours(self.session_expiry_hours)
            .with_login_max_attempts(self.login_max_attempts)
            .with_login_window(Duration::from_secs(self.login_window_seconds))
            .with_rate_limit_sweep_interval(Duration::from_secs(self.rate_limit_sweep_seconds))
    }
}

/// Execute the server action.
/// # Errors
/// Returns an error if the listener cannot be bound or the server fails.
pub async fn execute(args: Args) -> Result<()> {
    let port = args.port;
    let auth_config = args.auth_config();

    debug!("Auth config: {:?}", auth_config);

    let result = api::new(port, auth_config).await;

    telemetry::shutdown_tracer();

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_config_carries_every_option() {
        let args = Args {
            port: 8080,
            site_url: "https://portfolio.example".to_string(),
            admin_username: Some("heisenberg".to_string()),
            admin_password_hash: None,
            admin_keyword: Some("open-sesame".to_string()),
            session_secret: Some(SecretString::from("s3cret".to_string())),
            session_expiry_hours: 4,
            login_max_attempts: 3,
            login_window_seconds: 120,
            rate_limit_sweep_seconds: 600,
        };

        let config = args.auth_config();
        assert_eq!(config.site_url(), "https://portfolio.example");
        assert_eq!(config.admin_keyword(), Some("open-sesame"));
        assert_eq!(config.session_ttl(), Duration::from_secs(4 * 3600));
        assert_eq!(config.login_max_attempts(), 3);
        assert_eq!(config.login_window(), Duration::from_secs(120));
        assert_eq!(config.rate_limit_sweep_interval(), Duration::from_secs(600));
    }
}
