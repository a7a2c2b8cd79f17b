use anyhow::{Context, Result};
use clap::{Arg, ArgMatches, Command};
use secrecy::SecretString;

use crate::api::handlers::auth::{DEFAULT_SESSION_EXPIRY_HOURS, DEFAULT_SITE_URL};

pub const ARG_SITE_URL: &str = "site-url";
pub const ARG_ADMIN_USERNAME: &str = "admin-username";
pub const ARG_ADMIN_PASSWORD_HASH: &str = "admin-password-hash";
pub const ARG_ADMIN_KEYWORD: &str = "admin-keyword";
pub const ARG_SESSION_SECRET: &str = "session-secret";
pub const ARG_SESSION_EXPIRY_HOURS: &str = "session-expiry-hours";
pub const ARG_LOGIN_MAX_ATTEMPTS: &str = "login-max-attempts";
pub const ARG_LOGIN_WINDOW_SECONDS: &str = "login-window-seconds";
pub const ARG_RATE_LIMIT_SWEEP_SECONDS: &str = "rate-limit-sweep-seconds";

pub fn with_args(command: Command) -> Command {
    let command = with_identity_args(command);
    let command = with_session_args(command);
    with_rate_limit_args(command)
}

// Identity values are optional: without them the server runs but rejects every login.
fn with_identity_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_ADMIN_USERNAME)
                .long(ARG_ADMIN_USERNAME)
                .help("Admin username")
                .env("POS_ADMIN_USERNAME"),
        )
        .arg(
            Arg::new(ARG_ADMIN_PASSWORD_HASH)
                .long(ARG_ADMIN_PASSWORD_HASH)
                .help("Argon2 PHC hash of the admin password (see `bootstrap`)")
                .env("POS_ADMIN_PASSWORD_HASH")
                .hide_env_values(true),
        )
        .arg(
            Arg::new(ARG_ADMIN_KEYWORD)
                .long(ARG_ADMIN_KEYWORD)
                .help("Keyword that reveals the admin login form")
                .env("POS_ADMIN_KEYWORD")
                .hide_env_values(true),
        )
}

fn with_session_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_SITE_URL)
                .long(ARG_SITE_URL)
                .help("Public site URL; https enables Secure cookies")
                .env("POS_SITE_URL")
                .default_value(DEFAULT_SITE_URL),
        )
        .arg(
            Arg::new(ARG_SESSION_SECRET)
                .long(ARG_SESSION_SECRET)
                .help("HMAC secret used to sign session tokens")
                .env("POS_SESSION_SECRET")
                .hide_env_values(true),
        )
        .arg(
            Arg::new(ARG_SESSION_EXPIRY_HOURS)
                .long(ARG_SESSION_EXPIRY_HOURS)
                .help("Session lifetime in hours")
                .env("POS_SESSION_EXPIRY_HOURS")
                .default_value("2")
                .value_parser(clap::value_parser!(u64).range(1..)),
        )
}

fn with_rate_limit_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_LOGIN_MAX_ATTEMPTS)
                .long(ARG_LOGIN_MAX_ATTEMPTS)
                .help("Login attempts allowed per address within one window")
                .env("POS_LOGIN_MAX_ATTEMPTS")
                .default_value("5")
                .value_parser(clap::value_parser!(u32).range(1..)),
        )
        .arg(
            Arg::new(ARG_LOGIN_WINDOW_SECONDS)
                .long(ARG_LOGIN_WINDOW_SECONDS)
                .help("Login rate limit window in seconds")
                .env("POS_LOGIN_WINDOW_SECONDS")
                .default_value("900")
                .value_parser(clap::value_parser!(u64).range(1..)),
        )
        .arg(
            Arg::new(ARG_RATE_LIMIT_SWEEP_SECONDS)
                .long(ARG_RATE_LIMIT_SWEEP_SECONDS)
                .help("Interval between purges of expired rate limit entries")
                .env("POS_RATE_LIMIT_SWEEP_SECONDS")
                .default_value("1800")
                .value_parser(clap::value_parser!(u64).range(1..)),
        )
}

/// Auth options read back out of the parsed matches.
#[derive(Debug)]
pub struct Options {
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

impl Options {
    /// # Errors
    /// Returns an error if the site URL is not an absolute http(s) URL.
    pub fn parse(matches: &ArgMatches) -> Result<Self> {
        let site_url = matches
            .get_one::<String>(ARG_SITE_URL)
            .cloned()
            .unwrap_or_else(|| DEFAULT_SITE_URL.to_string());
        let parsed = url::Url::parse(&site_url)
            .with_context(|| format!("Invalid site URL: {site_url}"))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            anyhow::bail!("Site URL must use http or https: {site_url}");
        }

        Ok(Self {
            site_url,
            admin_username: matches.get_one::<String>(ARG_ADMIN_USERNAME).cloned(),
            admin_password_hash: secret(matches, ARG_ADMIN_PASSWORD_HASH),
            admin_keyword: matches.get_one::<String>(ARG_ADMIN_KEYWORD).cloned(),
            session_secret: secret(matches, ARG_SESSION_SECRET),
            session_expiry_hours: matches
                .get_one::<u64>(ARG_SESSION_EXPIRY_HOURS)
                .copied()
                .unwrap_or(DEFAULT_SESSION_EXPIRY_HOURS),
            login_max_attempts: matches
                .get_one::<u32>(ARG_LOGIN_MAX_ATTEMPTS)
                .copied()
                .unwrap_or(5),
            login_window_seconds: matches
                .get_one::<u64>(ARG_LOGIN_WINDOW_SECONDS)
                .copied()
                .unwrap_or(900),
            rate_limit_sweep_seconds: matches
                .get_one::<u64>(ARG_RATE_LIMIT_SWEEP_SECONDS)
                .copied()
                .unwrap_or(1800),
        })
    }
}

fn secret(matches: &ArgMatches, id: &str) -> Option<SecretString> {
    matches
        .get_one::<String>(id)
        .filter(|value| !value.is_empty())
        .map(|value| SecretString::from(value.clone()))
}
