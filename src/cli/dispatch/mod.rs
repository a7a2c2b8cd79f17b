//! Command-line argument dispatch.
//!
//! Maps validated CLI matches to an action: the API server by default, or the
//! `bootstrap` subcommand.

use crate::cli::actions::{Action, bootstrap, server};
use crate::cli::commands::{ARG_PORT, auth, bootstrap as bootstrap_args};
use anyhow::{Context, Result};
use std::path::PathBuf;

/// Map validated CLI matches to an action.
///
/// # Errors
/// Returns an error if required arguments are missing or inconsistent.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    if let Some(sub) = matches.subcommand_matches(bootstrap_args::CMD_BOOTSTRAP) {
        return bootstrap_action(sub);
    }

    let port = matches.get_one::<u16>(ARG_PORT).copied().unwrap_or(8080);
    let auth_opts = auth::Options::parse(matches)?;

    Ok(Action::Server(server::Args {
        port,
        site_url: auth_opts.site_url,
        admin_username: auth_opts.admin_username,
        admin_password_hash: auth_opts.admin_password_hash,
        admin_keyword: auth_opts.admin_keyword,
        session_secret: auth_opts.session_secret,
        session_expiry_hours: auth_opts.session_expiry_hours,
        login_max_attempts: auth_opts.login_max_attempts,
        login_window_seconds: auth_opts.login_window_seconds,
        rate_limit_sweep_seconds: auth_opts.rate_limit_sweep_seconds,
    }))
}

fn bootstrap_action(matches: &clap::ArgMatches) -> Result<Action> {
    let username = matches
        .get_one::<String>(bootstrap_args::ARG_USERNAME)
        .cloned()
        .context("missing required argument: --username")?;
    let password = matches
        .get_one::<String>(bootstrap_args::ARG_PASSWORD)
        .cloned()
        .context("missing required argument: --password")?;
    let keyword = matches
        .get_one::<String>(bootstrap_args::ARG_KEYWORD)
        .cloned()
        .unwrap_or_else(|| bootstrap_args::DEFAULT_KEYWORD.to_string());
    let env_file = matches
        .get_one::<String>(bootstrap_args::ARG_ENV_FILE)
        .map_or_else(
            || PathBuf::from(bootstrap_args::DEFAULT_ENV_FILE),
            PathBuf::from,
        );

    Ok(Action::Bootstrap(bootstrap::Args {
        username,
        password: password.into(),
        keyword,
        env_file,
        force: matches.get_flag(bootstrap_args::ARG_FORCE),
    }))
}
