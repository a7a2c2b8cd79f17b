//! First-run setup: hash the admin password, mint a session secret and write
//! both into an env file the server can be started with.

use crate::api::handlers::auth::{MIN_PASSWORD_LEN, hash_password};
use anyhow::{Context, Result, anyhow, bail};
use rand::{RngCore, rngs::OsRng};
use secrecy::{ExposeSecret, SecretString};
use std::{fs, io::ErrorKind, path::PathBuf};
use tracing::info;

const KEY_USERNAME: &str = "POS_ADMIN_USERNAME";
const KEY_PASSWORD_HASH: &str = "POS_ADMIN_PASSWORD_HASH";
const KEY_KEYWORD: &str = "POS_ADMIN_KEYWORD";
const KEY_SESSION_SECRET: &str = "POS_SESSION_SECRET";

#[derive(Debug)]
pub struct Args {
    pub username: String,
    pub password: SecretString,
    pub keyword: String,
    pub env_file: PathBuf,
    pub force: bool,
}

/// Execute the bootstrap action.
/// # Errors
/// Returns an error on invalid input, an already initialized env file (without
/// `--force`), or any I/O failure.
pub async fn execute(args: Args) -> Result<()> {
    let username = args.username.trim().to_string();
    if username.is_empty() || username.chars().count() > 64 {
        bail!("Username must be between 1 and 64 characters");
    }
    if args.password.expose_secret().chars().count() < MIN_PASSWORD_LEN {
        bail!("Password must be at least {MIN_PASSWORD_LEN} characters");
    }
    let keyword = args.keyword.trim().to_string();
    if keyword.is_empty() {
        bail!("Keyword must not be empty");
    }
    for (label, value) in [("Username", &username), ("Keyword", &keyword)] {
        if !env_safe(value) {
            bail!("{label} must not contain quotes or line breaks");
        }
    }

    let existing = match fs::read_to_string(&args.env_file) {
        Ok(content) => content,
        Err(err) if err.kind() == ErrorKind::NotFound => String::new(),
        Err(err) => {
            return Err(err)
                .with_context(|| format!("Failed to read {}", args.env_file.display()));
        }
    };
    if !args.force && has_value(&existing, KEY_PASSWORD_HASH) {
        bail!(
            "{} already holds an admin password hash; rerun with --force to replace it",
            args.env_file.display()
        );
    }

    let password = args.password;
    let password_hash =
        tokio::task::spawn_blocking(move || hash_password(password.expose_secret()))
            .await
            .map_err(|err| anyhow!("password hashing task failed: {err}"))??;

    let updated = upsert_env(
        &existing,
        &[
            (KEY_USERNAME, username.as_str()),
            (KEY_PASSWORD_HASH, password_hash.as_str()),
            (KEY_KEYWORD, keyword.as_str()),
            (KEY_SESSION_SECRET, generate_session_secret().as_str()),
        ],
    );
    fs::write(&args.env_file, updated)
        .with_context(|| format!("Failed to write {}", args.env_file.display()))?;

    info!(
        target: "audit",
        action = "bootstrap",
        username = %username,
        env_file = %args.env_file.display(),
    );
    println!(
        "Admin '{username}' written to {}. Load it before starting the server.",
        args.env_file.display()
    );

    Ok(())
}

/// 32 random bytes, hex encoded.
fn generate_session_secret() -> String {
    let mut bytes = [0u8; 32];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Values are written single-quoted, one per line; these characters would
/// break that quoting.
fn env_safe(value: &str) -> bool {
    !value.contains(['\'', '"', '\n', '\r'])
}

fn line_key(line: &str) -> Option<&str> {
    let line = line.trim_start();
    let line = line.strip_prefix("export ").unwrap_or(line);
    line.split_once('=').map(|(key, _)| key.trim())
}

fn has_value(content: &str, key: &str) -> bool {
    content.lines().any(|line| {
        line_key(line) == Some(key)
            && line
                .split_once('=')
                .map(|(_, value)| value.trim().trim_matches(|c| c == '\'' || c == '"'))
                .is_some_and(|value| !value.is_empty())
    })
}

/// Replace or append `KEY='value'` lines, keeping every other line as is.
///
/// Values are single-quoted so `$` in Argon2 hashes survives shell sourcing.
fn upsert_env(content: &str, vars: &[(&str, &str)]) -> String {
    let mut lines: Vec<String> = content.lines().map(str::to_string).collect();

    for (key, value) in vars {
        let rendered = format!("{key}='{value}'");
        match lines
            .iter_mut()
            .find(|line| line_key(line) == Some(*key))
        {
            Some(line) => *line = rendered,
            None => lines.push(rendered),
        }
    }

    let mut output = lines.join("\n").trim().to_string();
    output.push('\n');
    output
}
