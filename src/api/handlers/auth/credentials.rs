//! Admin credential validation.
//!
//! There is exactly one admin identity, supplied by configuration. Passwords are
//! stored as Argon2 PHC strings. A login with an unknown username still pays for
//! one hash verification, against a dummy hash built with the same parameters
//! as the real one, so both failure paths cost the same.

use anyhow::{Result, anyhow};
use argon2::{
    Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version,
    password_hash::SaltString,
};
use rand::{RngCore, rngs::OsRng};
use secrecy::{ExposeSecret, SecretString};
use std::fmt;
use tracing::error;

pub const MIN_PASSWORD_LEN: usize = 8;

/// Hash a password for `POS_ADMIN_PASSWORD_HASH` using Argon2id defaults.
///
/// # Errors
/// Returns an error if the hasher rejects the input.
pub fn hash_password(password: &str) -> Result<String> {
    hash_password_with(&Argon2::default(), password)
}

pub(crate) fn hash_password_with(argon2: &Argon2<'_>, password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| anyhow!("failed to hash password: {err}"))
}

/// Build a throwaway hash that costs the same to verify as `stored`.
fn dummy_hash_for(stored: &str) -> Result<String> {
    let parsed =
        PasswordHash::new(stored).map_err(|err| anyhow!("invalid admin password hash: {err}"))?;
    let algorithm = Algorithm::try_from(parsed.algorithm)
        .map_err(|err| anyhow!("unsupported password hash algorithm: {err}"))?;
    let version = parsed
        .version
        .map(Version::try_from)
        .transpose()
        .map_err(|err| anyhow!("unsupported password hash version: {err}"))?
        .unwrap_or_default();
    let params =
        Params::try_from(&parsed).map_err(|err| anyhow!("invalid password hash params: {err}"))?;

    let mut filler = [0u8; 32];
    OsRng.fill_bytes(&mut filler);
    hash_password_with(
        &Argon2::new(algorithm, version, params),
        &hex::encode(filler),
    )
}

fn verify_password(password: &str, hash: &str) -> bool {
    PasswordHash::new(hash).is_ok_and(|parsed| {
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    })
}

struct AdminIdentity {
    username: String,
    password_hash: SecretString,
    dummy_hash: String,
}

/// The configured admin identity, or nothing when the system is not set up.
pub struct AdminCredentials {
    identity: Option<AdminIdentity>,
}

impl AdminCredentials {
    /// Build the validator from configuration.
    ///
    /// Missing or unparseable values leave the validator unconfigured: every
    /// login is rejected and the fault is logged, the process keeps running.
    #[must_use]
    pub fn new(username: Option<String>, password_hash: Option<SecretString>) -> Self {
        let username = username
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty());
        let (Some(username), Some(password_hash)) = (username, password_hash) else {
            error!("Admin credentials are not configured; all logins will be rejected");
            return Self::unconfigured();
        };

        match dummy_hash_for(password_hash.expose_secret()) {
            Ok(dummy_hash) => Self {
                identity: Some(AdminIdentity {
                    username,
                    password_hash,
                    dummy_hash,
                }),
            },
            Err(err) => {
                error!("Admin password hash rejected: {err}; all logins will be rejected");
                Self::unconfigured()
            }
        }
    }

    #[must_use]
    pub const fn unconfigured() -> Self {
        Self { identity: None }
    }

    #[must_use]
    pub const fn is_configured(&self) -> bool {
        self.identity.is_some()
    }

    /// Check a username/password pair against the admin identity.
    ///
    /// This is slow on purpose; async callers should use the blocking pool.
    #[must_use]
    pub fn validate(&self, username: &str, password: &str) -> bool {
        let Some(identity) = &self.identity else {
            error!("Login attempted while admin credentials are not configured");
            return false;
        };

        if username != identity.username {
            let _ = verify_password(password, &identity.dummy_hash);
            return false;
        }

        verify_password(password, identity.password_hash.expose_secret())
    }
}

impl fmt::Debug for AdminCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminCredentials")
            .field(
                "username",
                &self.identity.as_ref().map(|identity| &identity.username),
            )
            .field("password_hash", &"***")
            .finish()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    pub(crate) const USERNAME: &str = "heisenberg";
    pub(crate) const PASSWORD: &str = "say-my-name-99";

    /// Cheap Argon2 parameters so tests don't spend seconds hashing.
    pub(crate) fn fast_hash(password: &str) -> String {
        let params = Params::new(8, 1, 1, None).unwrap_or_default();
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
        hash_password_with(&argon2, password).unwrap_or_default()
    }

    pub(crate) fn credentials() -> AdminCredentials {
        AdminCredentials::new(
            Some(USERNAME.to_string()),
            Some(SecretString::from(fast_hash(PASSWORD))),
        )
    }

    #[test]
    fn accepts_configured_identity() {
        assert!(credentials().validate(USERNAME, PASSWORD));
    }

    #[test]
    fn rejects_wrong_password_and_wrong_username() {
        let creds = credentials();
        assert!(!creds.validate(USERNAME, "wrong-password"));
        assert!(!creds.validate("jesse", PASSWORD));
        assert!(!creds.validate("", ""));
        assert!(!creds.validate(&USERNAME.to_uppercase(), PASSWORD));
    }

    #[test]
    fn unconfigured_rejects_everything() {
        let creds = AdminCredentials::new(None, Some(SecretString::from(fast_hash(PASSWORD))));
        assert!(!creds.is_configured());
        assert!(!creds.validate(USERNAME, PASSWORD));

        let creds = AdminCredentials::new(Some(USERNAME.to_string()), None);
        assert!(!creds.validate(USERNAME, PASSWORD));

        let creds = AdminCredentials::new(Some("  ".to_string()), None);
        assert!(!creds.is_configured());
    }

    #[test]
    fn garbage_hash_leaves_validator_unconfigured() {
        let creds = AdminCredentials::new(
            Some(USERNAME.to_string()),
            Some(SecretString::from("not-a-phc-string".to_string())),
        );
        assert!(!creds.is_configured());
        assert!(!creds.validate(USERNAME, "not-a-phc-string"));
    }

    #[test]
    fn dummy_hash_matches_configured_params() -> Result<()> {
        let stored = fast_hash(PASSWORD);
        let dummy = dummy_hash_for(&stored)?;
        let stored = PasswordHash::new(&stored).map_err(|err| anyhow!("{err}"))?;
        let dummy = PasswordHash::new(&dummy).map_err(|err| anyhow!("{err}"))?;

        assert_eq!(stored.algorithm, dummy.algorithm);
        assert_eq!(stored.version, dummy.version);
        assert_eq!(
            Params::try_from(&stored).map_err(|err| anyhow!("{err}"))?,
            Params::try_from(&dummy).map_err(|err| anyhow!("{err}"))?
        );
        assert_ne!(stored.salt, dummy.salt);
        Ok(())
    }

    #[test]
    fn hash_password_produces_argon2id_phc() -> Result<()> {
        let hash = hash_password("correct horse battery staple")?;
        assert!(hash.starts_with("$argon2id$"));
        let parsed = PasswordHash::new(&hash).map_err(|err| anyhow!("{err}"))?;
        let params = Params::try_from(&parsed).map_err(|err| anyhow!("{err}"))?;
        let defaults = Params::default();
        assert_eq!(params.m_cost(), defaults.m_cost());
        assert_eq!(params.t_cost(), defaults.t_cost());
        assert_eq!(params.p_cost(), defaults.p_cost());
        Ok(())
    }

    fn median(mut samples: Vec<Duration>) -> Duration {
        samples.sort();
        samples[samples.len() / 2]
    }

    #[test]
    fn unknown_username_costs_the_same_as_wrong_password() {
        let params = Params::new(1024, 2, 1, None).unwrap_or_default();
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
        let creds = AdminCredentials::new(
            Some(USERNAME.to_string()),
            hash_password_with(&argon2, PASSWORD).ok().map(SecretString::from),
        );
        assert!(creds.is_configured());

        let trials = 11;
        let mut wrong_user = Vec::with_capacity(trials);
        let mut wrong_pass = Vec::with_capacity(trials);
        for _ in 0..trials {
            let start = Instant::now();
            assert!(!creds.validate("someone-else", "guess"));
            wrong_user.push(start.elapsed());

            let start = Instant::now();
            assert!(!creds.validate(USERNAME, "guess"));
            wrong_pass.push(start.elapsed());
        }

        let wrong_user = median(wrong_user).as_secs_f64();
        let wrong_pass = median(wrong_pass).as_secs_f64();
        let ratio = wrong_user / wrong_pass;
        assert!(
            (0.5..=2.0).contains(&ratio),
            "timing ratio out of bounds: unknown user {wrong_user}s vs wrong password {wrong_pass}s"
        );
    }
}
