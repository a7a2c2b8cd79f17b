use clap::{Arg, ArgAction, Command};

pub const CMD_BOOTSTRAP: &str = "bootstrap";
pub const ARG_USERNAME: &str = "username";
pub const ARG_PASSWORD: &str = "password";
pub const ARG_KEYWORD: &str = "keyword";
pub const ARG_ENV_FILE: &str = "env-file";
pub const ARG_FORCE: &str = "force";

pub const DEFAULT_KEYWORD: &str = "__admin_access__";
pub const DEFAULT_ENV_FILE: &str = ".env";

/// `portfolio-os bootstrap`: first-run admin setup written to an env file.
#[must_use]
pub fn subcommand() -> Command {
    Command::new(CMD_BOOTSTRAP)
        .about("Create the admin identity and session secret")
        .arg(
            Arg::new(ARG_USERNAME)
                .short('u')
                .long(ARG_USERNAME)
                .help("Admin username")
                .env("POS_BOOTSTRAP_USERNAME")
                .required(true),
        )
        .arg(
            Arg::new(ARG_PASSWORD)
                .long(ARG_PASSWORD)
                .help("Admin password, at least 8 characters")
                .env("POS_BOOTSTRAP_PASSWORD")
                .hide_env_values(true)
                .required(true),
        )
        .arg(
            Arg::new(ARG_KEYWORD)
                .short('k')
                .long(ARG_KEYWORD)
                .help("Keyword that reveals the admin login form")
                .default_value(DEFAULT_KEYWORD),
        )
        .arg(
            Arg::new(ARG_ENV_FILE)
                .long(ARG_ENV_FILE)
                .help("Env file to create or update")
                .default_value(DEFAULT_ENV_FILE),
        )
        .arg(
            Arg::new(ARG_FORCE)
                .long(ARG_FORCE)
                .help("Replace an existing admin password hash")
                .action(ArgAction::SetTrue),
        )
}
