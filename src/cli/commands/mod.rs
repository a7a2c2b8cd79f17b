pub mod auth;
pub mod bootstrap;
pub mod logging;

use clap::{
    Arg, ColorChoice, Command,
    builder::styling::{AnsiColor, Effects, Styles},
};

pub const ARG_PORT: &str = "port";

#[must_use]
pub fn new() -> Command {
    let bold = Effects::BOLD;
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | bold)
        .usage(AnsiColor::Green.on_default() | bold)
        .literal(AnsiColor::Blue.on_default() | bold)
        .placeholder(AnsiColor::Green.on_default());

    // `--version` prints the commit too.
    let long_version: &'static str = Box::leak(
        format!("{} - {}", env!("CARGO_PKG_VERSION"), crate::GIT_COMMIT_HASH).into_boxed_str(),
    );

    let command = Command::new("portfolio-os")
        .about("Admin session gate for the Portfolio OS site")
        .version(env!("CARGO_PKG_VERSION"))
        .long_version(long_version)
        .color(ColorChoice::Auto)
        .styles(styles)
        .arg(
            Arg::new(ARG_PORT)
                .short('p')
                .long(ARG_PORT)
                .help("Port to listen on")
                .default_value("8080")
                .env("POS_PORT")
                .value_parser(clap::value_parser!(u16)),
        )
        .subcommand(bootstrap::subcommand());

    logging::with_args(auth::with_args(command))
}
