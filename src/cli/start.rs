use crate::cli::{actions::Action, commands, dispatch, telemetry};
use anyhow::Result;

/// Main entry point for the CLI - builds and returns the Action
///
/// # Errors
///
/// Returns an error if argument parsing, telemetry initialization, or action dispatch fails
pub fn start() -> Result<Action> {
    let matches = commands::new().get_matches();

    let logging = commands::logging::Options::parse(&matches);
    let domain = matches
        .get_one::<String>(commands::ARG_DOMAIN)
        .map(String::as_str);
    telemetry::init(&logging, domain)?;

    dispatch::handler(&matches)
}
