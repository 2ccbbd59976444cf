//! Log output and trace export settings.

use clap::{Arg, ArgAction, ArgMatches, Command, builder::ValueParser};
use tracing::Level;

pub const ARG_VERBOSITY: &str = "verbosity";
pub const ARG_LOG_FORMAT: &str = "log-format";
pub const ARG_OTLP_ENDPOINT: &str = "otlp-endpoint";
pub const ARG_OTLP_HEADERS: &str = "otlp-headers";

const LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Pretty,
    /// One JSON object per event, for log shippers.
    Json,
}

#[derive(Debug, Default)]
pub struct Options {
    /// `None` keeps the default (errors only).
    pub level: Option<Level>,
    pub format: LogFormat,
    pub otlp_endpoint: Option<String>,
    /// Raw `key=value,key=value` metadata for the OTLP exporter.
    pub otlp_headers: Option<String>,
}

impl Options {
    #[must_use]
    pub fn parse(matches: &ArgMatches) -> Self {
        let verbosity = matches.get_one::<u8>(ARG_VERBOSITY).copied().unwrap_or(0);
        let format = match matches.get_one::<String>(ARG_LOG_FORMAT).map(String::as_str) {
            Some("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        };
        let non_empty = |id: &str| {
            matches
                .get_one::<String>(id)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        Self {
            level: verbosity_level(verbosity),
            format,
            otlp_endpoint: non_empty(ARG_OTLP_ENDPOINT),
            otlp_headers: non_empty(ARG_OTLP_HEADERS),
        }
    }
}

/// Map the `-v` count to a tracing level.
const fn verbosity_level(verbosity: u8) -> Option<Level> {
    match verbosity {
        0 => None,
        1 => Some(Level::WARN),
        2 => Some(Level::INFO),
        3 => Some(Level::DEBUG),
        _ => Some(Level::TRACE),
    }
}

/// Accept `WEBPAY_LOG_LEVEL` as a level name or as the equivalent `-v` count.
#[must_use]
pub fn validator_log_level() -> ValueParser {
    ValueParser::from(|level: &str| -> Result<u8, String> {
        let level = level.trim().to_lowercase();
        LEVELS
            .iter()
            .position(|name| *name == level)
            .and_then(|index| u8::try_from(index).ok())
            .or_else(|| level.parse::<u8>().ok().filter(|count| *count <= 4))
            .ok_or_else(|| format!("invalid log level, expected one of {}", LEVELS.join(", ")))
    })
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_VERBOSITY)
                .short('v')
                .long("verbose")
                .help("Verbosity level: ERROR, WARN, INFO, DEBUG, TRACE (default: ERROR)")
                .env("WEBPAY_LOG_LEVEL")
                .global(true)
                .action(ArgAction::Count)
                .value_parser(validator_log_level()),
        )
        .arg(
            Arg::new(ARG_LOG_FORMAT)
                .long(ARG_LOG_FORMAT)
                .help("Log output format")
                .env("WEBPAY_LOG_FORMAT")
                .value_parser(["pretty", "json"])
                .default_value("pretty"),
        )
        .arg(
            Arg::new(ARG_OTLP_ENDPOINT)
                .long(ARG_OTLP_ENDPOINT)
                .help("OTLP/gRPC collector for request traces; export is off when unset")
                .env("OTEL_EXPORTER_OTLP_ENDPOINT"),
        )
        .arg(
            Arg::new(ARG_OTLP_HEADERS)
                .long(ARG_OTLP_HEADERS)
                .help("Metadata sent to the collector, as key=value pairs separated by commas")
                .env("OTEL_EXPORTER_OTLP_HEADERS")
                .hide_env_values(true),
        )
}
