use clap::{Arg, ArgMatches, Command, builder::BoolishValueParser};

pub const ARG_ALLOW_ADMIN_SIMULATIONS: &str = "allow-admin-simulations";
pub const ARG_USERS_WITH_SUPER_POWERS: &str = "users-with-super-powers";
pub const ARG_SESSION_TTL_SECONDS: &str = "session-ttl-seconds";

#[derive(Debug)]
pub struct Options {
    pub allow_admin_simulations: bool,
    pub users_with_super_powers: Vec<String>,
    pub session_ttl_seconds: u64,
}

impl Options {
    /// # Errors
    /// Returns an error if the session TTL is zero.
    pub fn parse(matches: &ArgMatches) -> anyhow::Result<Self> {
        let session_ttl_seconds = matches
            .get_one::<u64>(ARG_SESSION_TTL_SECONDS)
            .copied()
            .unwrap_or(86_400);
        if session_ttl_seconds == 0 {
            anyhow::bail!("--{ARG_SESSION_TTL_SECONDS} must be greater than zero");
        }

        Ok(Self {
            allow_admin_simulations: matches
                .get_one::<bool>(ARG_ALLOW_ADMIN_SIMULATIONS)
                .copied()
                .unwrap_or(false),
            users_with_super_powers: matches
                .get_many::<String>(ARG_USERS_WITH_SUPER_POWERS)
                .map(|users| {
                    users
                        .map(|user| user.trim().to_string())
                        .filter(|user| !user.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
            session_ttl_seconds,
        })
    }
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_ALLOW_ADMIN_SIMULATIONS)
                .long(ARG_ALLOW_ADMIN_SIMULATIONS)
                .help("Import marketplace permissions into the session on login")
                .env("WEBPAY_ALLOW_ADMIN_SIMULATIONS")
                .num_args(0..=1)
                .default_value("false")
                .default_missing_value("true")
                .value_parser(BoolishValueParser::new()),
        )
        .arg(
            Arg::new(ARG_USERS_WITH_SUPER_POWERS)
                .long(ARG_USERS_WITH_SUPER_POWERS)
                .help("Comma separated emails granted super powers on federated login")
                .env("WEBPAY_USERS_WITH_SUPER_POWERS")
                .value_delimiter(','),
        )
        .arg(
            Arg::new(ARG_SESSION_TTL_SECONDS)
                .long(ARG_SESSION_TTL_SECONDS)
                .help("Idle session lifetime in seconds")
                .env("WEBPAY_SESSION_TTL_SECONDS")
                .default_value("86400")
                .value_parser(clap::value_parser!(u64)),
        )
}
