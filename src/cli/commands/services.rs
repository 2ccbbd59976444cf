//! Remote collaborator endpoints.

use anyhow::{Context, bail};
use clap::{Arg, ArgMatches, Command};
use secrecy::SecretString;
use url::Url;

use crate::remote::{browserid::DEFAULT_VERIFY_URL, fxa::DEFAULT_OAUTH_URL};

pub const ARG_BROWSERID_VERIFY_URL: &str = "browserid-verify-url";
pub const ARG_SOLITUDE_URL: &str = "solitude-url";
pub const ARG_MARKETPLACE_URL: &str = "marketplace-url";
pub const ARG_FXA_OAUTH_URL: &str = "fxa-oauth-url";
pub const ARG_FXA_CLIENT_ID: &str = "fxa-client-id";
pub const ARG_FXA_CLIENT_SECRET: &str = "fxa-client-secret";

#[derive(Debug)]
pub struct Options {
    pub browserid_verify_url: String,
    pub solitude_url: String,
    pub marketplace_url: String,
    pub fxa_oauth_url: String,
    pub fxa_client_id: String,
    pub fxa_client_secret: SecretString,
}

impl Options {
    /// Parse remote service arguments from matches.
    ///
    /// # Errors
    /// Returns an error if a required argument is missing or a URL is invalid.
    pub fn parse(matches: &ArgMatches) -> anyhow::Result<Self> {
        let fxa_client_secret = required(matches, ARG_FXA_CLIENT_SECRET)?;

        Ok(Self {
            browserid_verify_url: url_arg(matches, ARG_BROWSERID_VERIFY_URL)?,
            solitude_url: url_arg(matches, ARG_SOLITUDE_URL)?,
            marketplace_url: url_arg(matches, ARG_MARKETPLACE_URL)?,
            fxa_oauth_url: url_arg(matches, ARG_FXA_OAUTH_URL)?,
            fxa_client_id: required(matches, ARG_FXA_CLIENT_ID)?,
            fxa_client_secret: SecretString::from(fxa_client_secret),
        })
    }
}

/// Fetch an argument, treating empty strings (e.g. `ENV=""`) as missing.
pub(crate) fn required(matches: &ArgMatches, id: &str) -> anyhow::Result<String> {
    match matches.get_one::<String>(id) {
        Some(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
        _ => bail!("missing required argument: --{id}"),
    }
}

pub(crate) fn url_arg(matches: &ArgMatches, id: &str) -> anyhow::Result<String> {
    let value = required(matches, id)?;
    Url::parse(&value).with_context(|| format!("invalid URL for --{id}: {value}"))?;
    Ok(value)
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_BROWSERID_VERIFY_URL)
                .long(ARG_BROWSERID_VERIFY_URL)
                .help("Identity assertion verifier URL")
                .env("WEBPAY_BROWSERID_VERIFY_URL")
                .default_value(DEFAULT_VERIFY_URL),
        )
        .arg(
            Arg::new(ARG_SOLITUDE_URL)
                .long(ARG_SOLITUDE_URL)
                .help("Buyer account service base URL")
                .env("WEBPAY_SOLITUDE_URL"),
        )
        .arg(
            Arg::new(ARG_MARKETPLACE_URL)
                .long(ARG_MARKETPLACE_URL)
                .help("Marketplace account service base URL, used for permission import")
                .env("WEBPAY_MARKETPLACE_URL"),
        )
        .arg(
            Arg::new(ARG_FXA_OAUTH_URL)
                .long(ARG_FXA_OAUTH_URL)
                .help("Firefox Accounts OAuth server URL")
                .env("WEBPAY_FXA_OAUTH_URL")
                .default_value(DEFAULT_OAUTH_URL),
        )
        .arg(
            Arg::new(ARG_FXA_CLIENT_ID)
                .long(ARG_FXA_CLIENT_ID)
                .help("Firefox Accounts OAuth client id")
                .env("WEBPAY_FXA_CLIENT_ID"),
        )
        .arg(
            Arg::new(ARG_FXA_CLIENT_SECRET)
                .long(ARG_FXA_CLIENT_SECRET)
                .help("Firefox Accounts OAuth client secret")
                .env("WEBPAY_FXA_CLIENT_SECRET")
                .hide_env_values(true),
        )
}
