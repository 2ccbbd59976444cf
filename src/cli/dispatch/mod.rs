//! Map validated CLI arguments to an action.

use crate::cli::actions::{Action, server::Args};
use crate::cli::commands::{ARG_DOMAIN, ARG_PORT, ARG_SITE_URL, auth, services};
use anyhow::Result;

/// Map validated CLI matches to a server action.
///
/// # Errors
/// Returns an error if required arguments are missing or inconsistent.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>(ARG_PORT).copied().unwrap_or(8080);
    let domain = services::required(matches, ARG_DOMAIN)?;
    let site_url = if matches.get_one::<String>(ARG_SITE_URL).is_some() {
        services::url_arg(matches, ARG_SITE_URL)?
    } else {
        format!("https://{domain}")
    };

    let services = services::Options::parse(matches)?;
    let auth = auth::Options::parse(matches)?;

    Ok(Action::Server(Args {
        port,
        domain,
        site_url,
        browserid_verify_url: services.browserid_verify_url,
        solitude_url: services.solitude_url,
        marketplace_url: services.marketplace_url,
        fxa_oauth_url: services.fxa_oauth_url,
        fxa_client_id: services.fxa_client_id,
        fxa_client_secret: services.fxa_client_secret,
        allow_admin_simulations: auth.allow_admin_simulations,
        users_with_super_powers: auth.users_with_super_powers,
        session_ttl_seconds: auth.session_ttl_seconds,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    const BASE_ENV: [(&str, Option<&str>); 7] = [
        ("WEBPAY_DOMAIN", Some("web.pay")),
        ("WEBPAY_SITE_URL", None),
        ("WEBPAY_SOLITUDE_URL", Some("http://solitude.tld:2602")),
        ("WEBPAY_MARKETPLACE_URL", Some("https://marketplace.tld")),
        ("WEBPAY_FXA_CLIENT_ID", Some("client-id")),
        ("WEBPAY_FXA_CLIENT_SECRET", Some("client-secret")),
        ("WEBPAY_USERS_WITH_SUPER_POWERS", None),
    ];

    fn dispatch(args: &[&str]) -> Result<Action> {
        let matches = crate::cli::commands::new().try_get_matches_from(args)?;
        handler(&matches)
    }

    #[test]
    fn server_args_from_env() {
        temp_env::with_vars(BASE_ENV, || {
            let result = dispatch(&["webpay"]);
            assert!(result.is_ok(), "{result:?}");
            if let Ok(Action::Server(args)) = result {
                assert_eq!(args.port, 8080);
                assert_eq!(args.domain, "web.pay");
                assert_eq!(args.site_url, "https://web.pay");
                assert_eq!(args.solitude_url, "http://solitude.tld:2602");
                assert_eq!(args.fxa_client_secret.expose_secret(), "client-secret");
                assert!(!args.allow_admin_simulations);
                assert!(args.users_with_super_powers.is_empty());
                assert!(!format!("{args:?}").contains("client-secret"));
            }
        });
    }

    #[test]
    fn site_url_overrides_audience() {
        temp_env::with_vars(BASE_ENV, || {
            let result = dispatch(&["webpay", "--site-url", "http://localhost:2601"]);
            assert!(
                matches!(result, Ok(Action::Server(ref args)) if args.site_url == "http://localhost:2601")
            );
        });
    }

    #[test]
    fn solitude_url_required() {
        temp_env::with_vars(BASE_ENV, || {
            temp_env::with_var("WEBPAY_SOLITUDE_URL", None::<&str>, || {
                let result = dispatch(&["webpay"]);
                assert!(result.is_err());
                if let Err(err) = result {
                    assert!(
                        err.to_string()
                            .contains("missing required argument: --solitude-url")
                    );
                }
            });
        });
    }

    #[test]
    fn invalid_url_is_rejected() {
        temp_env::with_vars(BASE_ENV, || {
            let result = dispatch(&["webpay", "--marketplace-url", "not a url"]);
            assert!(result.is_err());
            if let Err(err) = result {
                assert!(err.to_string().contains("--marketplace-url"));
            }
        });
    }

    #[test]
    fn zero_session_ttl_is_rejected() {
        temp_env::with_vars(BASE_ENV, || {
            let result = dispatch(&["webpay", "--session-ttl-seconds", "0"]);
            assert!(result.is_err());
        });
    }
}
