use crate::{
    api::{self, handlers::auth::AuthState},
    auth::{AuthConfig, AuthService},
    cli::telemetry,
    remote::{BrowserIdVerifier, FxaClient, MarketplaceClient, SolitudeClient},
    session::MemorySessionStore,
};
use anyhow::Result;
use secrecy::SecretString;
use std::{sync::Arc, time::Duration};
use tracing::{debug, info};

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub domain: String,
    pub site_url: String,
    pub browserid_verify_url: String,
    pub solitude_url: String,
    pub marketplace_url: String,
    pub fxa_oauth_url: String,
    pub fxa_client_id: String,
    pub fxa_client_secret: SecretString,
    pub allow_admin_simulations: bool,
    pub users_with_super_powers: Vec<String>,
    pub session_ttl_seconds: u64,
}

impl Args {
    fn auth_config(&self) -> AuthConfig {
        AuthConfig::new(self.domain.clone())
            .with_site_url(self.site_url.clone())
            .with_allow_admin_simulations(self.allow_admin_simulations)
            .with_users_with_super_powers(self.users_with_super_powers.clone())
            .with_session_ttl_seconds(self.session_ttl_seconds)
    }

    fn auth_state(self) -> Result<AuthState> {
        let config = self.auth_config();
        let service = AuthService::new(
            config,
            Arc::new(BrowserIdVerifier::new(&self.browserid_verify_url)?),
            Arc::new(SolitudeClient::new(&self.solitude_url)?),
            Arc::new(MarketplaceClient::new(&self.marketplace_url)?),
            Arc::new(FxaClient::new(
                &self.fxa_oauth_url,
                self.fxa_client_id,
                self.fxa_client_secret,
            )?),
        );
        let sessions = Arc::new(MemorySessionStore::new(Duration::from_secs(
            self.session_ttl_seconds,
        )));
        Ok(AuthState::new(service, sessions))
    }
}

/// Execute the server action.
/// # Errors
/// Returns an error if a remote client cannot be built or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    debug!("Server args: {:?}", args);
    info!(
        "Starting {} for {} (admin simulations: {})",
        env!("CARGO_PKG_NAME"),
        args.domain,
        args.allow_admin_simulations
    );

    let port = args.port;
    let auth_state = Arc::new(args.auth_state()?);
    let result = api::new(port, auth_state).await;

    telemetry::shutdown_tracer();

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> Args {
        Args {
            port: 8080,
            domain: "web.pay".to_string(),
            site_url: "http://localhost:2601".to_string(),
            browserid_verify_url: "https://verifier.login.persona.org/verify".to_string(),
            solitude_url: "http://solitude.tld:2602".to_string(),
            marketplace_url: "https://marketplace.tld".to_string(),
            fxa_oauth_url: "https://oauth.accounts.firefox.com".to_string(),
            fxa_client_id: "client-id".to_string(),
            fxa_client_secret: SecretString::from("client-secret".to_string()),
            allow_admin_simulations: true,
            users_with_super_powers: vec!["tom@myspace.com".to_string()],
            session_ttl_seconds: 60,
        }
    }

    #[test]
    fn auth_config_from_args() {
        let config = args().auth_config();
        assert_eq!(config.domain(), "web.pay");
        assert_eq!(config.audience(), "http://localhost:2601");
        assert!(config.allow_admin_simulations());
        assert!(config.has_super_powers("tom@myspace.com"));
        assert_eq!(config.session_ttl_seconds(), 60);
    }

    #[test]
    fn auth_state_builds_clients() {
        let state = args().auth_state();
        assert!(state.is_ok());
    }

    #[test]
    fn invalid_service_url_fails() {
        let mut args = args();
        args.solitude_url = "ftp://solitude.tld".to_string();
        assert!(args.auth_state().is_err());
    }
}
