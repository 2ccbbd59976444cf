//! Read-only auth configuration shared by every request.

use std::collections::HashSet;

use super::bridge::normalize_email;

const DEFAULT_SESSION_TTL_SECONDS: u64 = 24 * 60 * 60;

#[derive(Clone, Debug)]
pub struct AuthConfig {
    domain: String,
    site_url: String,
    allow_admin_simulations: bool,
    users_with_super_powers: HashSet<String>,
    session_ttl_seconds: u64,
}

impl AuthConfig {
    /// Build a config for `domain`; the assertion audience defaults to
    /// `https://<domain>`.
    #[must_use]
    pub fn new(domain: String) -> Self {
        let site_url = format!("https://{domain}");
        Self {
            domain,
            site_url,
            allow_admin_simulations: false,
            users_with_super_powers: HashSet::new(),
            session_ttl_seconds: DEFAULT_SESSION_TTL_SECONDS,
        }
    }

    #[must_use]
    pub fn with_site_url(mut self, site_url: String) -> Self {
        self.site_url = site_url.trim_end_matches('/').to_string();
        self
    }

    #[must_use]
    pub fn with_allow_admin_simulations(mut self, allow: bool) -> Self {
        self.allow_admin_simulations = allow;
        self
    }

    #[must_use]
    pub fn with_users_with_super_powers<I>(mut self, users: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        self.users_with_super_powers = users
            .into_iter()
            .map(|email| normalize_email(&email))
            .filter(|email| !email.is_empty())
            .collect();
        self
    }

    #[must_use]
    pub fn with_session_ttl_seconds(mut self, seconds: u64) -> Self {
        self.session_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Audience expected inside identity assertions.
    #[must_use]
    pub fn audience(&self) -> &str {
        &self.site_url
    }

    #[must_use]
    pub fn allow_admin_simulations(&self) -> bool {
        self.allow_admin_simulations
    }

    #[must_use]
    pub fn session_ttl_seconds(&self) -> u64 {
        self.session_ttl_seconds
    }

    #[must_use]
    pub fn has_super_powers(&self, email: &str) -> bool {
        self.users_with_super_powers
            .contains(&normalize_email(email))
    }

    pub(crate) fn session_cookie_secure(&self) -> bool {
        self.site_url.starts_with("https://")
    }
}
