//! # Webpay (Payment Authentication)
//!
//! `webpay` authenticates buyers for the web payment flow. It verifies
//! third-party identity proofs, binds them to a per-client session and keeps
//! the remote buyer record in step with the verified email.
//!
//! ## Identity
//!
//! Two proofs are accepted:
//!
//! - **Assertions:** short-lived signed identity assertions (BrowserID style),
//!   checked by an external verifier that returns the proven email.
//! - **Federated login:** an OAuth style authorization exchange with the
//!   Firefox Accounts authorization server.
//!
//! Either way the verified email is turned into a stable, domain-scoped user
//! identifier (`<domain>:<sha256(email)>`). Re-verification of an existing
//! session must resolve to the same identifier or it is rejected without
//! touching the session.
//!
//! ## Session
//!
//! Sessions are keyed by an opaque cookie token and hold only the fields the
//! payment flow reads: `uuid`, `logged_in_user`, `was_reverified`,
//! `super_powers`, `mkt_permissions` and the buyer PIN flags. A failed
//! verification never leaves authenticated state behind.
//!
//! ## Marketplace permissions
//!
//! When admin simulations are enabled, permission flags are copied from the
//! marketplace account service into the session on a best-effort basis. A
//! failure there never fails the login.

pub mod api;
pub mod auth;
pub mod cli;
pub mod remote;
pub mod session;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_commit_hash_format() {
        if GIT_COMMIT_HASH == "unknown" {
            // Acceptable in non-git build environments
            return;
        }
        assert!(
            GIT_COMMIT_HASH.chars().all(|c| c.is_ascii_hexdigit()),
            "GIT_COMMIT_HASH should be a hex string, got: {GIT_COMMIT_HASH}"
        );
        assert!(
            GIT_COMMIT_HASH.len() >= 7,
            "GIT_COMMIT_HASH should be at least 7 characters long, got: {GIT_COMMIT_HASH}"
        );
    }

    #[test]
    fn test_app_user_agent_format() {
        assert!(APP_USER_AGENT.starts_with(env!("CARGO_PKG_NAME")));
        assert!(APP_USER_AGENT.contains(env!("CARGO_PKG_VERSION")));
    }
}
