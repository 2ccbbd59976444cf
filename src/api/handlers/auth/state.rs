//! Shared auth state handed to every handler.

use std::sync::Arc;

use crate::{
    auth::{AuthConfig, AuthService},
    session::SessionStore,
};

pub struct AuthState {
    service: AuthService,
    sessions: Arc<dyn SessionStore>,
}

impl AuthState {
    #[must_use]
    pub fn new(service: AuthService, sessions: Arc<dyn SessionStore>) -> Self {
        Self { service, sessions }
    }

    #[must_use]
    pub fn service(&self) -> &AuthService {
        &self.service
    }

    #[must_use]
    pub fn sessions(&self) -> &dyn SessionStore {
        self.sessions.as_ref()
    }

    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        self.service.config()
    }
}
