//! Per-client session state.
//!
//! The session is a small key/value document. Presence matters: an absent
//! `was_reverified` means the client never re-proved its identity, while
//! `super_powers` is always written as a boolean after a federated login.
//! Every field is therefore optional and absent keys are skipped on
//! serialization.
//!
//! Every key describes the account held in `uuid`. Markers earned by one
//! account are dropped as soon as the session changes hands.

mod store;

pub use store::{MemorySessionStore, SessionStore, StoreFuture, generate_session_token};

use serde::{Deserialize, Serialize};

use crate::auth::{BuyerRecord, PermissionSet};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Domain-scoped user identifier, `<domain>:<hash>`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    /// Verified email of the session owner.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logged_in_user: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub was_reverified: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub super_powers: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mkt_permissions: Option<PermissionSet>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid_has_pin: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid_needs_pin_reset: Option<bool>,
}

impl Session {
    /// Both the identifier and the owner email are present.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.uuid.is_some() && self.logged_in_user.is_some()
    }

    /// No key is set at all; such sessions are not worth persisting.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Drop the identity together with the markers it earned.
    pub fn clear_identity(&mut self) {
        self.uuid = None;
        self.logged_in_user = None;
        self.was_reverified = None;
        self.super_powers = None;
        self.mkt_permissions = None;
        self.uuid_has_pin = None;
        self.uuid_needs_pin_reset = None;
    }

    /// Bind `uuid` to the session. Switching to another account first drops
    /// the markers and permissions of the previous one.
    pub(crate) fn set_identity(&mut self, uuid: String, email: String, buyer: &BuyerRecord) {
        if self.uuid.as_deref() != Some(uuid.as_str()) {
            self.was_reverified = None;
            self.super_powers = None;
            self.mkt_permissions = None;
        }
        self.uuid = Some(uuid);
        self.logged_in_user = Some(email);
        self.uuid_has_pin = Some(buyer.pin_set);
        self.uuid_needs_pin_reset = Some(buyer.needs_pin_reset);
    }
}
