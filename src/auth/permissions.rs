//! Best-effort import of marketplace permissions into the session.

use anyhow::Result;
use std::{collections::BTreeMap, future::Future, pin::Pin, sync::Arc};
use tracing::{debug, warn};

/// Permission name to granted flag, e.g. `{"admin": true, "reviewer": false}`.
pub type PermissionSet = BTreeMap<String, bool>;

/// Remote marketplace account service.
pub trait PermissionSource: Send + Sync {
    fn fetch_permissions<'a>(
        &'a self,
        uuid: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<PermissionSet>> + Send + 'a>>;
}

pub struct PermissionImporter {
    enabled: bool,
    source: Arc<dyn PermissionSource>,
}

impl PermissionImporter {
    #[must_use]
    pub fn new(enabled: bool, source: Arc<dyn PermissionSource>) -> Self {
        Self { enabled, source }
    }

    /// Fetch permissions for `uuid`.
    ///
    /// Returns `None` when the import is disabled or the remote call fails;
    /// failures are logged and never surface to the caller.
    pub async fn import_permissions(&self, uuid: &str) -> Option<PermissionSet> {
        if !self.enabled {
            return None;
        }

        match self.source.fetch_permissions(uuid).await {
            Ok(permissions) => {
                debug!("Imported {} marketplace permissions", permissions.len());
                Some(permissions)
            }
            Err(err) => {
                warn!("Marketplace permission import failed for {uuid}: {err:#}");
                None
            }
        }
    }
}
