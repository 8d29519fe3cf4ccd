//! Runtime notification capability (OS-level toasts), injected so it can be faked.

use crate::error::AuraResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Icon shown on OS-level notifications.
pub const NOTIFICATION_ICON: &str = "/favicon.ico";

/// Notification permission as reported by the runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    /// The runtime has no notification API at all.
    Unsupported,
    /// Supported but the user has not been asked yet.
    Default,
    Denied,
    Granted,
}

#[async_trait]
pub trait NotificationCapability: Send + Sync {
    fn permission(&self) -> Permission;

    /// Ask the user once. Returns the resulting permission.
    async fn request_permission(&self) -> Permission;

    /// Raise an OS-level notification. Callers check [`Permission::Granted`] first.
    fn show(&self, title: &str, body: &str, icon: &str) -> AuraResult<()>;
}

/// Capability for hosts without a notification runtime (servers, CLIs).
#[derive(Debug, Default, Clone, Copy)]
pub struct HeadlessNotifier;

#[async_trait]
impl NotificationCapability for HeadlessNotifier {
    fn permission(&self) -> Permission {
        Permission::Unsupported
    }

    async fn request_permission(&self) -> Permission {
        Permission::Unsupported
    }

    fn show(&self, _title: &str, _body: &str, _icon: &str) -> AuraResult<()> {
        Ok(())
    }
}
