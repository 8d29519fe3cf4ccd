//! Session/Storage gateway: Google sign-in, logout, and per-user notifications.
//!
//! Identity failures are the only errors handed back to callers. Notification delivery
//! is two independent best-effort steps (store write, OS raise) with no rollback.

pub mod firestore;
pub mod identity;
pub mod notify;
pub mod store;

pub use firestore::FirestoreStore;
pub use identity::{ConsentFlow, FirebaseIdentity, IdentityProvider, ProvidedToken, Session};
pub use notify::{HeadlessNotifier, NotificationCapability, Permission, NOTIFICATION_ICON};
pub use store::{
    collections, DocumentStore, MemoryStore, NotificationKind, NotificationRecord,
    StoredDocument, TIMESTAMP_FIELD,
};

use crate::error::AuraResult;
use serde::Serialize;
use std::sync::{Arc, RwLock};
use tracing::{error, info, warn};

/// Which side effects of [`SessionGateway::send_notification`] happened.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationDelivery {
    /// Id of the stored record; `None` when the write failed.
    pub document_id: Option<String>,
    pub os_raised: bool,
}

/// Holds one current session for the whole process. Hosts are expected to serve a
/// single local user: logout clears it for every caller and all store calls carry the
/// token of whoever signed in last.
pub struct SessionGateway {
    identity: Arc<dyn IdentityProvider>,
    store: Arc<dyn DocumentStore>,
    notifier: Arc<dyn NotificationCapability>,
    current: RwLock<Option<Session>>,
}

impl SessionGateway {
    pub fn new(
        identity: Arc<dyn IdentityProvider>,
        store: Arc<dyn DocumentStore>,
        notifier: Arc<dyn NotificationCapability>,
    ) -> Self {
        Self {
            identity,
            store,
            notifier,
            current: RwLock::new(None),
        }
    }

    /// Run the consent popup and exchange its credential. Failures are logged and
    /// returned unchanged; there is no retry.
    pub async fn sign_in_with_google(&self, consent: &dyn ConsentFlow) -> AuraResult<Session> {
        match self.identity.sign_in_with_google(consent).await {
            Ok(session) => {
                info!("[AURA SESSION] signed in user {}", session.user_id);
                *self.current.write().unwrap_or_else(|e| e.into_inner()) = Some(session.clone());
                Ok(session)
            }
            Err(e) => {
                error!("[AURA SESSION] Google sign-in failed: {}", e);
                Err(e)
            }
        }
    }

    pub fn logout(&self) {
        let previous = self.current.write().unwrap_or_else(|e| e.into_inner()).take();
        match previous {
            Some(session) => info!("[AURA SESSION] signed out user {}", session.user_id),
            None => info!("[AURA SESSION] logout with no active session"),
        }
    }

    pub fn current_session(&self) -> Option<Session> {
        self.current.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn auth_token(&self) -> Option<String> {
        self.current_session().map(|s| s.id_token)
    }

    /// Store an unread notification for `user_id` and, if permission is already granted,
    /// raise it at OS level too. Never fails; the report says what happened.
    pub async fn send_notification(
        &self,
        user_id: &str,
        title: &str,
        message: &str,
        kind: NotificationKind,
        link: Option<&str>,
    ) -> NotificationDelivery {
        let record = NotificationRecord::new(user_id, title, message, kind, link);
        let path = collections::notifications_path(user_id);
        let auth = self.auth_token();

        let written = match record.to_fields() {
            Ok(fields) => {
                self.store
                    .append(auth.as_deref(), &path, fields, TIMESTAMP_FIELD)
                    .await
            }
            Err(e) => Err(e),
        };
        let document_id = match written {
            Ok(id) => Some(id),
            Err(e) => {
                error!("[AURA SESSION] failed to store notification for {}: {}", user_id, e);
                None
            }
        };

        let os_raised = if self.notifier.permission() == Permission::Granted {
            match self.notifier.show(title, message, NOTIFICATION_ICON) {
                Ok(()) => true,
                Err(e) => {
                    warn!("[AURA SESSION] OS notification failed: {}", e);
                    false
                }
            }
        } else {
            false
        };

        NotificationDelivery {
            document_id,
            os_raised,
        }
    }

    /// Whether OS notifications may be raised, asking the user when not yet decided.
    pub async fn request_notification_permission(&self) -> bool {
        match self.notifier.permission() {
            Permission::Unsupported => false,
            Permission::Granted => true,
            Permission::Default | Permission::Denied => {
                self.notifier.request_permission().await == Permission::Granted
            }
        }
    }

    /// The user's stored notifications. Records that do not decode are skipped.
    pub async fn list_notifications(&self, user_id: &str) -> AuraResult<Vec<NotificationRecord>> {
        let path = collections::notifications_path(user_id);
        let auth = self.auth_token();
        let docs = self.store.list(auth.as_deref(), &path).await?;
        Ok(docs
            .iter()
            .filter_map(|doc| match NotificationRecord::from_document(doc) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!("[AURA SESSION] skipping notification {}: {}", doc.id, e);
                    None
                }
            })
            .collect())
    }
}
