//! Document store seam and the notification record it holds.
//!
//! Collections are addressed by slash paths such as `users/{uid}/notifications`.
//! Access rules live server-side; a store just reports what the backend rejected.

use crate::error::{AuraError, AuraResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Top-level collection names used by the app.
pub mod collections {
    pub const USERS: &str = "users";
    pub const JOURNALS: &str = "journals";
    pub const CHECKINS: &str = "dailyCheckins";
    pub const CAMPFIRES: &str = "campfires";
    pub const MESSAGES: &str = "messages";
    pub const METRICS: &str = "adminMetrics";
    pub const NOTIFICATIONS: &str = "notifications";

    /// `users/{user_id}/notifications`
    pub fn notifications_path(user_id: &str) -> String {
        format!("{}/{}/{}", USERS, user_id, NOTIFICATIONS)
    }
}

/// Field that receives the server-assigned write time on notification records.
pub const TIMESTAMP_FIELD: &str = "timestamp";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Alert,
    Message,
    Success,
    #[default]
    Info,
}

/// In-app notification as stored under `users/{uid}/notifications/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationRecord {
    /// Document id; not part of the stored fields.
    #[serde(skip_serializing, default)]
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub message: String,
    #[serde(rename = "type", default)]
    pub kind: NotificationKind,
    #[serde(default)]
    pub read: bool,
    /// Server write time; absent until the backend has stamped it.
    #[serde(skip_serializing, default)]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub link: Option<String>,
}

impl NotificationRecord {
    /// New unread record with no id or timestamp yet.
    pub fn new(
        user_id: &str,
        title: &str,
        message: &str,
        kind: NotificationKind,
        link: Option<&str>,
    ) -> Self {
        Self {
            id: String::new(),
            user_id: user_id.to_string(),
            title: title.to_string(),
            message: message.to_string(),
            kind,
            read: false,
            timestamp: None,
            link: link.map(str::to_string),
        }
    }

    /// Stored fields (`link` written as explicit null when absent).
    pub fn to_fields(&self) -> AuraResult<Map<String, Value>> {
        match serde_json::to_value(self)? {
            Value::Object(map) => Ok(map),
            other => Err(AuraError::Store(format!(
                "notification encoded as non-object: {}",
                other
            ))),
        }
    }

    /// Rebuild from a stored document.
    pub fn from_document(doc: &StoredDocument) -> AuraResult<Self> {
        let mut record: NotificationRecord =
            serde_json::from_value(Value::Object(doc.fields.clone()))?;
        record.id = doc.id.clone();
        Ok(record)
    }
}

/// A document read back from a collection.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    pub id: String,
    pub fields: Map<String, Value>,
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Append a new document to `collection`, stamping `server_timestamp_field` with the
    /// store's clock. `auth` is the caller's ID token when signed in. Returns the new id.
    async fn append(
        &self,
        auth: Option<&str>,
        collection: &str,
        fields: Map<String, Value>,
        server_timestamp_field: &str,
    ) -> AuraResult<String>;

    /// All documents of `collection`.
    async fn list(&self, auth: Option<&str>, collection: &str) -> AuraResult<Vec<StoredDocument>>;
}

/// In-process store for tests and keyless development. Timestamps are RFC 3339 strings
/// from the local clock.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: DashMap<String, Vec<StoredDocument>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents currently in `collection`.
    pub fn len(&self, collection: &str) -> usize {
        self.collections.get(collection).map(|c| c.len()).unwrap_or(0)
    }

    pub fn is_empty(&self, collection: &str) -> bool {
        self.len(collection) == 0
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn append(
        &self,
        _auth: Option<&str>,
        collection: &str,
        mut fields: Map<String, Value>,
        server_timestamp_field: &str,
    ) -> AuraResult<String> {
        let id = uuid::Uuid::new_v4().simple().to_string();
        fields.insert(
            server_timestamp_field.to_string(),
            Value::String(Utc::now().to_rfc3339()),
        );
        self.collections
            .entry(collection.to_string())
            .or_default()
            .push(StoredDocument {
                id: id.clone(),
                fields,
            });
        Ok(id)
    }

    async fn list(&self, _auth: Option<&str>, collection: &str) -> AuraResult<Vec<StoredDocument>> {
        Ok(self
            .collections
            .get(collection)
            .map(|c| c.value().clone())
            .unwrap_or_default())
    }
}
