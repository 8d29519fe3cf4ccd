//! Firestore REST store.
//!
//! Writes go through `documents:commit` so the timestamp can be set with a
//! `REQUEST_TIME` transform; reads list a collection. JSON values are translated to and
//! from Firestore's typed value encoding (`stringValue`, `integerValue`, `mapValue`, ...).

use super::store::{DocumentStore, StoredDocument};
use crate::config::FirebaseConfig;
use crate::error::{AuraError, AuraResult};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Map, Number, Value};
use std::time::Duration;

/// Encode a JSON value as a Firestore `Value`.
pub fn encode_value(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) => match n.as_i64() {
            // integerValue is int64 transported as a string
            Some(i) => json!({ "integerValue": i.to_string() }),
            None => json!({ "doubleValue": n.as_f64().unwrap_or(0.0) }),
        },
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(items) => {
            let values: Vec<Value> = items.iter().map(encode_value).collect();
            json!({ "arrayValue": { "values": values } })
        }
        Value::Object(map) => json!({ "mapValue": { "fields": encode_fields(map) } }),
    }
}

pub fn encode_fields(fields: &Map<String, Value>) -> Map<String, Value> {
    fields
        .iter()
        .map(|(k, v)| (k.clone(), encode_value(v)))
        .collect()
}

/// Decode a Firestore `Value` into plain JSON. Timestamps and references come back as
/// strings; unknown encodings as null.
pub fn decode_value(value: &Value) -> Value {
    let Some(obj) = value.as_object() else {
        return Value::Null;
    };
    let Some((kind, inner)) = obj.iter().next() else {
        return Value::Null;
    };
    match kind.as_str() {
        "nullValue" => Value::Null,
        "booleanValue" => Value::Bool(inner.as_bool().unwrap_or(false)),
        "integerValue" => inner
            .as_str()
            .and_then(|s| s.parse::<i64>().ok())
            .or_else(|| inner.as_i64())
            .map(|i| Value::Number(i.into()))
            .unwrap_or(Value::Null),
        "doubleValue" => inner
            .as_f64()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        "stringValue" | "timestampValue" | "referenceValue" | "bytesValue" => inner.clone(),
        "arrayValue" => Value::Array(
            inner
                .get("values")
                .and_then(Value::as_array)
                .map(|vals| vals.iter().map(decode_value).collect())
                .unwrap_or_default(),
        ),
        "mapValue" => Value::Object(
            inner
                .get("fields")
                .and_then(Value::as_object)
                .map(decode_fields)
                .unwrap_or_default(),
        ),
        _ => Value::Null,
    }
}

pub fn decode_fields(fields: &Map<String, Value>) -> Map<String, Value> {
    fields
        .iter()
        .map(|(k, v)| (k.clone(), decode_value(v)))
        .collect()
}

#[derive(Deserialize)]
struct ListResponse {
    #[serde(default)]
    documents: Vec<FirestoreDocument>,
    #[serde(rename = "nextPageToken")]
    next_page_token: Option<String>,
}

#[derive(Deserialize)]
struct FirestoreDocument {
    name: String,
    #[serde(default)]
    fields: Map<String, Value>,
}

/// Firestore client for one project's `(default)` database.
pub struct FirestoreStore {
    base_url: String,
    project_id: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl FirestoreStore {
    pub fn from_config(config: &FirebaseConfig) -> AuraResult<Self> {
        let project_id = config
            .project_id()
            .ok_or_else(|| AuraError::Config("firebase.project_id is not set".into()))?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            base_url: config.firestore_base.trim_end_matches('/').to_string(),
            project_id: project_id.to_string(),
            api_key: config.api_key().map(str::to_string),
            client,
        })
    }

    /// `projects/{p}/databases/(default)/documents`
    fn database_root(&self) -> String {
        format!("projects/{}/databases/(default)/documents", self.project_id)
    }

    fn document_name(&self, collection: &str, id: &str) -> String {
        format!("{}/{}/{}", self.database_root(), collection.trim_matches('/'), id)
    }

    fn request(&self, builder: reqwest::RequestBuilder, auth: Option<&str>) -> reqwest::RequestBuilder {
        let builder = match &self.api_key {
            Some(key) => builder.query(&[("key", key.as_str())]),
            None => builder,
        };
        match auth {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn check(res: reqwest::Response) -> AuraResult<reqwest::Response> {
        if res.status().is_success() {
            return Ok(res);
        }
        let status = res.status().as_u16();
        let body = res.text().await.unwrap_or_default();
        Err(AuraError::Api {
            service: "Firestore",
            status,
            body,
        })
    }
}

/// Body of a single-document create with a server timestamp transform.
fn commit_body(name: &str, fields: &Map<String, Value>, server_timestamp_field: &str) -> Value {
    json!({
        "writes": [{
            "update": { "name": name, "fields": encode_fields(fields) },
            "updateTransforms": [{
                "fieldPath": server_timestamp_field,
                "setToServerValue": "REQUEST_TIME",
            }],
            "currentDocument": { "exists": false },
        }]
    })
}

#[async_trait]
impl DocumentStore for FirestoreStore {
    async fn append(
        &self,
        auth: Option<&str>,
        collection: &str,
        fields: Map<String, Value>,
        server_timestamp_field: &str,
    ) -> AuraResult<String> {
        let id = uuid::Uuid::new_v4().simple().to_string();
        let name = self.document_name(collection, &id);
        let url = format!("{}/{}:commit", self.base_url, self.database_root());
        let body = commit_body(&name, &fields, server_timestamp_field);
        tracing::debug!("[AURA SESSION] committing {}", name);

        let res = self
            .request(self.client.post(&url), auth)
            .json(&body)
            .send()
            .await?;
        Self::check(res).await?;
        Ok(id)
    }

    async fn list(&self, auth: Option<&str>, collection: &str) -> AuraResult<Vec<StoredDocument>> {
        let url = format!(
            "{}/{}/{}",
            self.base_url,
            self.database_root(),
            collection.trim_matches('/')
        );
        let mut out = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let mut builder = self.request(self.client.get(&url), auth);
            if let Some(token) = &page_token {
                builder = builder.query(&[("pageToken", token.as_str())]);
            }
            let res = Self::check(builder.send().await?).await?;
            let page: ListResponse = res
                .json()
                .await
                .map_err(|e| AuraError::Parse(format!("Firestore list: {}", e)))?;

            out.extend(page.documents.into_iter().map(|doc| StoredDocument {
                id: doc.name.rsplit('/').next().unwrap_or_default().to_string(),
                fields: decode_fields(&doc.fields),
            }));

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notification_fields_encode_to_typed_values() {
        let fields = json!({
            "userId": "u1",
            "read": false,
            "count": 3,
            "ratio": 0.5,
            "link": null,
            "tags": ["a"],
        });
        let encoded = encode_fields(fields.as_object().unwrap());
        assert_eq!(encoded["userId"], json!({"stringValue": "u1"}));
        assert_eq!(encoded["read"], json!({"booleanValue": false}));
        assert_eq!(encoded["count"], json!({"integerValue": "3"}));
        assert_eq!(encoded["ratio"], json!({"doubleValue": 0.5}));
        assert_eq!(encoded["link"], json!({"nullValue": null}));
        assert_eq!(
            encoded["tags"],
            json!({"arrayValue": {"values": [{"stringValue": "a"}]}})
        );
    }

    #[test]
    fn server_document_decodes_to_plain_json() {
        let stored = json!({
            "title": {"stringValue": "Check-in"},
            "timestamp": {"timestampValue": "2026-10-19T08:30:00.123456Z"},
            "meta": {"mapValue": {"fields": {"n": {"integerValue": "42"}}}},
            "weird": {"geoPointValue": {"latitude": 1.0}},
        });
        let decoded = decode_fields(stored.as_object().unwrap());
        assert_eq!(decoded["title"], "Check-in");
        assert_eq!(decoded["timestamp"], "2026-10-19T08:30:00.123456Z");
        assert_eq!(decoded["meta"], json!({"n": 42}));
        assert_eq!(decoded["weird"], Value::Null);
    }

    #[test]
    fn commit_sets_request_time_transform() {
        let mut fields = Map::new();
        fields.insert("title".into(), json!("Hi"));
        let body = commit_body("projects/p/databases/(default)/documents/users/u/notifications/x", &fields, "timestamp");
        let write = &body["writes"][0];
        assert_eq!(write["updateTransforms"][0]["fieldPath"], "timestamp");
        assert_eq!(write["updateTransforms"][0]["setToServerValue"], "REQUEST_TIME");
        assert_eq!(write["update"]["fields"]["title"]["stringValue"], "Hi");
        assert_eq!(write["currentDocument"]["exists"], false);
    }

    #[test]
    fn store_requires_project() {
        assert!(FirestoreStore::from_config(&FirebaseConfig::default()).is_err());
        let store = FirestoreStore::from_config(&FirebaseConfig {
            project_id: Some("aura".into()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(
            store.document_name("users/u1/notifications", "abc"),
            "projects/aura/databases/(default)/documents/users/u1/notifications/abc"
        );
    }
}
