//! Google sign-in: an interactive consent step yields a Google ID token, which the
//! identity provider exchanges for a backend session.

use crate::config::FirebaseConfig;
use crate::error::{AuraError, AuraResult};
use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const GOOGLE_PROVIDER: &str = "google.com";
const FALLBACK_REQUEST_URI: &str = "http://localhost";
/// Session lifetime used when the provider sends no usable `expiresIn`.
const DEFAULT_SESSION_SECS: i64 = 3600;

/// A signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub user_id: String,
    #[serde(skip_serializing)]
    pub id_token: String,
    #[serde(skip_serializing)]
    pub refresh_token: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }
}

/// The interactive popup. Fails with [`AuraError::PopupBlocked`] or
/// [`AuraError::PopupCancelled`] when the user never completes it.
#[async_trait]
pub trait ConsentFlow: Send + Sync {
    async fn google_id_token(&self) -> AuraResult<String>;
}

/// Consent already completed elsewhere (the browser ran the popup and posted the token).
#[derive(Debug, Clone)]
pub struct ProvidedToken(pub String);

#[async_trait]
impl ConsentFlow for ProvidedToken {
    async fn google_id_token(&self) -> AuraResult<String> {
        let token = self.0.trim();
        if token.is_empty() {
            return Err(AuraError::PopupCancelled);
        }
        Ok(token.to_string())
    }
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_in_with_google(&self, consent: &dyn ConsentFlow) -> AuraResult<Session>;
}

/// `accounts:signInWithIdp` reply (only the fields we keep).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignInWithIdpResponse {
    local_id: String,
    id_token: String,
    #[serde(default)]
    refresh_token: String,
    /// Seconds, sent as a string.
    #[serde(default)]
    expires_in: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    display_name: Option<String>,
}

impl SignInWithIdpResponse {
    fn into_session(self, now: DateTime<Utc>) -> Session {
        let lifetime = self
            .expires_in
            .as_deref()
            .and_then(|s| s.trim().parse::<i64>().ok())
            .filter(|secs| *secs > 0)
            .and_then(ChronoDuration::try_seconds);
        let expires_at = lifetime
            .and_then(|d| now.checked_add_signed(d))
            .unwrap_or(now + ChronoDuration::seconds(DEFAULT_SESSION_SECS));
        Session {
            user_id: self.local_id,
            id_token: self.id_token,
            refresh_token: self.refresh_token,
            email: self.email,
            display_name: self.display_name,
            expires_at,
        }
    }
}

/// Identity toolkit client that trades a Google ID token for a backend session.
pub struct FirebaseIdentity {
    api_key: String,
    base_url: String,
    request_uri: String,
    client: reqwest::Client,
}

impl FirebaseIdentity {
    pub fn from_config(config: &FirebaseConfig) -> AuraResult<Self> {
        let api_key = config
            .api_key()
            .ok_or_else(|| AuraError::Config("firebase.api_key is not set".into()))?;
        let request_uri = config
            .auth_domain
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(|d| {
                if d.starts_with("http") {
                    d.to_string()
                } else {
                    format!("https://{}", d)
                }
            })
            .unwrap_or_else(|| FALLBACK_REQUEST_URI.to_string());
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            api_key: api_key.to_string(),
            base_url: config.identity_base.trim_end_matches('/').to_string(),
            request_uri,
            client,
        })
    }

    fn sign_in_body(&self, google_id_token: &str) -> serde_json::Value {
        serde_json::json!({
            "postBody": format!("id_token={}&providerId={}", google_id_token, GOOGLE_PROVIDER),
            "requestUri": self.request_uri,
            "returnSecureToken": true,
            "returnIdpCredential": true,
        })
    }
}

#[async_trait]
impl IdentityProvider for FirebaseIdentity {
    async fn sign_in_with_google(&self, consent: &dyn ConsentFlow) -> AuraResult<Session> {
        let google_token = consent.google_id_token().await?;
        let url = format!("{}/accounts:signInWithIdp", self.base_url);
        tracing::debug!("[AURA SESSION] exchanging Google credential at {}", url);

        let res = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&self.sign_in_body(&google_token))
            .send()
            .await
            .map_err(|e| AuraError::Identity(format!("identity request failed: {}", e)))?;

        if !res.status().is_success() {
            let status = res.status().as_u16();
            let body = res.text().await.unwrap_or_default();
            return Err(AuraError::Identity(format!(
                "identity provider returned {}: {}",
                status, body
            )));
        }

        let reply: SignInWithIdpResponse = res
            .json()
            .await
            .map_err(|e| AuraError::Identity(format!("unreadable identity reply: {}", e)))?;
        Ok(reply.into_session(Utc::now()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idp_reply_becomes_session() {
        let reply: SignInWithIdpResponse = serde_json::from_str(
            r#"{
                "federatedId": "https://accounts.google.com/1234",
                "providerId": "google.com",
                "localId": "uid-42",
                "email": "asha@example.com",
                "displayName": "Asha",
                "idToken": "backend-token",
                "refreshToken": "refresh",
                "expiresIn": "3600"
            }"#,
        )
        .unwrap();
        let now = Utc::now();
        let session = reply.into_session(now);
        assert_eq!(session.user_id, "uid-42");
        assert_eq!(session.id_token, "backend-token");
        assert_eq!(session.display_name.as_deref(), Some("Asha"));
        assert_eq!(session.expires_at, now + ChronoDuration::seconds(3600));
        assert!(!session.is_expired());
    }

    #[test]
    fn out_of_range_expiry_uses_default_lifetime() {
        let now = Utc::now();
        for expires in ["9223372036854775807", "-5", "soon"] {
            let reply: SignInWithIdpResponse = serde_json::from_value(serde_json::json!({
                "localId": "u",
                "idToken": "t",
                "expiresIn": expires,
            }))
            .unwrap();
            let session = reply.into_session(now);
            assert_eq!(
                session.expires_at,
                now + ChronoDuration::seconds(DEFAULT_SESSION_SECS),
                "expiresIn={}",
                expires
            );
        }
    }

    #[test]
    fn session_never_serializes_tokens() {
        let session = Session {
            user_id: "u".into(),
            id_token: "secret-id".into(),
            refresh_token: "secret-refresh".into(),
            email: None,
            display_name: None,
            expires_at: Utc::now(),
        };
        let json = serde_json::to_string(&session).unwrap();
        assert!(json.contains("\"userId\":\"u\""));
        assert!(!json.contains("secret"));
    }

    #[tokio::test]
    async fn blank_provided_token_counts_as_cancelled() {
        let err = ProvidedToken("  ".into()).google_id_token().await.unwrap_err();
        assert!(matches!(err, AuraError::PopupCancelled));
        assert_eq!(
            ProvidedToken(" tok ".into()).google_id_token().await.unwrap(),
            "tok"
        );
    }

    #[test]
    fn identity_needs_api_key_and_uses_auth_domain() {
        assert!(matches!(
            FirebaseIdentity::from_config(&FirebaseConfig::default()),
            Err(AuraError::Config(_))
        ));
        let identity = FirebaseIdentity::from_config(&FirebaseConfig {
            api_key: Some("k".into()),
            auth_domain: Some("aura.firebaseapp.com".into()),
            ..Default::default()
        })
        .unwrap();
        let body = identity.sign_in_body("gtok");
        assert_eq!(body["postBody"], "id_token=gtok&providerId=google.com");
        assert_eq!(body["requestUri"], "https://aura.firebaseapp.com");
        assert_eq!(body["returnSecureToken"], true);
    }
}
