//! Aura configuration: defaults, optional `config/aura.toml`, then `AURA_*` environment
//! (`AURA_MODEL__API_KEY`: one `_` after the prefix, `__` between nested keys).
//!
//! Secrets are never compiled in. The model key falls back to `GEMINI_API_KEY` and the
//! backend project to `FIREBASE_API_KEY` / `FIREBASE_PROJECT_ID` when the layered
//! sources leave them unset.

use crate::error::AuraResult;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_MODEL_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_FIRESTORE_BASE: &str = "https://firestore.googleapis.com/v1";
pub const DEFAULT_IDENTITY_BASE: &str = "https://identitytoolkit.googleapis.com/v1";
const DEFAULT_CONFIG_PATH: &str = "config/aura.toml";

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_model_api_base() -> String {
    DEFAULT_MODEL_API_BASE.to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_firestore_base() -> String {
    DEFAULT_FIRESTORE_BASE.to_string()
}

fn default_identity_base() -> String {
    DEFAULT_IDENTITY_BASE.to_string()
}

fn default_bind() -> String {
    "127.0.0.1:8040".to_string()
}

/// Generative model settings.
///
/// | Key | Env | Default |
/// |-----|-----|---------|
/// | model.api_key | AURA_MODEL__API_KEY, GEMINI_API_KEY | none (Degraded) |
/// | model.model | AURA_MODEL__MODEL | gemini-2.0-flash |
/// | model.api_base | AURA_MODEL__API_BASE | generativelanguage v1beta |
/// | model.timeout_secs | AURA_MODEL__TIMEOUT_SECS | 60 |
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_model_api_base")]
    pub api_base: String,
    /// Transport timeout for each request, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            api_base: default_model_api_base(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ModelConfig {
    /// Trimmed API key, `None` when unset or blank.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }
}

/// Backend-as-a-service project settings (identity toolkit + Firestore).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FirebaseConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub project_id: Option<String>,
    /// Used as the `requestUri` of the IdP exchange.
    #[serde(default)]
    pub auth_domain: Option<String>,
    #[serde(default = "default_firestore_base")]
    pub firestore_base: String,
    #[serde(default = "default_identity_base")]
    pub identity_base: String,
}

impl Default for FirebaseConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            project_id: None,
            auth_domain: None,
            firestore_base: default_firestore_base(),
            identity_base: default_identity_base(),
        }
    }
}

impl FirebaseConfig {
    pub fn api_key(&self) -> Option<&str> {
        non_blank(self.api_key.as_deref())
    }

    pub fn project_id(&self) -> Option<&str> {
        non_blank(self.project_id.as_deref())
    }
}

/// Local HTTP host settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

/// Full Aura configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuraConfig {
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub firebase: FirebaseConfig,
    #[serde(default)]
    pub gateway: GatewayConfig,
}

impl AuraConfig {
    /// Path of the optional TOML file: `AURA_CONFIG` or `config/aura.toml`.
    pub fn default_path() -> PathBuf {
        std::env::var("AURA_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH))
    }

    /// Load from the default path and the environment.
    pub fn load() -> AuraResult<Self> {
        Self::load_from(&Self::default_path())
    }

    /// Load from `path` (skipped when missing), then `AURA_*` env overrides, then the
    /// well-known secret fallbacks.
    pub fn load_from(path: &Path) -> AuraResult<Self> {
        let builder = config::Config::builder();
        let builder = if path.exists() {
            builder.add_source(config::File::from(path))
        } else {
            builder
        };

        let built = builder
            .add_source(
                config::Environment::with_prefix("AURA")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let loaded: AuraConfig = built.try_deserialize()?;
        Ok(loaded.with_env_fallbacks())
    }

    fn with_env_fallbacks(mut self) -> Self {
        if self.model.api_key().is_none() {
            self.model.api_key = env_opt_string("GEMINI_API_KEY");
        }
        if self.firebase.api_key().is_none() {
            self.firebase.api_key = env_opt_string("FIREBASE_API_KEY");
        }
        if self.firebase.project_id().is_none() {
            self.firebase.project_id = env_opt_string("FIREBASE_PROJECT_ID");
        }
        self
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn env_opt_string(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_values_override_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("aura.toml");
        std::fs::write(
            &path,
            r#"
[model]
api_key = "file-key"
timeout_secs = 15

[firebase]
project_id = "aura-test"
"#,
        )
        .unwrap();

        let cfg = AuraConfig::load_from(&path).unwrap();
        assert_eq!(cfg.model.api_key(), Some("file-key"));
        assert_eq!(cfg.model.timeout_secs, 15);
        assert_eq!(cfg.model.model, DEFAULT_MODEL);
        assert_eq!(cfg.firebase.project_id(), Some("aura-test"));
        assert_eq!(cfg.firebase.firestore_base, DEFAULT_FIRESTORE_BASE);
        assert_eq!(cfg.gateway.bind, "127.0.0.1:8040");
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = AuraConfig::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(cfg.model.api_base, DEFAULT_MODEL_API_BASE);
        assert_eq!(cfg.model.timeout_secs, 60);
    }

    #[test]
    fn single_underscore_prefix_overrides_nested_key() {
        std::env::set_var("AURA_FIREBASE__AUTH_DOMAIN", "aura-env.firebaseapp.com");
        let dir = tempfile::tempdir().unwrap();
        let cfg = AuraConfig::load_from(&dir.path().join("absent.toml")).unwrap();
        std::env::remove_var("AURA_FIREBASE__AUTH_DOMAIN");
        assert_eq!(
            cfg.firebase.auth_domain.as_deref(),
            Some("aura-env.firebaseapp.com")
        );
    }

    #[test]
    fn blank_key_counts_as_unset() {
        let cfg = ModelConfig {
            api_key: Some("   ".into()),
            ..Default::default()
        };
        assert_eq!(cfg.api_key(), None);
    }
}
