//! Error types for the Aura gateways.

use thiserror::Error;

/// Result type alias for gateway operations
pub type AuraResult<T> = Result<T, AuraError>;

/// Errors raised inside the gateways. Insight operations fold every one of these into a
/// fallback value; sign-in is the one place where a failure reaches the caller.
#[derive(Error, Debug)]
pub enum AuraError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Model client unavailable: {0}")]
    ClientUnavailable(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{service} API error {status}: {body}")]
    Api {
        service: &'static str,
        status: u16,
        body: String,
    },

    #[error("Response parse error: {0}")]
    Parse(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Sign-in popup was blocked")]
    PopupBlocked,

    #[error("Sign-in was cancelled")]
    PopupCancelled,

    #[error("Identity error: {0}")]
    Identity(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Notification error: {0}")]
    Notification(String),
}

impl AuraError {
    /// Failures of the interactive sign-in flow. These are the only errors the
    /// session gateway hands back to its caller.
    pub fn is_identity_failure(&self) -> bool {
        matches!(
            self,
            AuraError::PopupBlocked | AuraError::PopupCancelled | AuraError::Identity(_)
        )
    }
}

impl From<config::ConfigError> for AuraError {
    fn from(err: config::ConfigError) -> Self {
        AuraError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn popup_failures_are_identity_failures() {
        assert!(AuraError::PopupBlocked.is_identity_failure());
        assert!(AuraError::PopupCancelled.is_identity_failure());
        assert!(!AuraError::Store("denied".into()).is_identity_failure());
    }

    #[test]
    fn api_error_renders_service_and_status() {
        let err = AuraError::Api {
            service: "Gemini",
            status: 429,
            body: "quota".into(),
        };
        assert_eq!(err.to_string(), "Gemini API error 429: quota");
    }
}
