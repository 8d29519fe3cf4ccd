//! Client handle state machine shared by every insight operation.
//!
//! ```text
//!   Uninitialized ──connect ok──▶ Ready ◀──call ok──┐
//!        │                          │               │
//!   connect err                 call err            │
//!        ▼                          ▼               │
//!   Degraded (no handle)      Degraded (handle) ────┘
//! ```
//!
//! A missing handle is rebuilt at the start of the next call. An existing handle is
//! always used, even after a failed call. There is no backoff and no circuit breaker.

use super::{FallbackReason, Insight};
use crate::config::ModelConfig;
use crate::error::{AuraError, AuraResult};
use crate::gemini_service::{GeminiBridge, GenerateRequest, ModelBackend};
use std::sync::{Arc, RwLock};
use tracing::{info, warn};

type Connector = dyn Fn() -> AuraResult<Arc<dyn ModelBackend>> + Send + Sync;

/// Public view of the client state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientStatus {
    Uninitialized,
    Ready,
    Degraded,
}

enum ClientState {
    Uninitialized,
    Ready(Arc<dyn ModelBackend>),
    Degraded {
        handle: Option<Arc<dyn ModelBackend>>,
        reason: String,
    },
}

impl ClientState {
    fn handle(&self) -> Option<Arc<dyn ModelBackend>> {
        match self {
            ClientState::Ready(h) => Some(Arc::clone(h)),
            ClientState::Degraded { handle, .. } => handle.clone(),
            ClientState::Uninitialized => None,
        }
    }
}

/// Context object for the insight operations. Build once, share behind `Arc`.
pub struct InsightGateway {
    connector: Box<Connector>,
    state: RwLock<ClientState>,
}

impl InsightGateway {
    /// Gateway backed by Gemini. Connection is attempted immediately; without an API key
    /// the gateway starts Degraded and every call returns its offline default.
    pub fn new(config: &ModelConfig) -> Self {
        let config = config.clone();
        Self::with_connector(move || {
            GeminiBridge::from_config(&config).map(|b| Arc::new(b) as Arc<dyn ModelBackend>)
        })
    }

    /// Gateway that rebuilds its client with `connector` whenever it has none.
    pub fn with_connector<F>(connector: F) -> Self
    where
        F: Fn() -> AuraResult<Arc<dyn ModelBackend>> + Send + Sync + 'static,
    {
        let gateway = Self {
            connector: Box::new(connector),
            state: RwLock::new(ClientState::Uninitialized),
        };
        gateway.ensure_client();
        gateway
    }

    /// Gateway around an already-built backend.
    pub fn with_backend(backend: Arc<dyn ModelBackend>) -> Self {
        Self::with_connector(move || Ok(Arc::clone(&backend)))
    }

    /// Gateway that never has a client.
    pub fn offline() -> Self {
        Self::with_connector(|| Err(AuraError::ClientUnavailable("offline mode".into())))
    }

    pub fn status(&self) -> ClientStatus {
        match &*self.read_state() {
            ClientState::Uninitialized => ClientStatus::Uninitialized,
            ClientState::Ready(_) => ClientStatus::Ready,
            ClientState::Degraded { .. } => ClientStatus::Degraded,
        }
    }

    /// Last recorded degradation reason, if degraded.
    pub fn degraded_reason(&self) -> Option<String> {
        match &*self.read_state() {
            ClientState::Degraded { reason, .. } => Some(reason.clone()),
            _ => None,
        }
    }

    fn read_state(&self) -> std::sync::RwLockReadGuard<'_, ClientState> {
        self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_state(&self) -> std::sync::RwLockWriteGuard<'_, ClientState> {
        self.state.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Current handle, building one if there is none. Concurrent callers may both build;
    /// the last one wins and the loser's handle is simply dropped.
    fn ensure_client(&self) -> Option<Arc<dyn ModelBackend>> {
        if let Some(handle) = self.read_state().handle() {
            return Some(handle);
        }
        match (self.connector)() {
            Ok(handle) => {
                info!("[AURA AI] model client initialized");
                *self.write_state() = ClientState::Ready(Arc::clone(&handle));
                Some(handle)
            }
            Err(e) => {
                warn!("[AURA AI] model client initialization failed: {}", e);
                *self.write_state() = ClientState::Degraded {
                    handle: None,
                    reason: e.to_string(),
                };
                None
            }
        }
    }

    fn mark_ready(&self, handle: &Arc<dyn ModelBackend>) {
        let mut state = self.write_state();
        if !matches!(*state, ClientState::Ready(_)) {
            *state = ClientState::Ready(Arc::clone(handle));
        }
    }

    fn mark_degraded(&self, handle: &Arc<dyn ModelBackend>, reason: &str) {
        *self.write_state() = ClientState::Degraded {
            handle: Some(Arc::clone(handle)),
            reason: reason.to_string(),
        };
    }

    /// Shared body of every operation: ensure client, one call, decode, or fall back.
    ///
    /// `offline` is used when no client exists (zero outbound calls); `failed` when the
    /// call errors or `decode` rejects the reply.
    pub(super) async fn dispatch<T, D>(
        &self,
        operation: &'static str,
        request: GenerateRequest,
        decode: D,
        offline: fn() -> T,
        failed: fn() -> T,
    ) -> Insight<T>
    where
        D: FnOnce(&str) -> AuraResult<T>,
    {
        let Some(client) = self.ensure_client() else {
            warn!("[AURA AI] {}: offline, using static default", operation);
            return Insight::fallback(offline(), FallbackReason::Offline);
        };

        let text = match client.generate(&request).await {
            Ok(text) => text,
            Err(e) => {
                warn!("[AURA AI] {} failed: {}", operation, e);
                self.mark_degraded(&client, &e.to_string());
                return Insight::fallback(failed(), FallbackReason::Transport(e.to_string()));
            }
        };

        match decode(&text) {
            Ok(value) => {
                self.mark_ready(&client);
                Insight::from_model(value)
            }
            Err(e) => {
                warn!("[AURA AI] {}: unusable reply: {}", operation, e);
                self.mark_degraded(&client, &e.to_string());
                Insight::fallback(failed(), FallbackReason::Malformed(e.to_string()))
            }
        }
    }
}
