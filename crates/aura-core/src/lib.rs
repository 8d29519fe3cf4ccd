//! Aura core library.
//! Session/storage gateway and Gemini-backed insight gateway for the Aura wellness app.

pub mod config;
pub mod error;
pub mod gemini_service;
pub mod insight;
pub mod prompts;
pub mod session;

pub use config::{AuraConfig, FirebaseConfig, GatewayConfig, ModelConfig};
pub use error::{AuraError, AuraResult};
pub use gemini_service::{GeminiBridge, GenerateRequest, ModelBackend};
pub use insight::{ClientStatus, FallbackReason, Insight, InsightGateway, InsightSource};
pub use session::{
    ConsentFlow, DocumentStore, FirebaseIdentity, FirestoreStore, HeadlessNotifier,
    IdentityProvider, MemoryStore, NotificationCapability, NotificationDelivery,
    NotificationKind, NotificationRecord, Permission, ProvidedToken, Session, SessionGateway,
};

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
