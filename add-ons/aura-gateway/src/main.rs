//! Aura Gateway: local HTTP host for the insight and session gateways.
//! Secrets stay in this process; the browser only ever sees insight values.

use async_trait::async_trait;
use aura_core::insight::{ChatTurn, FutureSelfRequest, SleepLog};
use aura_core::{
    AuraConfig, AuraError, AuraResult, ConsentFlow, DocumentStore, FirebaseIdentity,
    FirestoreStore, HeadlessNotifier, IdentityProvider, InsightGateway, MemoryStore,
    NotificationKind, ProvidedToken, Session, SessionGateway,
};
use axum::{
    body::Body,
    extract::{ConnectInfo, Path, State},
    http::{Method, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

struct AppState {
    insight: InsightGateway,
    session: SessionGateway,
}

/// Stand-in used when no Firebase API key is configured: every sign-in is refused.
struct UnconfiguredIdentity;

#[async_trait]
impl IdentityProvider for UnconfiguredIdentity {
    async fn sign_in_with_google(&self, consent: &dyn ConsentFlow) -> AuraResult<Session> {
        consent.google_id_token().await?;
        Err(AuraError::Config("firebase.api_key is not set".into()))
    }
}

#[derive(Deserialize)]
struct TextRequest {
    text: String,
}

#[derive(Deserialize)]
struct WisdomRequest {
    messages: Vec<String>,
}

#[derive(Deserialize)]
struct SleepRequest {
    logs: Vec<SleepLog>,
}

#[derive(Deserialize)]
struct MentorRequest {
    interactions: Vec<String>,
}

#[derive(Deserialize)]
struct ChatRequest {
    #[serde(default)]
    history: Vec<ChatTurn>,
    message: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChatTitleRequest {
    first_message: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GoogleSignInRequest {
    id_token: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SendNotificationRequest {
    user_id: String,
    title: String,
    message: String,
    #[serde(rename = "type", default)]
    kind: NotificationKind,
    #[serde(default)]
    link: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("[aura-gateway] .env not loaded: {} (using system environment)", e);
    }

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AuraConfig::load()?;
    let state = Arc::new(build_state(&config));
    let app = build_app(state);

    let listener = tokio::net::TcpListener::bind(&config.gateway.bind).await?;
    tracing::info!("[AURA GATEWAY] listening on {}", config.gateway.bind);
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;
    Ok(())
}

fn build_state(config: &AuraConfig) -> AppState {
    let insight = InsightGateway::new(&config.model);

    let identity: Arc<dyn IdentityProvider> = match FirebaseIdentity::from_config(&config.firebase) {
        Ok(identity) => Arc::new(identity),
        Err(e) => {
            tracing::warn!("[AURA SESSION] sign-in disabled: {}", e);
            Arc::new(UnconfiguredIdentity)
        }
    };
    let store: Arc<dyn DocumentStore> = match FirestoreStore::from_config(&config.firebase) {
        Ok(store) => Arc::new(store),
        Err(e) => {
            tracing::warn!("[AURA SESSION] using in-memory store: {}", e);
            Arc::new(MemoryStore::new())
        }
    };

    AppState {
        insight,
        session: SessionGateway::new(identity, store, Arc::new(HeadlessNotifier)),
    }
}

fn build_app(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(|origin: &axum::http::HeaderValue, _| {
            let s = origin.to_str().unwrap_or("");
            s.starts_with("http://localhost:") || s.starts_with("http://127.0.0.1:")
        }))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(tower_http::cors::Any);

    Router::new()
        .route("/health", get(health))
        .route("/api/v1/status", get(status))
        .route("/api/v1/journal/analyze", post(analyze_journal))
        .route("/api/v1/moderate", post(moderate))
        .route("/api/v1/wisdom", post(wisdom))
        .route("/api/v1/future-self", post(future_self))
        .route("/api/v1/sleep/analyze", post(analyze_sleep))
        .route("/api/v1/mentor/impact", post(mentor_impact))
        .route("/api/v1/chat", post(chat))
        .route("/api/v1/chat/title", post(chat_title))
        .route("/api/v1/auth/google", post(sign_in_google))
        .route("/api/v1/auth/logout", post(logout))
        .route("/api/v1/notifications/permission", post(notification_permission))
        .route("/api/v1/notifications", post(send_notification))
        .route("/api/v1/users/:id/notifications", get(list_notifications))
        .with_state(state)
        .layer(cors)
        .layer(axum::middleware::from_fn(log_request))
}

async fn log_request(request: Request<Body>, next: Next) -> Response {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.to_string())
        .unwrap_or_else(|| "local".to_string());
    tracing::debug!(
        "[AURA GATEWAY] {} {} from {}",
        request.method(),
        request.uri().path(),
        peer
    );
    next.run(request).await
}

async fn health() -> &'static str {
    "OK"
}

async fn status(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(json!({
        "version": aura_core::version(),
        "insight": state.insight.status(),
        "degradedReason": state.insight.degraded_reason(),
        "signedIn": state.session.current_session().is_some(),
    }))
}

async fn analyze_journal(
    State(state): State<Arc<AppState>>,
    Json(body): Json<TextRequest>,
) -> impl IntoResponse {
    Json(state.insight.analyze_journal_entry(&body.text).await)
}

async fn moderate(
    State(state): State<Arc<AppState>>,
    Json(body): Json<TextRequest>,
) -> impl IntoResponse {
    Json(state.insight.moderate_message(&body.text).await)
}

async fn wisdom(
    State(state): State<Arc<AppState>>,
    Json(body): Json<WisdomRequest>,
) -> impl IntoResponse {
    Json(state.insight.generate_wisdom_insights(&body.messages).await)
}

async fn future_self(
    State(state): State<Arc<AppState>>,
    Json(body): Json<FutureSelfRequest>,
) -> impl IntoResponse {
    Json(state.insight.generate_future_self(&body).await)
}

async fn analyze_sleep(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SleepRequest>,
) -> impl IntoResponse {
    Json(state.insight.analyze_sleep_patterns(&body.logs).await)
}

async fn mentor_impact(
    State(state): State<Arc<AppState>>,
    Json(body): Json<MentorRequest>,
) -> impl IntoResponse {
    Json(state.insight.generate_mentor_impact_report(&body.interactions).await)
}

async fn chat(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ChatRequest>,
) -> impl IntoResponse {
    Json(
        state
            .insight
            .generate_chat_response(&body.history, &body.message)
            .await,
    )
}

async fn chat_title(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ChatTitleRequest>,
) -> impl IntoResponse {
    Json(state.insight.generate_chat_title(&body.first_message).await)
}

/// Popup failures are the user's to retry (401); anything else is the provider's (502).
fn identity_error(e: &AuraError) -> (StatusCode, Json<serde_json::Value>) {
    let status = match e {
        AuraError::PopupBlocked | AuraError::PopupCancelled => StatusCode::UNAUTHORIZED,
        _ => StatusCode::BAD_GATEWAY,
    };
    (status, Json(json!({ "error": e.to_string() })))
}

async fn sign_in_google(
    State(state): State<Arc<AppState>>,
    Json(body): Json<GoogleSignInRequest>,
) -> Result<Json<Session>, (StatusCode, Json<serde_json::Value>)> {
    state
        .session
        .sign_in_with_google(&ProvidedToken(body.id_token))
        .await
        .map(Json)
        .map_err(|e| identity_error(&e))
}

async fn logout(State(state): State<Arc<AppState>>) -> StatusCode {
    state.session.logout();
    StatusCode::NO_CONTENT
}

async fn notification_permission(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let granted = state.session.request_notification_permission().await;
    Json(json!({ "granted": granted }))
}

async fn send_notification(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SendNotificationRequest>,
) -> impl IntoResponse {
    let delivery = state
        .session
        .send_notification(
            &body.user_id,
            &body.title,
            &body.message,
            body.kind,
            body.link.as_deref(),
        )
        .await;
    Json(delivery)
}

async fn list_notifications(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, (StatusCode, Json<serde_json::Value>)> {
    state
        .session
        .list_notifications(&user_id)
        .await
        .map(Json)
        .map_err(|e| {
            tracing::error!("[AURA SESSION] listing notifications for {} failed: {}", user_id, e);
            (StatusCode::BAD_GATEWAY, Json(json!({ "error": e.to_string() })))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tower::ServiceExt;

    fn offline_app() -> Router {
        build_app(Arc::new(AppState {
            insight: InsightGateway::offline(),
            session: SessionGateway::new(
                Arc::new(UnconfiguredIdentity),
                Arc::new(MemoryStore::new()),
                Arc::new(HeadlessNotifier),
            ),
        }))
    }

    fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(res: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_offline_journal_returns_default_with_ok() {
        let res = offline_app()
            .oneshot(post_json("/api/v1/journal/analyze", json!({"text": "long day"})))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let json = body_json(res).await;
        assert_eq!(json["value"]["sentiment"], "neutral");
        assert_eq!(json["value"]["response"], "AI Offline. Good job writing!");
        assert_eq!(json["source"]["origin"], "fallback");
        assert_eq!(json["source"]["reason"]["kind"], "offline");
    }

    #[tokio::test]
    async fn test_status_reports_degraded_client() {
        let req = Request::builder()
            .uri("/api/v1/status")
            .body(Body::empty())
            .unwrap();
        let res = offline_app().oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let json = body_json(res).await;
        assert_eq!(json["insight"], "degraded");
        assert_eq!(json["signedIn"], false);
        assert!(json["degradedReason"].is_string());
    }

    #[tokio::test]
    async fn test_sign_in_errors_map_to_status_codes() {
        let app = offline_app();
        let res = app
            .clone()
            .oneshot(post_json("/api/v1/auth/google", json!({"idToken": ""})))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

        let res = app
            .clone()
            .oneshot(post_json("/api/v1/auth/google", json!({"idToken": "google-tok"})))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_GATEWAY);

        assert_eq!(
            identity_error(&AuraError::PopupCancelled).0,
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            identity_error(&AuraError::PopupBlocked).0,
            StatusCode::UNAUTHORIZED
        );
    }

    #[tokio::test]
    async fn test_notification_round_trip_through_memory_store() {
        let app = offline_app();
        let res = app
            .clone()
            .oneshot(post_json(
                "/api/v1/notifications",
                json!({"userId": "u1", "title": "Hi", "message": "Streak!", "type": "success"}),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let delivery = body_json(res).await;
        assert!(delivery["documentId"].is_string());
        assert_eq!(delivery["osRaised"], false);

        let req = Request::builder()
            .uri("/api/v1/users/u1/notifications")
            .body(Body::empty())
            .unwrap();
        let res = app.oneshot(req).await.unwrap();
        let list = body_json(res).await;
        assert_eq!(list[0]["title"], "Hi");
        assert_eq!(list[0]["type"], "success");
        assert_eq!(list[0]["read"], false);
    }
}
