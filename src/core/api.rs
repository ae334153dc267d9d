//! HTTP + WebSocket API for proposal cards
//!
//! Endpoints:
//! - POST /session/new - Create new card session
//! - GET /session/{id} - Get card state
//! - POST /session/{id}/advance - Reveal next message
//! - POST /session/{id}/affirm - Say yes
//! - POST /session/{id}/decline - Say no
//! - DELETE /session/{id} - Drop a session
//! - POST /send-email - Relay an email through the configured provider
//! - WS /ws/{id} - Live updates
//! - GET /health - Health check

use axum::{
    extract::{Path, State, WebSocketUpgrade, ws::{Message, WebSocket}},
    http::{header, HeaderName, Method, StatusCode},
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{broadcast, RwLock};
use tower_http::cors::{Any, CorsLayer};
use tracing::{debug, error, info};

use crate::core::{ControllerConfig, EmailRequest, EmailSink, Notifier, NotifierConfig, ResponseController};
use crate::types::{ControllerOutput, Input};
use crate::{SESSION_IDLE_TTL_SECS, SESSION_SWEEP_INTERVAL_SECS};

/// One card session and its live-update channel
#[derive(Debug)]
pub struct CardSession {
    pub id: String,
    pub controller: ResponseController,
    pub update_tx: broadcast::Sender<ControllerOutput>,
    pub last_active: Instant,
}

impl CardSession {
    /// Resolved, unwatched and untouched for at least `ttl`
    fn is_stale(&self, ttl: Duration, now: Instant) -> bool {
        self.controller.state().is_terminal()
            && self.update_tx.receiver_count() == 0
            && now.saturating_duration_since(self.last_active) >= ttl
    }
}

/// App state
pub struct AppState {
    pub sessions: RwLock<HashMap<String, CardSession>>,
    pub notifier: Notifier,
    pub relay: EmailSink,
}

/// Create new session response
#[derive(Debug, Serialize)]
pub struct NewSessionResponse {
    pub session_id: String,
    pub websocket_url: String,
    pub output: ControllerOutput,
}

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub sessions_active: usize,
    pub notifier: String,
}

type ApiError = (StatusCode, Json<Value>);

fn api_error(status: StatusCode, message: impl std::fmt::Display) -> ApiError {
    (status, Json(json!({ "error": message.to_string() })))
}

/// Browser front-ends call the relay cross-origin with a preflight
fn build_cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            HeaderName::from_static("x-client-info"),
            HeaderName::from_static("apikey"),
        ])
}

fn build_state(notifier: Notifier, relay_config: NotifierConfig) -> Arc<AppState> {
    Arc::new(AppState {
        sessions: RwLock::new(HashMap::new()),
        notifier,
        relay: EmailSink::new(relay_config),
    })
}

/// Create the API router
pub fn create_router(notifier: Notifier, relay_config: NotifierConfig) -> Router {
    router(build_state(notifier, relay_config))
}

fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/session/new", post(create_session))
        .route("/session/:id", get(get_session).delete(delete_session))
        .route("/session/:id/advance", post(advance))
        .route("/session/:id/affirm", post(affirm))
        .route("/session/:id/decline", post(decline))
        .route("/send-email", post(send_email))
        .route("/ws/:id", get(websocket_handler))
        .layer(build_cors_layer())
        .with_state(state)
}

/// Drop stale sessions; returns how many were removed
fn prune_sessions(sessions: &mut HashMap<String, CardSession>, ttl: Duration, now: Instant) -> usize {
    let before = sessions.len();
    sessions.retain(|_, session| !session.is_stale(ttl, now));
    before - sessions.len()
}

async fn sweep_sessions(state: Arc<AppState>, ttl: Duration, every: Duration) {
    let mut ticker = tokio::time::interval(every);
    loop {
        ticker.tick().await;
        let mut sessions = state.sessions.write().await;
        let removed = prune_sessions(&mut sessions, ttl, Instant::now());
        if removed > 0 {
            debug!(removed, remaining = sessions.len(), "swept idle sessions");
        }
    }
}

/// Health check endpoint
async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let sessions = state.sessions.read().await;
    Json(HealthResponse {
        status: "ok".to_string(),
        version: crate::VERSION.to_string(),
        sessions_active: sessions.len(),
        notifier: state.notifier.sink_name().to_string(),
    })
}

/// Create new session
async fn create_session(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ControllerConfig>,
) -> Result<Json<NewSessionResponse>, ApiError> {
    let controller = ResponseController::from_config(&req, state.notifier.clone())
        .map_err(|e| api_error(StatusCode::BAD_REQUEST, e))?;

    let session_id = generate_session_id();
    let (tx, _) = broadcast::channel(100);
    let output = controller.current_output();

    let session = CardSession {
        id: session_id.clone(),
        controller,
        update_tx: tx,
        last_active: Instant::now(),
    };

    let mut sessions = state.sessions.write().await;
    sessions.insert(session_id.clone(), session);
    info!(session_id = %session_id, theme = %req.theme, "session created");

    Ok(Json(NewSessionResponse {
        websocket_url: format!("/ws/{}", session_id),
        session_id,
        output,
    }))
}

/// Get session state
async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ControllerOutput>, StatusCode> {
    let sessions = state.sessions.read().await;
    let session = sessions.get(&id).ok_or(StatusCode::NOT_FOUND)?;
    Ok(Json(session.controller.current_output()))
}

async fn delete_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> StatusCode {
    let mut sessions = state.sessions.write().await;
    match sessions.remove(&id) {
        Some(_) => {
            info!(session_id = %id, "session deleted");
            StatusCode::NO_CONTENT
        }
        None => StatusCode::NOT_FOUND,
    }
}

async fn advance(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ControllerOutput>, StatusCode> {
    apply_input(&state, &id, Input::Advance).await
}

async fn affirm(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ControllerOutput>, StatusCode> {
    apply_input(&state, &id, Input::Affirm).await
}

async fn decline(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ControllerOutput>, StatusCode> {
    apply_input(&state, &id, Input::Decline).await
}

/// Apply input under the write lock so a session sees one input at a time
async fn apply_input(
    state: &AppState,
    id: &str,
    input: Input,
) -> Result<Json<ControllerOutput>, StatusCode> {
    let mut sessions = state.sessions.write().await;
    let session = sessions.get_mut(id).ok_or(StatusCode::NOT_FOUND)?;

    let output = session.controller.apply(input);
    session.last_active = Instant::now();
    let _ = session.update_tx.send(output.clone());

    Ok(Json(output))
}

/// Relay one email
async fn send_email(
    State(state): State<Arc<AppState>>,
    Json(req): Json<EmailRequest>,
) -> Result<Json<Value>, ApiError> {
    match state.relay.send(&req, None).await {
        Ok(email_id) => Ok(Json(json!({
            "success": true,
            "message": "Email sent successfully",
            "emailId": email_id,
        }))),
        Err(e) => {
            error!(to = %req.to, "email relay failed: {}", e);
            Err(api_error(StatusCode::BAD_REQUEST, e))
        }
    }
}

/// WebSocket handler for live updates
async fn websocket_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ws: WebSocketUpgrade,
) -> Result<impl IntoResponse, StatusCode> {
    let sessions = state.sessions.read().await;
    let session = sessions.get(&id).ok_or(StatusCode::NOT_FOUND)?;
    let rx = session.update_tx.subscribe();
    drop(sessions);

    Ok(ws.on_upgrade(move |socket| async move {
        handle_websocket(socket, rx).await;
    }))
}

/// Handle WebSocket connection
async fn handle_websocket(mut socket: WebSocket, mut rx: broadcast::Receiver<ControllerOutput>) {
    while let Ok(update) = rx.recv().await {
        let json = serde_json::to_string(&update).unwrap_or_default();
        if socket.send(Message::Text(json)).await.is_err() {
            break;
        }
    }
}

/// Generate session ID
fn generate_session_id() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    static COUNTER: AtomicU64 = AtomicU64::new(0);

    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or_default();
    let seq = COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("session_{:x}_{}", nanos, seq)
}

/// Run the API server
pub async fn run_server(
    addr: &str,
    notifier: Notifier,
    relay_config: NotifierConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let state = build_state(notifier, relay_config);
    tokio::spawn(sweep_sessions(
        Arc::clone(&state),
        Duration::from_secs(SESSION_IDLE_TTL_SECS),
        Duration::from_secs(SESSION_SWEEP_INTERVAL_SECS),
    ));
    let router = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("proposal API running on {}", addr);
    info!("  POST /session/new          - Create session");
    info!("  GET  /session/:id          - Get state");
    info!("  POST /session/:id/advance  - Next message");
    info!("  POST /session/:id/affirm   - Say yes");
    info!("  POST /session/:id/decline  - Say no");
    info!("  DEL  /session/:id          - Drop session");
    info!("  POST /send-email           - Email relay");
    info!("  WS   /ws/:id               - Live updates");
    info!("  GET  /health               - Health check");
    axum::serve(listener, router).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(messages: &[&str]) -> CardSession {
        let controller =
            ResponseController::new(messages.iter().copied(), Notifier::default()).unwrap();
        let (tx, _) = broadcast::channel(4);
        CardSession {
            id: "s".to_string(),
            controller,
            update_tx: tx,
            last_active: Instant::now(),
        }
    }

    #[tokio::test]
    async fn test_prune_drops_only_stale_resolved_sessions() {
        let ttl = Duration::from_secs(60);
        let mut sessions = HashMap::new();

        let mut resolved = card(&["q"]);
        resolved.controller.affirm();
        sessions.insert("resolved".to_string(), resolved);

        let mut watched = card(&["q"]);
        watched.controller.affirm();
        let _rx = watched.update_tx.subscribe();
        sessions.insert("watched".to_string(), watched);

        sessions.insert("pending".to_string(), card(&["q"]));

        let now = Instant::now();
        assert_eq!(prune_sessions(&mut sessions, ttl, now), 0);

        let later = now + ttl;
        assert_eq!(prune_sessions(&mut sessions, ttl, later), 1);
        assert!(!sessions.contains_key("resolved"));
        assert!(sessions.contains_key("watched"));
        assert!(sessions.contains_key("pending"));
    }
}
