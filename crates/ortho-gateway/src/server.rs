//! Webhook HTTP Server
//!
//! Axum server exposing the WhatsApp webhook surface: the GET verification
//! handshake and the POST delivery endpoint, plus liveness routes.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use ortho_core::ConversationEngine;
use ortho_whatsapp::{Dispatch, classify, parse_payload, verify_subscription};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<ConversationEngine>,
    pub verify_token: String,
}

/// Query parameters Meta sends on the verification handshake
#[derive(Debug, Deserialize)]
pub struct VerifyParams {
    #[serde(rename = "hub.mode")]
    pub mode: Option<String>,
    #[serde(rename = "hub.verify_token")]
    pub verify_token: Option<String>,
    #[serde(rename = "hub.challenge")]
    pub challenge: Option<String>,
}

/// Create the webhook router
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/webhook", get(verify_webhook))
        .route("/webhook", post(receive_webhook))
}

/// Start the webhook server
pub async fn start_server(port: u16, state: AppState) -> anyhow::Result<()> {
    let app = routes()
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Webhook server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn index() -> Json<serde_json::Value> {
    Json(json!({ "ok": true, "msg": "WhatsApp backend running." }))
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

/// GET /webhook - subscription verification handshake
async fn verify_webhook(
    State(state): State<AppState>,
    Query(params): Query<VerifyParams>,
) -> Response {
    match verify_subscription(
        params.mode.as_deref(),
        params.verify_token.as_deref(),
        params.challenge.as_deref(),
        &state.verify_token,
    ) {
        Some(challenge) => {
            info!("Webhook subscription verified");
            (StatusCode::OK, challenge).into_response()
        }
        None => {
            warn!("Webhook verification rejected");
            (StatusCode::FORBIDDEN, "Forbidden").into_response()
        }
    }
}

/// POST /webhook - message delivery endpoint
///
/// Status callbacks and unsupported message types are acknowledged without
/// touching a session; malformed envelopes and downstream failures report
/// an error body with status 500.
async fn receive_webhook(
    State(state): State<AppState>,
    Json(body): Json<serde_json::Value>,
) -> Response {
    match dispatch(&state, body).await {
        Ok(()) => (StatusCode::OK, Json(json!({ "status": "ok" }))).into_response(),
        Err(e) => {
            warn!("Webhook processing failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "status": "error" })),
            )
                .into_response()
        }
    }
}

async fn dispatch(state: &AppState, body: serde_json::Value) -> ortho_core::Result<()> {
    let payload = parse_payload(body)?;
    match classify(&payload)? {
        Dispatch::Event(event) => state.engine.handle(event).await,
        Dispatch::Ignored => Ok(()),
    }
}
