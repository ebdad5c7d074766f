//! HTTP request handlers

use super::types::{ChatRequest, ChatResponse, ErrorResponse, WelcomeResponse};
use super::AppState;
use axum::{
    extract::{rejection::JsonRejection, ConnectInfo, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use std::net::SocketAddr;

const INTERNAL_ERROR_MESSAGE: &str = "⚠️ Ocurrió un error interno. Por favor, intenta de nuevo.";

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(welcome))
        .route("/chat", post(chat))
        .with_state(state)
}

async fn welcome() -> Json<WelcomeResponse> {
    Json(WelcomeResponse {
        message: "🤖 Bot de inducción activo. Envía tus mensajes a POST /chat.".to_string(),
        endpoints: vec!["GET /".to_string(), "POST /chat".to_string()],
    })
}

// ============================================================
// Chat
// ============================================================

async fn chat(
    State(state): State<AppState>,
    peer: Option<ConnectInfo<SocketAddr>>,
    body: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, AppError> {
    let Json(req) = body.map_err(|e| AppError::BadRequest(e.body_text()))?;

    // Without an explicit id the client address identifies the user
    let user_id = req
        .user_id
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .or_else(|| peer.map(|ConnectInfo(addr)| addr.ip().to_string()))
        .ok_or_else(|| AppError::BadRequest("user_id is required".to_string()))?;

    let reply = state
        .runtime
        .handle_turn(&user_id, &req.text)
        .await
        .map_err(|e| {
            tracing::error!(user_id = %user_id, error = %e, "Chat turn failed");
            AppError::Internal(INTERNAL_ERROR_MESSAGE.to_string())
        })?;

    Ok(Json(reply.into()))
}

// ============================================================
// Error Handling
// ============================================================

#[derive(Debug)]
enum AppError {
    BadRequest(String),
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(ErrorResponse::new(message));
        (status, body).into_response()
    }
}
