//! Chat handler

use axum::{body::Bytes, extract::State, response::IntoResponse, Json};
use serde_json::Value;
use shared::{ChatRequest, ChatResponse};

use crate::error::ErrorResponse;
use crate::AppState;

/// Error for a body that parses as JSON but is not an object
pub const NOT_AN_OBJECT_MESSAGE: &str = "Request body must be a JSON object";

/// Answer a farming question
/// POST /chat
///
/// A body that is not a JSON object is answered with `200 {"error": ...}`;
/// a `null` body counts as a request without a message.
pub async fn chat(State(state): State<AppState>, body: Bytes) -> impl IntoResponse {
    let request = match parse_request(&body) {
        Ok(request) => request,
        Err(message) => {
            tracing::warn!("Failed to parse chat request: {}", message);
            return Json(ErrorResponse::new(message)).into_response();
        }
    };

    let message = request.message.unwrap_or_default();
    let reply = state.chat.reply(&message).await;

    Json(ChatResponse::new(reply)).into_response()
}

fn parse_request(body: &[u8]) -> Result<ChatRequest, String> {
    match serde_json::from_slice::<Value>(body).map_err(|e| e.to_string())? {
        Value::Null => Ok(ChatRequest::default()),
        value @ Value::Object(_) => serde_json::from_value(value).map_err(|e| e.to_string()),
        _ => Err(NOT_AN_OBJECT_MESSAGE.to_string()),
    }
}
