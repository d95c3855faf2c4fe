//! Chatbot routes. A valid admin token switches the conversation into
//! management mode; everyone else gets the customer assistant.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::Result;
use crate::middleware::OptionalAdmin;
use crate::services::{ChatReply, ChatTurn};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub history: Vec<ChatTurn>,
}

#[derive(Debug, Serialize)]
pub struct ChatStatus {
    pub available: bool,
}

/// POST /api/chatbot/message
#[instrument(skip(state, request), fields(admin = admin.is_some(), history_len = request.history.len()))]
pub async fn send_message(
    OptionalAdmin(admin): OptionalAdmin,
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatReply>> {
    let reply = state
        .chat()
        .respond(&request.message, &request.history, admin.is_some())
        .await?;
    Ok(Json(reply))
}

/// GET /api/chatbot/status
#[instrument(skip(state))]
pub async fn status(State(state): State<AppState>) -> Json<ChatStatus> {
    Json(ChatStatus {
        available: state.chat().is_available(),
    })
}
