//! Saved conversation listing and removal.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use database::{conversation, message, Conversation, Message};

use crate::error::Result;
use crate::state::AppState;

/// All conversations, most recently active first.
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Conversation>>> {
    let conversations = conversation::list_conversations(state.db.pool()).await?;
    Ok(Json(conversations))
}

/// Messages of one conversation in the order they were written.
pub async fn messages(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Message>>> {
    let pool = state.db.pool();
    conversation::get_conversation(pool, &id).await?;
    let messages = message::list_messages(pool, &id).await?;
    Ok(Json(messages))
}

/// Delete a conversation and its messages.
pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> Result<StatusCode> {
    conversation::delete_conversation(state.db.pool(), &id).await?;
    Ok(StatusCode::NO_CONTENT)
}
