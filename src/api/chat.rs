use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::error::AppError;
use crate::models::message::{ChatMessage, ConversationKey, Sender};
use crate::state::AppState;

/// Optional order scope for driver conversations; absent means the driver's
/// direct thread with admin.
#[derive(Deserialize)]
pub struct ChatScope {
    pub order: Option<i64>,
}

#[derive(Deserialize)]
pub struct SendMessageRequest {
    #[serde(rename = "messageID")]
    pub message_id: Option<i64>,
    pub timestamp: Option<DateTime<Utc>>,
    pub content: Option<String>,
    /// Defaults to the counterparty of the endpoint; admin replies pass
    /// `"admin"` explicitly.
    pub sender: Option<Sender>,
}

/// Validates the request, appends to the conversation and bumps the channel
/// counter. Shared by the driver and customer endpoints.
pub fn send_message(
    state: &Arc<AppState>,
    key: &ConversationKey,
    body: SendMessageRequest,
    default_sender: Sender,
    channel: &str,
) -> Result<ChatMessage, AppError> {
    let message_id = body.message_id.ok_or_else(|| AppError::missing_field("messageID"))?;
    let timestamp = body.timestamp.ok_or_else(|| AppError::missing_field("timestamp"))?;
    let content = body.content.ok_or_else(|| AppError::missing_field("content"))?;

    if content.trim().is_empty() {
        return Err(AppError::BadRequest("content cannot be empty".to_string()));
    }

    let message = ChatMessage {
        message_id,
        sender: body.sender.unwrap_or(default_sender),
        content,
        timestamp,
    };

    state.chat.append(key, message.clone())?;
    state
        .metrics
        .chat_messages_total
        .with_label_values(&[channel])
        .inc();

    Ok(message)
}

pub fn resolve_conversation(
    state: &Arc<AppState>,
    key: &ConversationKey,
    channel: &str,
) -> Result<(), AppError> {
    state.chat.resolve(key)?;
    state
        .metrics
        .conversations_resolved_total
        .with_label_values(&[channel])
        .inc();
    Ok(())
}
