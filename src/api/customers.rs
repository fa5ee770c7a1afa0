use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::Json;
use axum::Router;
use serde_json::{json, Value};

use crate::api::chat::{resolve_conversation, send_message, SendMessageRequest};
use crate::error::AppError;
use crate::models::message::{ChatMessage, ConversationKey, Sender};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route(
        "/customer/:customer_id/customermessages",
        get(list_customer_messages)
            .post(send_customer_message)
            .delete(resolve_customer_conversation),
    )
}

fn customer_key(customer_id: i64) -> ConversationKey {
    ConversationKey::Customer { customer_id }
}

async fn list_customer_messages(
    State(state): State<Arc<AppState>>,
    Path(customer_id): Path<i64>,
) -> Result<Json<Vec<ChatMessage>>, AppError> {
    let messages = state.chat.list(&customer_key(customer_id))?;
    Ok(Json(messages))
}

async fn send_customer_message(
    State(state): State<Arc<AppState>>,
    Path(customer_id): Path<i64>,
    Json(body): Json<SendMessageRequest>,
) -> Result<(StatusCode, Json<ChatMessage>), AppError> {
    let key = customer_key(customer_id);
    let message = send_message(&state, &key, body, Sender::Customer, "customer")?;
    Ok((StatusCode::CREATED, Json(message)))
}

async fn resolve_customer_conversation(
    State(state): State<Arc<AppState>>,
    Path(customer_id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    resolve_conversation(&state, &customer_key(customer_id), "customer")?;
    Ok(Json(json!({ "message": "conversation resolved" })))
}
