pub mod file;
pub mod memory;

use std::sync::Arc;

use crate::config::{ChatBackend, Config};
use crate::error::AppError;
use crate::models::message::{ChatMessage, ConversationKey};

/// Ordered two-party message log between one counterparty (customer or
/// driver, optionally scoped to an order) and the admin side. Both backends
/// honor the same contract; callers never see which one is in use.
pub trait ChatStore: Send + Sync {
    /// All messages for the conversation, ascending by timestamp with ties
    /// kept in insertion order. An unknown conversation is an empty list,
    /// not an error.
    fn list(&self, key: &ConversationKey) -> Result<Vec<ChatMessage>, AppError>;

    /// Appends one message. Fails with `Conflict` if the message id already
    /// exists anywhere in the store.
    fn append(&self, key: &ConversationKey, message: ChatMessage) -> Result<(), AppError>;

    /// Clears exactly this conversation; other conversations are untouched.
    /// Resolving an empty or unknown conversation succeeds silently.
    fn resolve(&self, key: &ConversationKey) -> Result<(), AppError>;

    /// Number of conversations with at least one message, for /health.
    fn conversation_count(&self) -> usize;
}

pub fn from_config(config: &Config) -> Arc<dyn ChatStore> {
    match config.chat_backend {
        ChatBackend::Memory => Arc::new(memory::MemoryChatStore::new()),
        ChatBackend::File => Arc::new(file::FileChatStore::new(config.chat_file.clone())),
    }
}

/// Stable sort, so equal timestamps keep their insertion order.
pub(crate) fn sort_by_timestamp(messages: &mut [ChatMessage]) {
    messages.sort_by_key(|m| m.timestamp);
}
