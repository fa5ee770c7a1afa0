use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::chat::{sort_by_timestamp, ChatStore};
use crate::error::AppError;
use crate::models::message::{ChatMessage, ConversationKey};

/// In-process chat backend. Per-conversation appends are serialized by the
/// map's entry lock, and the id index gives a global uniqueness check without
/// scanning every conversation.
#[derive(Default)]
pub struct MemoryChatStore {
    conversations: DashMap<ConversationKey, Vec<ChatMessage>>,
    message_ids: DashMap<i64, ConversationKey>,
}

impl MemoryChatStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ChatStore for MemoryChatStore {
    fn list(&self, key: &ConversationKey) -> Result<Vec<ChatMessage>, AppError> {
        let mut messages = self
            .conversations
            .get(key)
            .map(|entry| entry.value().clone())
            .unwrap_or_default();
        sort_by_timestamp(&mut messages);
        Ok(messages)
    }

    fn append(&self, key: &ConversationKey, message: ChatMessage) -> Result<(), AppError> {
        match self.message_ids.entry(message.message_id) {
            Entry::Occupied(_) => {
                return Err(AppError::Conflict(format!(
                    "message {} already exists",
                    message.message_id
                )));
            }
            Entry::Vacant(slot) => {
                slot.insert(key.clone());
            }
        }

        self.conversations
            .entry(key.clone())
            .or_default()
            .push(message);
        Ok(())
    }

    fn resolve(&self, key: &ConversationKey) -> Result<(), AppError> {
        if let Some((_, messages)) = self.conversations.remove(key) {
            // Resolving deletes the rows, so their ids become free again,
            // matching the relational backend's primary-key semantics.
            for message in messages {
                self.message_ids.remove(&message.message_id);
            }
        }
        Ok(())
    }

    fn conversation_count(&self) -> usize {
        self.conversations.len()
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::models::message::Sender;

    fn msg(id: i64, sender: Sender, content: &str, minute: u32) -> ChatMessage {
        ChatMessage {
            message_id: id,
            sender,
            content: content.to_string(),
            timestamp: Utc.with_ymd_and_hms(2025, 3, 10, 9, minute, 0).unwrap(),
        }
    }

    fn driver_key(driver_id: i64) -> ConversationKey {
        ConversationKey::Driver {
            driver_id,
            order_id: None,
        }
    }

    #[test]
    fn lists_messages_in_timestamp_order() {
        let store = MemoryChatStore::new();
        let key = driver_key(7);

        store
            .append(&key, msg(556, Sender::Admin, "Noted", 5))
            .unwrap();
        store
            .append(&key, msg(555, Sender::Driver, "Running late", 1))
            .unwrap();

        let messages = store.list(&key).unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].message_id, 555);
        assert_eq!(messages[1].message_id, 556);
    }

    #[test]
    fn equal_timestamps_keep_insertion_order() {
        let store = MemoryChatStore::new();
        let key = driver_key(7);

        store.append(&key, msg(1, Sender::Driver, "first", 0)).unwrap();
        store.append(&key, msg(2, Sender::Driver, "second", 0)).unwrap();

        let messages = store.list(&key).unwrap();
        assert_eq!(messages[0].message_id, 1);
        assert_eq!(messages[1].message_id, 2);
    }

    #[test]
    fn duplicate_id_conflicts_across_conversations() {
        let store = MemoryChatStore::new();

        store
            .append(&driver_key(7), msg(42, Sender::Driver, "hello", 0))
            .unwrap();
        let err = store
            .append(
                &ConversationKey::Customer { customer_id: 5 },
                msg(42, Sender::Customer, "hi", 1),
            )
            .unwrap_err();

        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[test]
    fn resolve_clears_only_the_target_conversation() {
        let store = MemoryChatStore::new();
        let driver = driver_key(7);
        let customer = ConversationKey::Customer { customer_id: 5 };

        store.append(&driver, msg(1, Sender::Driver, "a", 0)).unwrap();
        store
            .append(&customer, msg(2, Sender::Customer, "b", 0))
            .unwrap();

        store.resolve(&driver).unwrap();

        assert!(store.list(&driver).unwrap().is_empty());
        assert_eq!(store.list(&customer).unwrap().len(), 1);
    }

    #[test]
    fn resolve_is_idempotent_and_frees_ids() {
        let store = MemoryChatStore::new();
        let key = driver_key(7);

        store.append(&key, msg(9, Sender::Driver, "a", 0)).unwrap();
        store.resolve(&key).unwrap();
        store.resolve(&key).unwrap();

        // The cleared id can be reused.
        store.append(&key, msg(9, Sender::Driver, "again", 1)).unwrap();
        assert_eq!(store.list(&key).unwrap().len(), 1);
    }

    #[test]
    fn order_scoped_driver_threads_are_separate() {
        let store = MemoryChatStore::new();
        let direct = driver_key(7);
        let scoped = ConversationKey::Driver {
            driver_id: 7,
            order_id: Some(101),
        };

        store.append(&direct, msg(1, Sender::Driver, "a", 0)).unwrap();
        store.append(&scoped, msg(2, Sender::Driver, "b", 0)).unwrap();

        assert_eq!(store.list(&direct).unwrap().len(), 1);
        assert_eq!(store.list(&scoped).unwrap().len(), 1);
        assert_eq!(store.conversation_count(), 2);
    }
}
