use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Mutex;
use std::{fs, sync::PoisonError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::chat::{sort_by_timestamp, ChatStore};
use crate::error::AppError;
use crate::models::message::{ChatMessage, ConversationKey, Sender};

/// File-backed chat backend keeping the legacy single-document layout:
/// a `customers` map of flat message lists and a `drivers` map of
/// per-order message lists ("direct" for the unscoped thread).
///
/// Every operation is a load-modify-save of the whole document, so one
/// mutex serializes them; the legacy implementation had no lock and could
/// lose concurrent writes.
pub struct FileChatStore {
    path: PathBuf,
    lock: Mutex<()>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct ChatDocument {
    #[serde(default)]
    customers: BTreeMap<String, Vec<FileEntry>>,
    #[serde(default)]
    drivers: BTreeMap<String, BTreeMap<String, Vec<FileEntry>>>,
}

/// Legacy entry shape `{from, message, timestamp}`, extended with the
/// message id so the duplicate-id contract holds for this backend too.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct FileEntry {
    #[serde(rename = "messageID")]
    message_id: i64,
    from: Sender,
    message: String,
    timestamp: DateTime<Utc>,
}

impl From<ChatMessage> for FileEntry {
    fn from(m: ChatMessage) -> Self {
        FileEntry {
            message_id: m.message_id,
            from: m.sender,
            message: m.content,
            timestamp: m.timestamp,
        }
    }
}

impl From<FileEntry> for ChatMessage {
    fn from(e: FileEntry) -> Self {
        ChatMessage {
            message_id: e.message_id,
            sender: e.from,
            content: e.message,
            timestamp: e.timestamp,
        }
    }
}

fn order_key(order_id: Option<i64>) -> String {
    match order_id {
        Some(id) => id.to_string(),
        None => "direct".to_string(),
    }
}

impl FileChatStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            lock: Mutex::new(()),
        }
    }

    fn load(&self) -> Result<ChatDocument, AppError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(ChatDocument::default()),
            Err(err) => {
                return Err(AppError::Internal(format!(
                    "failed to read chat log {}: {err}",
                    self.path.display()
                )))
            }
        };

        serde_json::from_str(&raw).map_err(|err| {
            AppError::Internal(format!(
                "chat log {} is corrupt: {err}",
                self.path.display()
            ))
        })
    }

    fn save(&self, doc: &ChatDocument) -> Result<(), AppError> {
        let raw = serde_json::to_string_pretty(doc)
            .map_err(|err| AppError::Internal(format!("failed to encode chat log: {err}")))?;
        fs::write(&self.path, raw).map_err(|err| {
            AppError::Internal(format!(
                "failed to write chat log {}: {err}",
                self.path.display()
            ))
        })
    }

    fn contains_id(doc: &ChatDocument, message_id: i64) -> bool {
        let customer_hit = doc
            .customers
            .values()
            .flatten()
            .any(|e| e.message_id == message_id);
        let driver_hit = doc
            .drivers
            .values()
            .flat_map(|threads| threads.values())
            .flatten()
            .any(|e| e.message_id == message_id);
        customer_hit || driver_hit
    }
}

impl ChatStore for FileChatStore {
    fn list(&self, key: &ConversationKey) -> Result<Vec<ChatMessage>, AppError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let doc = self.load()?;

        let entries = match key {
            ConversationKey::Customer { customer_id } => {
                doc.customers.get(&customer_id.to_string()).cloned()
            }
            ConversationKey::Driver {
                driver_id,
                order_id,
            } => doc
                .drivers
                .get(&driver_id.to_string())
                .and_then(|threads| threads.get(&order_key(*order_id)))
                .cloned(),
        };

        let mut messages: Vec<ChatMessage> = entries
            .unwrap_or_default()
            .into_iter()
            .map(ChatMessage::from)
            .collect();
        sort_by_timestamp(&mut messages);
        Ok(messages)
    }

    fn append(&self, key: &ConversationKey, message: ChatMessage) -> Result<(), AppError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut doc = self.load()?;

        if Self::contains_id(&doc, message.message_id) {
            return Err(AppError::Conflict(format!(
                "message {} already exists",
                message.message_id
            )));
        }

        let entries = match key {
            ConversationKey::Customer { customer_id } => {
                doc.customers.entry(customer_id.to_string()).or_default()
            }
            ConversationKey::Driver {
                driver_id,
                order_id,
            } => doc
                .drivers
                .entry(driver_id.to_string())
                .or_default()
                .entry(order_key(*order_id))
                .or_default(),
        };
        entries.push(message.into());

        self.save(&doc)
    }

    fn resolve(&self, key: &ConversationKey) -> Result<(), AppError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut doc = self.load()?;

        let removed = match key {
            ConversationKey::Customer { customer_id } => {
                doc.customers.remove(&customer_id.to_string()).is_some()
            }
            ConversationKey::Driver {
                driver_id,
                order_id,
            } => {
                let driver = driver_id.to_string();
                let removed = doc
                    .drivers
                    .get_mut(&driver)
                    .and_then(|threads| threads.remove(&order_key(*order_id)))
                    .is_some();
                if doc.drivers.get(&driver).is_some_and(BTreeMap::is_empty) {
                    doc.drivers.remove(&driver);
                }
                removed
            }
        };

        if removed {
            self.save(&doc)?;
        }
        Ok(())
    }

    fn conversation_count(&self) -> usize {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let doc = match self.load() {
            Ok(doc) => doc,
            Err(_) => return 0,
        };

        let customers = doc.customers.values().filter(|v| !v.is_empty()).count();
        let drivers = doc
            .drivers
            .values()
            .flat_map(|threads| threads.values())
            .filter(|v| !v.is_empty())
            .count();
        customers + drivers
    }
}
