use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Party that authored a chat message.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    Customer,
    Driver,
    Admin,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    #[serde(rename = "messageID")]
    pub message_id: i64,
    pub sender: Sender,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

/// Identity of a two-party conversation with the admin side.
///
/// Customer chat is keyed by the customer alone; driver chat may additionally
/// be scoped to one order (`None` is the driver's direct thread). Callers
/// never need to know which backing store holds the conversation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ConversationKey {
    Customer { customer_id: i64 },
    Driver { driver_id: i64, order_id: Option<i64> },
}

/// Message id scheme used by the legacy clients: unix milliseconds reduced
/// modulo i32::MAX so the id stays within a 32-bit signed column.
pub fn suggested_message_id(now: DateTime<Utc>) -> i64 {
    now.timestamp_millis().rem_euclid(i32::MAX as i64)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn suggested_id_fits_in_i32() {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        let id = suggested_message_id(now);
        assert!(id >= 0);
        assert!(id < i32::MAX as i64);
    }

    #[test]
    fn sender_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Sender::Admin).unwrap(), "\"admin\"");
        assert_eq!(
            serde_json::from_str::<Sender>("\"driver\"").unwrap(),
            Sender::Driver
        );
    }

    #[test]
    fn driver_keys_distinguish_order_scope() {
        let direct = ConversationKey::Driver {
            driver_id: 7,
            order_id: None,
        };
        let scoped = ConversationKey::Driver {
            driver_id: 7,
            order_id: Some(101),
        };
        assert_ne!(direct, scoped);
    }
}
