use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Append-only record of a delivery problem reported by a driver.
/// Never mutated or deleted once written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryIssue {
    #[serde(rename = "issueID")]
    pub issue_id: i64,
    #[serde(rename = "orderID")]
    pub order_id: i64,
    pub timestamp: DateTime<Utc>,
    pub description: String,
}
