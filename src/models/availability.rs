use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// One driver's working window for a single date. At most one record exists
/// per (driver, date); the store enforces this on insert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriverAvailability {
    #[serde(rename = "availabilityID")]
    pub availability_id: i64,
    #[serde(rename = "driverID")]
    pub driver_id: i64,
    pub date: NaiveDate,
    #[serde(rename = "availStartTime")]
    pub avail_start_time: NaiveTime,
    #[serde(rename = "availEndTime")]
    pub avail_end_time: NaiveTime,
    #[serde(rename = "isAvailable")]
    pub is_available: bool,
}
