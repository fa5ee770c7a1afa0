use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Closed status set for an order. The legacy API accepted arbitrary strings
/// here; unknown values are now rejected at the boundary with a 400.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Preparing,
    OutForDelivery,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Presentation priority used when listing a driver's orders:
    /// out_for_delivery first, delivered/cancelled last.
    pub fn priority_rank(&self) -> u8 {
        match self {
            OrderStatus::OutForDelivery => 1,
            OrderStatus::Confirmed => 2,
            OrderStatus::Preparing => 3,
            OrderStatus::Pending => 4,
            OrderStatus::Delivered | OrderStatus::Cancelled => 5,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Preparing => "preparing",
            OrderStatus::OutForDelivery => "out_for_delivery",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(OrderStatus::Pending),
            "confirmed" => Ok(OrderStatus::Confirmed),
            "preparing" => Ok(OrderStatus::Preparing),
            "out_for_delivery" => Ok(OrderStatus::OutForDelivery),
            "delivered" => Ok(OrderStatus::Delivered),
            "cancelled" => Ok(OrderStatus::Cancelled),
            other => Err(format!("unknown status: {other}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    #[serde(rename = "orderID")]
    pub order_id: i64,
    #[serde(rename = "orderDate")]
    pub order_date: NaiveDate,
    #[serde(rename = "scheduledTime")]
    pub scheduled_time: DateTime<Utc>,
    #[serde(rename = "deliveryAddress")]
    pub delivery_address: String,
    #[serde(rename = "quantityOrdered")]
    pub quantity_ordered: i32,
    pub status: OrderStatus,
    #[serde(rename = "driverID")]
    pub driver_id: i64,
    #[serde(rename = "customerID")]
    pub customer_id: i64,
}

/// Sorts a driver's orders by status priority, then ascending scheduled time.
/// This ordering is an interface contract with the route planner UI.
pub fn sort_for_driver(orders: &mut [Order]) {
    orders.sort_by(|a, b| {
        a.status
            .priority_rank()
            .cmp(&b.status.priority_rank())
            .then(a.scheduled_time.cmp(&b.scheduled_time))
    });
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn order(order_id: i64, status: OrderStatus, hour: u32) -> Order {
        Order {
            order_id,
            order_date: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
            scheduled_time: Utc.with_ymd_and_hms(2025, 3, 10, hour, 0, 0).unwrap(),
            delivery_address: "12 Elm St".to_string(),
            quantity_ordered: 2,
            status,
            driver_id: 7,
            customer_id: 40,
        }
    }

    #[test]
    fn out_for_delivery_sorts_before_everything() {
        let mut orders = vec![
            order(101, OrderStatus::Preparing, 9),
            order(102, OrderStatus::OutForDelivery, 11),
            order(103, OrderStatus::Pending, 8),
        ];
        sort_for_driver(&mut orders);

        let ids: Vec<i64> = orders.iter().map(|o| o.order_id).collect();
        assert_eq!(ids, vec![102, 101, 103]);
    }

    #[test]
    fn scheduled_time_breaks_priority_ties() {
        let mut orders = vec![
            order(2, OrderStatus::Confirmed, 15),
            order(1, OrderStatus::Confirmed, 9),
        ];
        sort_for_driver(&mut orders);

        assert_eq!(orders[0].order_id, 1);
        assert_eq!(orders[1].order_id, 2);
    }

    #[test]
    fn terminal_statuses_rank_last() {
        assert!(OrderStatus::Delivered.priority_rank() > OrderStatus::Pending.priority_rank());
        assert_eq!(
            OrderStatus::Delivered.priority_rank(),
            OrderStatus::Cancelled.priority_rank()
        );
    }

    #[test]
    fn status_round_trips_through_from_str() {
        for status in [
            OrderStatus::Pending,
            OrderStatus::Confirmed,
            OrderStatus::Preparing,
            OrderStatus::OutForDelivery,
            OrderStatus::Delivered,
            OrderStatus::Cancelled,
        ] {
            assert_eq!(status.as_str().parse::<OrderStatus>().unwrap(), status);
        }
    }

    #[test]
    fn unknown_status_is_rejected() {
        assert!("shipped".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn status_serializes_snake_case() {
        let json = serde_json::to_string(&OrderStatus::OutForDelivery).unwrap();
        assert_eq!(json, "\"out_for_delivery\"");
    }
}
