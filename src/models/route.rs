use serde::Serialize;

use crate::models::order::{Order, OrderStatus};

/// Read-only partition of a driver's orders for the route planner. Pure
/// function of the order store; recomputed on every request.
#[derive(Debug, Serialize)]
pub struct RoutePlan {
    pub active: Vec<Order>,
    pub pending: Vec<Order>,
    pub delivered: Vec<Order>,
    pub all: Vec<Order>,
}

impl RoutePlan {
    /// Expects `orders` already in the driver-list presentation order;
    /// each partition preserves that order.
    pub fn from_orders(orders: Vec<Order>) -> Self {
        let active = orders
            .iter()
            .filter(|o| {
                matches!(
                    o.status,
                    OrderStatus::OutForDelivery | OrderStatus::Confirmed | OrderStatus::Preparing
                )
            })
            .cloned()
            .collect();
        let pending = orders
            .iter()
            .filter(|o| o.status == OrderStatus::Pending)
            .cloned()
            .collect();
        let delivered = orders
            .iter()
            .filter(|o| o.status == OrderStatus::Delivered)
            .cloned()
            .collect();

        RoutePlan {
            active,
            pending,
            delivered,
            all: orders,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, TimeZone, Utc};

    use super::*;

    fn order(order_id: i64, status: OrderStatus) -> Order {
        Order {
            order_id,
            order_date: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
            scheduled_time: Utc.with_ymd_and_hms(2025, 3, 10, 9, 0, 0).unwrap(),
            delivery_address: "4 Oak Ave".to_string(),
            quantity_ordered: 1,
            status,
            driver_id: 7,
            customer_id: 40,
        }
    }

    #[test]
    fn partitions_by_status_group() {
        let plan = RoutePlan::from_orders(vec![
            order(1, OrderStatus::OutForDelivery),
            order(2, OrderStatus::Confirmed),
            order(3, OrderStatus::Preparing),
            order(4, OrderStatus::Pending),
            order(5, OrderStatus::Delivered),
        ]);

        let ids = |orders: &[Order]| orders.iter().map(|o| o.order_id).collect::<Vec<_>>();
        assert_eq!(ids(&plan.active), vec![1, 2, 3]);
        assert_eq!(ids(&plan.pending), vec![4]);
        assert_eq!(ids(&plan.delivered), vec![5]);
        assert_eq!(plan.all.len(), 5);
    }

    #[test]
    fn cancelled_orders_appear_only_in_all() {
        let plan = RoutePlan::from_orders(vec![order(9, OrderStatus::Cancelled)]);

        assert!(plan.active.is_empty());
        assert!(plan.pending.is_empty());
        assert!(plan.delivered.is_empty());
        assert_eq!(plan.all.len(), 1);
    }

    #[test]
    fn input_order_is_preserved_within_partitions() {
        let plan = RoutePlan::from_orders(vec![
            order(20, OrderStatus::Confirmed),
            order(10, OrderStatus::Confirmed),
        ]);

        assert_eq!(plan.active[0].order_id, 20);
        assert_eq!(plan.active[1].order_id, 10);
    }
}
