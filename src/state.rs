use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use chrono::NaiveDate;
use dashmap::DashMap;

use crate::chat::memory::MemoryChatStore;
use crate::chat::ChatStore;
use crate::models::availability::DriverAvailability;
use crate::models::issue::DeliveryIssue;
use crate::models::order::Order;
use crate::observability::metrics::Metrics;

/// Shared store behind all request handlers. DashMap's per-entry locking is
/// what makes ownership-checked updates a single atomic step instead of the
/// check-then-act pair the legacy SQL layer used.
pub struct AppState {
    pub orders: DashMap<i64, Order>,
    pub issues: DashMap<i64, DeliveryIssue>,
    /// Keyed by (driver, date) so the uniqueness rule is the map key itself.
    pub availability: DashMap<(i64, NaiveDate), DriverAvailability>,
    availability_seq: AtomicI64,
    pub chat: Arc<dyn ChatStore>,
    pub metrics: Metrics,
}

impl AppState {
    pub fn new(chat: Arc<dyn ChatStore>) -> Self {
        Self {
            orders: DashMap::new(),
            issues: DashMap::new(),
            availability: DashMap::new(),
            availability_seq: AtomicI64::new(1),
            chat,
            metrics: Metrics::new(),
        }
    }

    /// State with the in-memory chat backend; the default for tests.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryChatStore::new()))
    }

    pub fn next_availability_id(&self) -> i64 {
        self.availability_seq.fetch_add(1, Ordering::Relaxed)
    }
}
