use prometheus::{Encoder, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};

#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    pub status_updates_total: IntCounterVec,
    pub chat_messages_total: IntCounterVec,
    pub conversations_resolved_total: IntCounterVec,
    pub delivery_issues_total: IntCounter,
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let status_updates_total = IntCounterVec::new(
            Opts::new("status_updates_total", "Order status updates by new status"),
            &["status"],
        )
        .expect("valid status_updates_total metric");

        let chat_messages_total = IntCounterVec::new(
            Opts::new("chat_messages_total", "Chat messages sent by channel"),
            &["channel"],
        )
        .expect("valid chat_messages_total metric");

        let conversations_resolved_total = IntCounterVec::new(
            Opts::new(
                "conversations_resolved_total",
                "Conversations resolved by channel",
            ),
            &["channel"],
        )
        .expect("valid conversations_resolved_total metric");

        let delivery_issues_total = IntCounter::new(
            "delivery_issues_total",
            "Total delivery issues reported by drivers",
        )
        .expect("valid delivery_issues_total metric");

        registry
            .register(Box::new(status_updates_total.clone()))
            .expect("register status_updates_total");
        registry
            .register(Box::new(chat_messages_total.clone()))
            .expect("register chat_messages_total");
        registry
            .register(Box::new(conversations_resolved_total.clone()))
            .expect("register conversations_resolved_total");
        registry
            .register(Box::new(delivery_issues_total.clone()))
            .expect("register delivery_issues_total");

        Self {
            registry,
            status_updates_total,
            chat_messages_total,
            conversations_resolved_total,
            delivery_issues_total,
        }
    }

    pub fn encode(&self) -> Result<String, String> {
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();

        TextEncoder::new()
            .encode(&metric_families, &mut buffer)
            .map_err(|err| format!("failed to encode metrics: {err}"))?;

        String::from_utf8(buffer).map_err(|err| format!("metrics are not valid utf8: {err}"))
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
