use prometheus::{Encoder, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};

/// Prometheus-tellere for klienten. Klonbar: tellerne deles (Arc internt).
#[derive(Clone)]
pub struct ApiMetrics {
    registry: Registry,
    requests: IntCounterVec,
    retries: IntCounterVec,
    stale_dropped: IntCounter,
}

impl ApiMetrics {
    pub fn new() -> prometheus::Result<Self> {
        let registry = Registry::new_custom(Some("equipviz".to_string()), None)?;

        let requests = IntCounterVec::new(
            Opts::new("api_requests_total", "Backend requests by endpoint and outcome"),
            &["endpoint", "outcome"],
        )?;
        let retries = IntCounterVec::new(
            Opts::new("api_retries_total", "Retried idempotent GET requests"),
            &["endpoint"],
        )?;
        let stale_dropped = IntCounter::new(
            "stale_completions_total",
            "Completions dropped because a newer selection or logout happened",
        )?;

        registry.register(Box::new(requests.clone()))?;
        registry.register(Box::new(retries.clone()))?;
        registry.register(Box::new(stale_dropped.clone()))?;

        Ok(Self {
            registry,
            requests,
            retries,
            stale_dropped,
        })
    }

    /// Tekstformat (Prometheus exposition).
    pub fn render(&self) -> String {
        let mut buf = Vec::new();
        if let Err(e) = TextEncoder::new().encode(&self.registry.gather(), &mut buf) {
            log::warn!("Failed to encode metrics: {e}");
        }
        String::from_utf8_lossy(&buf).into_owned()
    }
}

pub fn api_requests_total(metrics: &ApiMetrics, endpoint: &str, outcome: &str) -> IntCounter {
    metrics.requests.with_label_values(&[endpoint, outcome])
}

pub fn api_retries_total(metrics: &ApiMetrics, endpoint: &str) -> IntCounter {
    metrics.retries.with_label_values(&[endpoint])
}

pub fn stale_completions_total(metrics: &ApiMetrics) -> &IntCounter {
    &metrics.stale_dropped
}
