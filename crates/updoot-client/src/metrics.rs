use prometheus::{register_int_counter_vec, Encoder, IntCounterVec, TextEncoder};

lazy_static::lazy_static! {
    pub static ref REQUESTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "updoot_backend_requests_total",
        "Backend requests issued per namespace and method",
        &["namespace", "method"]
    ).unwrap();

    pub static ref FAILURES_TOTAL: IntCounterVec = register_int_counter_vec!(
        "updoot_backend_failures_total",
        "Backend requests that failed at the transport or decoding level",
        &["namespace", "method"]
    ).unwrap();

    pub static ref ENGAGEMENT_SYNC_TOTAL: IntCounterVec = register_int_counter_vec!(
        "updoot_engagement_sync_total",
        "Settled engagement requests by action kind and outcome",
        &["kind", "outcome"]
    ).unwrap();
}

/// Renders every registered metric in the Prometheus text format.
pub fn render() -> String {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&prometheus::gather(), &mut buffer) {
        tracing::warn!(error = %e, "failed to encode metrics");
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_includes_registered_counters() {
        REQUESTS_TOTAL.with_label_values(&["user", "GET"]).inc();
        let text = render();
        assert!(text.contains("updoot_backend_requests_total"));
    }
}
