//! Metrics helper structs for convenient metric recording

use std::time::Duration;

use prometheus::{Encoder, TextEncoder};

use super::{
    DEFAULTS_CLEARED_TOTAL, EMAILS_SENT_TOTAL, EMAIL_SEND_REJECTED_TOTAL, EMAIL_TRANSPORT_SECONDS,
    LOGINS_TOTAL, TEMPLATES_CREATED_TOTAL,
};

/// Encode all metrics to Prometheus text format
pub fn encode_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8(buffer).unwrap_or_default())
}

/// Helper struct for recording send metrics
pub struct EmailMetrics;

impl EmailMetrics {
    pub fn record_sent(latency: Duration) {
        EMAILS_SENT_TOTAL.with_label_values(&["sent"]).inc();
        EMAIL_TRANSPORT_SECONDS.observe(latency.as_secs_f64());
    }

    pub fn record_failed(latency: Option<Duration>) {
        EMAILS_SENT_TOTAL.with_label_values(&["failed"]).inc();
        if let Some(latency) = latency {
            EMAIL_TRANSPORT_SECONDS.observe(latency.as_secs_f64());
        }
    }

    /// Record a send rejected before the transport, e.g. `no_recipients`
    pub fn record_rejected(reason: &str) {
        EMAIL_SEND_REJECTED_TOTAL.with_label_values(&[reason]).inc();
    }
}

/// Helper struct for recording default-selection metrics
pub struct DefaultMetrics;

impl DefaultMetrics {
    pub fn record_cleared(collection: &str, count: u64) {
        if count > 0 {
            DEFAULTS_CLEARED_TOTAL
                .with_label_values(&[collection])
                .inc_by(count);
        }
    }
}

/// Helper struct for recording account metrics
pub struct AccountMetrics;

impl AccountMetrics {
    pub fn record_login(is_new: bool) {
        let kind = if is_new { "new" } else { "returning" };
        LOGINS_TOTAL.with_label_values(&[kind]).inc();
    }

    pub fn record_templates_created(count: u64) {
        TEMPLATES_CREATED_TOTAL.inc_by(count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_includes_recorded_metrics() {
        EmailMetrics::record_rejected("no_recipients");
        DefaultMetrics::record_cleared("templates", 1);

        let output = encode_metrics().unwrap();
        assert!(output.contains("email_send_rejected_total"));
        assert!(output.contains("defaults_cleared_total"));
    }

    #[test]
    fn test_zero_cleared_is_not_recorded() {
        let before = DEFAULTS_CLEARED_TOTAL
            .with_label_values(&["recipients_noop"])
            .get();
        DefaultMetrics::record_cleared("recipients_noop", 0);
        let after = DEFAULTS_CLEARED_TOTAL
            .with_label_values(&["recipients_noop"])
            .get();
        assert_eq!(before, after);
    }
}
