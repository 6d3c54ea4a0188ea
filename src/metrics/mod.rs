//! Prometheus metrics for the email service.
//!
//! - Send metrics (delivered vs failed, rejections before transport, latency)
//! - Default-selection metrics (records whose default flag was cleared)
//! - Account metrics (logins, created templates)

mod helpers;

pub use helpers::{encode_metrics, AccountMetrics, DefaultMetrics, EmailMetrics};

use lazy_static::lazy_static;
use prometheus::{
    register_histogram, register_int_counter, register_int_counter_vec, Histogram, IntCounter,
    IntCounterVec,
};

lazy_static! {
    // ============================================================================
    // Send Metrics
    // ============================================================================

    /// Send attempts handed to the transport, by final status
    pub static ref EMAILS_SENT_TOTAL: IntCounterVec = register_int_counter_vec!(
        "emails_sent_total",
        "Total send attempts by status",
        &["status"]
    ).unwrap();

    /// Sends rejected before reaching the transport
    pub static ref EMAIL_SEND_REJECTED_TOTAL: IntCounterVec = register_int_counter_vec!(
        "email_send_rejected_total",
        "Total send requests rejected before the transport was called",
        &["reason"]
    ).unwrap();

    /// Transport round-trip latency in seconds
    pub static ref EMAIL_TRANSPORT_SECONDS: Histogram = register_histogram!(
        "email_transport_seconds",
        "Mail transport call latency in seconds",
        vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]
    ).unwrap();

    // ============================================================================
    // Default Selection Metrics
    // ============================================================================

    /// Records whose default flag was cleared to make room for a new default
    pub static ref DEFAULTS_CLEARED_TOTAL: IntCounterVec = register_int_counter_vec!(
        "defaults_cleared_total",
        "Total records whose default flag was cleared",
        &["collection"]
    ).unwrap();

    // ============================================================================
    // Account Metrics
    // ============================================================================

    pub static ref TEMPLATES_CREATED_TOTAL: IntCounter = register_int_counter!(
        "templates_created_total",
        "Total templates created, including seeded and bulk-created ones"
    ).unwrap();

    /// Completed sign-ins by kind (new or returning)
    pub static ref LOGINS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "logins_total",
        "Total completed sign-ins",
        &["kind"]
    ).unwrap();
}
