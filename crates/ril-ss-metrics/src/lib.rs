//! Metric declarations for the USSD transaction layer.
//!
//! Every metric the layer records is declared once in [`metric_defs`] with its
//! kind, unit, help text and label keys. Recording goes through the `metrics`
//! facade, re-exported here. Without an installed recorder all recording is a
//! no-op.
//!
//! # Example
//!
//! ```rust,ignore
//! use ril_ss_metrics::{describe_metrics, metric_defs, MetricLabels};
//!
//! describe_metrics();
//!
//! let labels = MetricLabels::new("modem0").with("dialect", "gsm7");
//! metrics::counter!(metric_defs::USSD_TX_REQUESTS.name, labels.as_slice()).increment(1);
//! ```

pub use metrics;

use metrics::{describe_counter, describe_gauge, describe_histogram, Unit};

/// Label set as accepted by the `metrics` macros.
pub type Labels = Vec<(&'static str, String)>;

/// How a metric aggregates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    Counter,
    Gauge,
    Histogram,
}

/// A declared metric.
#[derive(Debug, Clone)]
pub struct Metric {
    /// Recorder key, e.g. `ril.ussd.tx_requests`.
    pub name: &'static str,
    pub kind: MetricKind,
    pub unit: Unit,
    /// Help text registered with the recorder.
    pub help: &'static str,
    /// Label keys recorded alongside the value, `modem` first.
    pub labels: &'static [&'static str],
}

impl Metric {
    const fn declare(
        kind: MetricKind,
        name: &'static str,
        unit: Unit,
        help: &'static str,
        labels: &'static [&'static str],
    ) -> Self {
        Metric {
            name,
            kind,
            unit,
            help,
            labels,
        }
    }

    /// Register the unit and help text with the installed recorder.
    pub fn describe(&self) {
        let (name, unit, help) = (self.name, self.unit, self.help);
        match self.kind {
            MetricKind::Counter => describe_counter!(name, unit, help),
            MetricKind::Gauge => describe_gauge!(name, unit, help),
            MetricKind::Histogram => describe_histogram!(name, unit, help),
        }
    }
}

/// Every metric the layer records.
pub mod metric_defs {
    use super::{Metric, MetricKind, Unit};

    /// Labels present on every metric.
    pub const STANDARD_LABELS: &[&str] = &["modem"];

    // ========================================================================
    // Outbound
    // ========================================================================

    pub const USSD_TX_REQUESTS: Metric = Metric::declare(
        MetricKind::Counter,
        "ril.ussd.tx_requests",
        Unit::Count,
        "USSD send requests handed to the transport",
        &["modem", "dialect"],
    );

    /// Reasons: malformed, too_long, duplicate, transport.
    pub const USSD_TX_REJECTED: Metric = Metric::declare(
        MetricKind::Counter,
        "ril.ussd.tx_rejected",
        Unit::Count,
        "USSD requests failed before the modem acknowledged them",
        &["modem", "reason"],
    );

    pub const USSD_TX_PAYLOAD_SIZE: Metric = Metric::declare(
        MetricKind::Histogram,
        "ril.ussd.tx_payload_bytes",
        Unit::Bytes,
        "Encoded USSD payload size",
        &["modem", "dialect"],
    );

    pub const USSD_CANCEL_REQUESTS: Metric = Metric::declare(
        MetricKind::Counter,
        "ril.ussd.cancel_requests",
        Unit::Count,
        "USSD cancel requests handed to the transport",
        &["modem"],
    );

    // ========================================================================
    // Inbound
    // ========================================================================

    /// The state label is empty for an unrecognized state byte.
    pub const USSD_RX_NOTIFICATIONS: Metric = Metric::declare(
        MetricKind::Counter,
        "ril.ussd.rx_notifications",
        Unit::Count,
        "USSD notifications decoded and emitted",
        &["modem", "state"],
    );

    pub const USSD_RX_FALLBACK_DECODES: Metric = Metric::declare(
        MetricKind::Counter,
        "ril.ussd.rx_fallback_decodes",
        Unit::Count,
        "USSD notifications decoded best-effort",
        &["modem", "coding_scheme"],
    );

    pub const USSD_RX_MALFORMED: Metric = Metric::declare(
        MetricKind::Counter,
        "ril.ussd.rx_malformed",
        Unit::Count,
        "USSD notification frames shorter than the header",
        &["modem"],
    );

    // ========================================================================
    // Correlation
    // ========================================================================

    /// Status: success or failure.
    pub const USSD_ACK_RESULTS: Metric = Metric::declare(
        MetricKind::Counter,
        "ril.ussd.ack_results",
        Unit::Count,
        "Generic acknowledgments matched to pending USSD requests",
        &["modem", "status"],
    );

    pub const USSD_PENDING_REQUESTS: Metric = Metric::declare(
        MetricKind::Gauge,
        "ril.ussd.pending_requests",
        Unit::Count,
        "USSD requests awaiting a modem acknowledgment",
        &["modem"],
    );

    pub const ALL: &[&Metric] = &[
        &USSD_TX_REQUESTS,
        &USSD_TX_REJECTED,
        &USSD_TX_PAYLOAD_SIZE,
        &USSD_CANCEL_REQUESTS,
        &USSD_RX_NOTIFICATIONS,
        &USSD_RX_FALLBACK_DECODES,
        &USSD_RX_MALFORMED,
        &USSD_ACK_RESULTS,
        &USSD_PENDING_REQUESTS,
    ];
}

/// The `modem` label shared by every metric.
///
/// ```rust
/// use ril_ss_metrics::MetricLabels;
///
/// let labels = MetricLabels::new("modem0").with("reason", "too_long");
/// assert_eq!(labels[0], ("modem", "modem0".to_string()));
/// assert_eq!(labels[1], ("reason", "too_long".to_string()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricLabels {
    pub modem: String,
}

impl MetricLabels {
    pub fn new(modem: impl Into<String>) -> Self {
        MetricLabels {
            modem: modem.into(),
        }
    }

    /// Just the standard labels.
    pub fn base(&self) -> Labels {
        vec![("modem", self.modem.clone())]
    }

    /// Standard labels plus one metric-specific pair.
    pub fn with(&self, key: &'static str, value: impl Into<String>) -> Labels {
        let mut labels = self.base();
        labels.push((key, value.into()));
        labels
    }
}

/// Register every metric's description. Call after installing a recorder.
pub fn describe_metrics() {
    metric_defs::ALL.iter().for_each(|metric| metric.describe());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_labels() {
        let labels = MetricLabels::new("xmm6262");
        assert_eq!(labels.base(), vec![("modem", "xmm6262".to_string())]);
    }

    #[test]
    fn test_with_appends_after_modem() {
        let labels = MetricLabels::new("modem0").with("state", "");
        assert_eq!(labels.len(), 2);
        assert_eq!(labels[0].0, "modem");
        assert_eq!(labels[1], ("state", String::new()));
    }

    #[test]
    fn test_kinds_and_units() {
        assert_eq!(metric_defs::USSD_TX_REQUESTS.kind, MetricKind::Counter);
        assert_eq!(metric_defs::USSD_TX_PAYLOAD_SIZE.kind, MetricKind::Histogram);
        assert_eq!(metric_defs::USSD_TX_PAYLOAD_SIZE.unit, Unit::Bytes);
        assert_eq!(metric_defs::USSD_PENDING_REQUESTS.kind, MetricKind::Gauge);
    }

    #[test]
    fn test_every_metric_is_labelled_by_modem() {
        assert_eq!(metric_defs::ALL.len(), 9);
        for metric in metric_defs::ALL {
            assert_eq!(metric.labels.first(), Some(&"modem"), "{}", metric.name);
            assert!(metric.name.starts_with("ril.ussd."));
        }
    }

    #[test]
    fn test_names_are_unique() {
        let mut names: Vec<_> = metric_defs::ALL.iter().map(|m| m.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), metric_defs::ALL.len());
    }

    #[test]
    fn test_describe_without_recorder() {
        describe_metrics();
    }
}
