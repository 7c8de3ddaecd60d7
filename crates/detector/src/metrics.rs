use metrics::Gauge;
use metrics_derive::Metrics;

/// The metrics for the [`super::FaultDetector`].
#[derive(Metrics)]
#[metrics(scope = "fault_detector")]
pub struct FaultDetectorMetrics {
    /// The highest output index that was successfully checked for faults.
    pub highest_output_index: Gauge,
    /// 0 when state is matched, 1 when mismatch.
    pub is_state_mismatch: Gauge,
    /// Number of times API call failed.
    pub api_connection_failure: Gauge,
}
