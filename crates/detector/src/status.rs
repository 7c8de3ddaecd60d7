use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

/// A cloneable handle on the divergence flag. The detector task is the only writer; the HTTP
/// status handler reads it concurrently.
#[derive(Debug, Clone, Default)]
pub struct FaultStatus(Arc<AtomicBool>);

impl FaultStatus {
    /// Returns a new handle in the non-diverged state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true when the most recent completed comparison produced a mismatch.
    pub fn is_fault_detected(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    /// Records the outcome of the most recent comparison. Only the detector task writes this.
    pub fn set_diverged(&self, diverged: bool) {
        self.0.store(diverged, Ordering::Relaxed);
    }
}
