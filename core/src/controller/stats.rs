//! In-flight request tracking

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Counts requests currently executing and remembers the high-water mark
#[derive(Debug, Default)]
pub struct InFlightGauge {
    current: AtomicUsize,
    peak: AtomicUsize,
}

impl InFlightGauge {
    /// Create a new gauge at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark one request as active until the returned guard is dropped
    pub fn enter(self: &Arc<Self>) -> InFlightGuard {
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        InFlightGuard {
            gauge: Arc::clone(self),
        }
    }

    /// Requests active right now
    pub fn current(&self) -> usize {
        self.current.load(Ordering::SeqCst)
    }

    /// Highest number of simultaneously active requests observed
    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    /// Reset the high-water mark to the current count
    pub fn reset(&self) {
        self.peak.store(self.current(), Ordering::SeqCst);
    }
}

/// Decrements the owning gauge when dropped
#[derive(Debug)]
pub struct InFlightGuard {
    gauge: Arc<InFlightGauge>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.gauge.current.fetch_sub(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gauge_defaults() {
        let gauge = InFlightGauge::new();
        assert_eq!(gauge.current(), 0);
        assert_eq!(gauge.peak(), 0);
    }

    #[test]
    fn test_gauge_tracks_peak() {
        let gauge = Arc::new(InFlightGauge::new());

        let a = gauge.enter();
        let b = gauge.enter();
        assert_eq!(gauge.current(), 2);
        drop(a);
        let c = gauge.enter();
        assert_eq!(gauge.current(), 2);
        drop(b);
        drop(c);

        assert_eq!(gauge.current(), 0);
        assert_eq!(gauge.peak(), 2);
    }

    #[test]
    fn test_gauge_reset() {
        let gauge = Arc::new(InFlightGauge::new());
        {
            let _a = gauge.enter();
            let _b = gauge.enter();
        }
        gauge.reset();
        assert_eq!(gauge.peak(), 0);
    }
}
