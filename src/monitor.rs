//! Background sampling of system memory while a run is in flight

use std::time::Duration;

use sysinfo::System;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use vllm_bench_report::MemorySummary;

const SAMPLE_INTERVAL: Duration = Duration::from_millis(500);
const BYTES_PER_GB: f64 = 1024.0 * 1024.0 * 1024.0;

/// Samples used memory every 500ms until stopped
pub struct RamMonitor {
    stop_tx: oneshot::Sender<()>,
    handle: JoinHandle<Option<MemorySummary>>,
}

impl RamMonitor {
    /// Take a first sample and keep sampling on a background task
    pub fn start() -> Self {
        let (stop_tx, mut stop_rx) = oneshot::channel();

        let handle = tokio::spawn(async move {
            let mut sys = System::new();
            let mut samples = Vec::new();
            let mut ticker = tokio::time::interval(SAMPLE_INTERVAL);

            loop {
                tokio::select! {
                    biased;
                    _ = &mut stop_rx => break,
                    _ = ticker.tick() => {
                        sys.refresh_memory();
                        samples.push(sys.used_memory() as f64 / BYTES_PER_GB);
                    }
                }
            }

            // Closing sample at stop time
            sys.refresh_memory();
            samples.push(sys.used_memory() as f64 / BYTES_PER_GB);

            let total_gb = sys.total_memory() as f64 / BYTES_PER_GB;
            MemorySummary::from_samples(total_gb, &samples)
        });

        Self { stop_tx, handle }
    }

    /// Stop sampling and summarise what was collected
    pub async fn stop(self) -> Option<MemorySummary> {
        let _ = self.stop_tx.send(());
        match self.handle.await {
            Ok(summary) => summary,
            Err(e) => {
                tracing::warn!(error = %e, "RAM monitor task failed");
                None
            }
        }
    }
}
