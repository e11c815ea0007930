//! Builder pattern for ConcurrencyController construction

use crate::error::{BenchError, BenchResult};
use crate::traits::RequestExecutor;

use super::executor::{CompletionEvent, ConcurrencyController};

use std::sync::Arc;
use tokio::sync::{mpsc, watch};

/// Builder for creating a ConcurrencyController
///
/// # Example
/// ```ignore
/// let controller = ControllerBuilder::new()
///     .executor(executor)
///     .events_tx(tx)
///     .cancellation(cancel_rx)
///     .build()?;
/// ```
#[derive(Default)]
pub struct ControllerBuilder {
    executor: Option<Arc<dyn RequestExecutor>>,
    events_tx: Option<mpsc::Sender<CompletionEvent>>,
    cancel_rx: Option<watch::Receiver<bool>>,
}

impl ControllerBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the request executor
    pub fn executor(mut self, executor: Arc<dyn RequestExecutor>) -> Self {
        self.executor = Some(executor);
        self
    }

    /// Publish a completion event per finished request on this channel
    pub fn events_tx(mut self, tx: mpsc::Sender<CompletionEvent>) -> Self {
        self.events_tx = Some(tx);
        self
    }

    /// Cancel the run once this receiver observes `true`
    pub fn cancellation(mut self, rx: watch::Receiver<bool>) -> Self {
        self.cancel_rx = Some(rx);
        self
    }

    /// Build the controller
    ///
    /// # Errors
    /// Returns an error if no executor was set.
    pub fn build(self) -> BenchResult<ConcurrencyController> {
        let executor = self.executor.ok_or(BenchError::missing("executor"))?;

        // A receiver whose sender is gone never reports cancellation
        let cancel_rx = self.cancel_rx.unwrap_or_else(|| watch::channel(false).1);

        Ok(ConcurrencyController::new(
            executor,
            self.events_tx,
            cancel_rx,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_missing_executor() {
        let result = ControllerBuilder::new().build();

        assert!(matches!(
            result,
            Err(BenchError::MissingComponent("executor"))
        ));
    }
}
