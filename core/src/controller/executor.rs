//! Bounded-parallel execution of request specs

use crate::config::ConfigError;
use crate::error::{BenchResult, ErrorKind};
use crate::outcome::RequestOutcome;
use crate::request::{RequestId, RequestSpec};
use crate::traits::RequestExecutor;

use super::stats::InFlightGauge;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, watch, OwnedSemaphorePermit, Semaphore};

/// Published once per request as soon as its outcome is known
#[derive(Debug, Clone)]
pub struct CompletionEvent {
    /// Request that finished
    pub id: RequestId,
    /// Requests finished so far, this one included
    pub completed: usize,
    /// Requests in the run
    pub total: usize,
    /// How the request ended
    pub outcome: RequestOutcome,
}

/// Runs request specs with at most P of them in flight
///
/// Specs are admitted in index order. Each admitted spec runs on its own tokio
/// task holding one semaphore permit; the permit is released as soon as the
/// request reaches a terminal state, before its completion event is published.
pub struct ConcurrencyController {
    executor: Arc<dyn RequestExecutor>,
    events_tx: Option<mpsc::Sender<CompletionEvent>>,
    cancel_rx: watch::Receiver<bool>,
    gauge: Arc<InFlightGauge>,
}

impl ConcurrencyController {
    pub(super) fn new(
        executor: Arc<dyn RequestExecutor>,
        events_tx: Option<mpsc::Sender<CompletionEvent>>,
        cancel_rx: watch::Receiver<bool>,
    ) -> Self {
        Self {
            executor,
            events_tx,
            cancel_rx,
            gauge: Arc::new(InFlightGauge::new()),
        }
    }

    /// Highest number of simultaneously executing requests in the latest run
    pub fn peak_in_flight(&self) -> usize {
        self.gauge.peak()
    }

    /// Execute every spec and return one outcome per spec, in input order
    ///
    /// Fails only when `max_parallel` is zero. Per-request failures, timeouts
    /// and cancellations are reported inside the returned outcomes.
    pub async fn run(
        &self,
        specs: Vec<RequestSpec>,
        max_parallel: usize,
    ) -> BenchResult<Vec<RequestOutcome>> {
        if max_parallel == 0 {
            return Err(ConfigError::InvalidParallelism(max_parallel).into());
        }

        let total = specs.len();
        if total == 0 {
            return Ok(Vec::new());
        }

        self.gauge.reset();
        let slots = max_parallel.min(total);
        let semaphore = Arc::new(Semaphore::new(slots));
        let publisher = Publisher {
            events_tx: self.events_tx.clone(),
            completed: Arc::new(AtomicUsize::new(0)),
            total,
        };
        let mut cancel_rx = self.cancel_rx.clone();
        let mut results: Vec<Option<RequestOutcome>> = vec![None; total];
        let mut handles = Vec::with_capacity(total);
        let mut stopped = false;

        tracing::debug!(
            executor = self.executor.name(),
            total,
            slots,
            "Controller started"
        );

        for (position, spec) in specs.into_iter().enumerate() {
            let admitted = if stopped {
                None
            } else {
                tokio::select! {
                    biased;

                    _ = cancelled(&mut cancel_rx) => None,
                    permit = Arc::clone(&semaphore).acquire_owned() => permit.ok(),
                }
            };

            match admitted {
                Some(permit) => {
                    let id = spec.id;
                    let handle = tokio::spawn(self.execute_one(spec, permit, publisher.clone()));
                    handles.push((position, id, handle));
                }
                None => {
                    if !stopped {
                        tracing::info!(
                            admitted = handles.len(),
                            total,
                            "Run cancelled, skipping remaining requests"
                        );
                        stopped = true;
                    }
                    let outcome = RequestOutcome::failure(
                        ErrorKind::Cancelled,
                        "run cancelled before the request was sent",
                        Duration::ZERO,
                    );
                    publisher.publish(spec.id, &outcome);
                    results[position] = Some(outcome);
                }
            }
        }

        for (position, id, handle) in handles {
            let outcome = match handle.await {
                Ok(outcome) => outcome,
                Err(e) => {
                    tracing::error!(request_index = id.0, error = %e, "Request task aborted");
                    let outcome = RequestOutcome::failure(
                        ErrorKind::Cancelled,
                        format!("request task aborted: {e}"),
                        Duration::ZERO,
                    );
                    publisher.publish(id, &outcome);
                    outcome
                }
            };
            results[position] = Some(outcome);
        }

        tracing::debug!(
            total,
            peak_in_flight = self.gauge.peak(),
            "Controller finished"
        );

        Ok(results
            .into_iter()
            .map(|slot| {
                slot.unwrap_or_else(|| {
                    RequestOutcome::failure(
                        ErrorKind::Cancelled,
                        "request produced no outcome",
                        Duration::ZERO,
                    )
                })
            })
            .collect())
    }

    /// Build the task future for one admitted spec
    fn execute_one(
        &self,
        spec: RequestSpec,
        permit: OwnedSemaphorePermit,
        publisher: Publisher,
    ) -> impl std::future::Future<Output = RequestOutcome> + Send + 'static {
        let executor = Arc::clone(&self.executor);
        let gauge = Arc::clone(&self.gauge);
        let mut cancel_rx = self.cancel_rx.clone();

        async move {
            let start = Instant::now();
            let outcome = {
                let _active = gauge.enter();

                tokio::select! {
                    biased;

                    _ = cancelled(&mut cancel_rx) => RequestOutcome::failure(
                        ErrorKind::Cancelled,
                        "run cancelled while the request was in flight",
                        start.elapsed(),
                    ),
                    outcome = executor.execute(&spec) => outcome,
                }
            };
            drop(permit);

            match outcome.failure_info() {
                Some(failure) => tracing::warn!(
                    request_index = spec.index(),
                    kind = %failure.kind,
                    elapsed_ms = failure.elapsed.as_millis() as u64,
                    error = %failure.message,
                    "Request failed"
                ),
                None => tracing::debug!(
                    request_index = spec.index(),
                    elapsed_ms = outcome.elapsed().as_millis() as u64,
                    "Request completed"
                ),
            }

            publisher.publish(spec.id, &outcome);
            outcome
        }
    }
}

impl std::fmt::Debug for ConcurrencyController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConcurrencyController")
            .field("executor", &self.executor.name())
            .field("events", &self.events_tx.is_some())
            .field("cancelled", &*self.cancel_rx.borrow())
            .field("gauge", &self.gauge)
            .finish()
    }
}

/// Shared completion counter plus the optional event channel
#[derive(Clone)]
struct Publisher {
    events_tx: Option<mpsc::Sender<CompletionEvent>>,
    completed: Arc<AtomicUsize>,
    total: usize,
}

impl Publisher {
    /// Count the completion and offer an event without waiting
    ///
    /// A full or closed channel drops the event; the outcome is still recorded.
    fn publish(&self, id: RequestId, outcome: &RequestOutcome) {
        let completed = self.completed.fetch_add(1, Ordering::SeqCst) + 1;

        if let Some(tx) = &self.events_tx {
            let event = CompletionEvent {
                id,
                completed,
                total: self.total,
                outcome: outcome.clone(),
            };
            match tx.try_send(event) {
                Ok(()) => {}
                Err(TrySendError::Full(_)) => {
                    tracing::trace!(
                        request_index = id.0,
                        "Progress channel full, event dropped"
                    );
                }
                Err(TrySendError::Closed(_)) => {
                    tracing::trace!(request_index = id.0, "Progress channel closed");
                }
            }
        }
    }
}

/// Resolves once the watched flag is `true`
///
/// Never resolves if the sender is dropped without cancelling.
async fn cancelled(rx: &mut watch::Receiver<bool>) {
    loop {
        if *rx.borrow_and_update() {
            return;
        }
        if rx.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}
