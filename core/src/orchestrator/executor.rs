//! Orchestrator execution logic

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::{mpsc, watch};

use crate::config::RunConfig;
use crate::controller::{CompletionEvent, ControllerBuilder};
use crate::error::BenchResult;
use crate::metrics::RunReport;
use crate::outcome::RunResult;
use crate::request::RequestSpec;
use crate::traits::{RequestExecutor, Sampler};

/// Orchestrator manages one run from configuration to report
///
/// A run is consumed by [`Orchestrator::run`]; the progress channel handed out
/// by the builder closes when it returns.
pub struct Orchestrator {
    /// Run configuration
    pub(crate) config: RunConfig,

    /// Request executor (shared by every request task)
    pub(crate) executor: Arc<dyn RequestExecutor>,

    /// Prompt source
    pub(crate) sampler: Arc<dyn Sampler>,

    /// Progress sender
    pub(crate) events_tx: mpsc::Sender<CompletionEvent>,

    /// Cancellation flag
    pub(crate) cancel_tx: Arc<watch::Sender<bool>>,
}

/// Requests cancellation of a running orchestrator from elsewhere
#[derive(Debug, Clone)]
pub struct CancelHandle {
    cancel_tx: Arc<watch::Sender<bool>>,
}

impl CancelHandle {
    /// Cancel the run; in-flight and pending requests become cancelled outcomes
    pub fn cancel(&self) {
        self.cancel_tx.send_replace(true);
    }

    /// Check if cancellation was requested
    pub fn is_cancelled(&self) -> bool {
        *self.cancel_tx.borrow()
    }
}

impl Orchestrator {
    /// Create a new orchestrator
    ///
    /// Use `OrchestratorBuilder` for a more ergonomic construction.
    pub fn new(
        config: RunConfig,
        executor: Arc<dyn RequestExecutor>,
        sampler: Arc<dyn Sampler>,
        events_tx: mpsc::Sender<CompletionEvent>,
    ) -> Self {
        let (cancel_tx, _) = watch::channel(false);

        Self {
            config,
            executor,
            sampler,
            events_tx,
            cancel_tx: Arc::new(cancel_tx),
        }
    }

    /// Get a handle that can cancel this run
    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle {
            cancel_tx: Arc::clone(&self.cancel_tx),
        }
    }

    /// Cancel the run
    pub fn cancel(&self) {
        self.cancel_tx.send_replace(true);
    }

    /// Get the run configuration
    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Execute the run and aggregate its outcomes
    ///
    /// # Errors
    ///
    /// Fails before any request is sent if the configuration is invalid or the
    /// sampler cannot produce a prompt. Individual request failures never fail
    /// the run.
    pub async fn run(self) -> BenchResult<RunReport> {
        self.config.validate()?;

        let specs = self.build_specs()?;
        let parallelism = self.config.effective_parallelism();

        let controller = ControllerBuilder::new()
            .executor(Arc::clone(&self.executor))
            .events_tx(self.events_tx)
            .cancellation(self.cancel_tx.subscribe())
            .build()?;

        tracing::info!(
            executor = self.executor.name(),
            sampler = self.sampler.name(),
            base_url = %self.config.base_url,
            model = %self.config.model,
            num_requests = self.config.num_requests,
            parallelism,
            stream = self.config.stream,
            "Starting run"
        );

        let started_at = chrono::Utc::now();
        let start = Instant::now();
        let outcomes = controller.run(specs, parallelism).await?;
        let wall_time = start.elapsed();

        let result = RunResult {
            outcomes,
            wall_time,
            started_at,
            peak_in_flight: controller.peak_in_flight(),
            config: self.config,
        };
        let report = RunReport::new(result);

        tracing::info!(
            elapsed_secs = wall_time.as_secs_f64(),
            successful = report.stats.successful_requests,
            failed = report.stats.failed_requests,
            tokens_per_second = report.stats.aggregate_tokens_per_second,
            "Run completed"
        );

        Ok(report)
    }

    /// Run with Ctrl+C signal handling
    ///
    /// Ctrl+C cancels the run; the report still covers every request.
    pub async fn run_with_signal_handling(self) -> BenchResult<RunReport> {
        let handle = self.cancel_handle();

        let signal_handle = tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    tracing::info!("Received Ctrl+C, cancelling run...");
                    handle.cancel();
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to listen for Ctrl+C");
                }
            }
        });

        let result = self.run().await;

        signal_handle.abort();

        result
    }

    /// One spec per index, prompts drawn before anything is dispatched
    fn build_specs(&self) -> BenchResult<Vec<RequestSpec>> {
        (0..self.config.num_requests)
            .map(|index| {
                let prompt = self.sampler.sample(self.config.prompt_size)?;
                Ok(RequestSpec::from_config(index, &self.config, prompt))
            })
            .collect()
    }
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("config", &self.config)
            .field("executor", &self.executor.name())
            .field("sampler", &self.sampler.name())
            .finish()
    }
}
