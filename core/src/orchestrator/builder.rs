//! Builder pattern for Orchestrator construction

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::channel::ChannelConfig;
use crate::config::RunConfig;
use crate::controller::CompletionEvent;
use crate::error::{BenchError, BenchResult};
use crate::traits::{RequestExecutor, Sampler};

use super::executor::Orchestrator;

/// Builder for creating an Orchestrator with proper configuration
///
/// # Example
///
/// ```ignore
/// let (orchestrator, events_rx) = OrchestratorBuilder::new()
///     .config(config)
///     .parallelism(4)
///     .executor(executor)
///     .sampler(sampler)
///     .build()?;
/// ```
pub struct OrchestratorBuilder {
    config: RunConfig,
    executor: Option<Arc<dyn RequestExecutor>>,
    sampler: Option<Arc<dyn Sampler>>,
    channel_config: ChannelConfig,
}

impl OrchestratorBuilder {
    /// Create a new orchestrator builder with default configuration
    pub fn new() -> Self {
        Self {
            config: RunConfig::default(),
            executor: None,
            sampler: None,
            channel_config: ChannelConfig::default(),
        }
    }

    /// Set the full run configuration
    pub fn config(mut self, config: RunConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the number of requests
    pub fn num_requests(mut self, n: usize) -> Self {
        self.config.num_requests = n;
        self
    }

    /// Set the parallelism bound
    pub fn parallelism(mut self, p: usize) -> Self {
        self.config.parallelism = p;
        self
    }

    /// Set the request executor
    pub fn executor(mut self, executor: Arc<dyn RequestExecutor>) -> Self {
        self.executor = Some(executor);
        self
    }

    /// Set the prompt sampler
    pub fn sampler(mut self, sampler: Arc<dyn Sampler>) -> Self {
        self.sampler = Some(sampler);
        self
    }

    /// Set the channel configuration
    pub fn channel_config(mut self, config: ChannelConfig) -> Self {
        self.channel_config = config;
        self
    }

    /// Build the orchestrator and return it along with the progress receiver
    ///
    /// The receiver yields one [`CompletionEvent`] per request and closes once
    /// the run has finished.
    ///
    /// # Errors
    ///
    /// Returns an error if executor or sampler are not set, or if configuration
    /// validation fails.
    pub fn build(self) -> BenchResult<(Orchestrator, mpsc::Receiver<CompletionEvent>)> {
        let executor = self.executor.ok_or(BenchError::missing("executor"))?;
        let sampler = self.sampler.ok_or(BenchError::missing("sampler"))?;

        self.config.validate()?;

        let (events_tx, events_rx) = mpsc::channel(self.channel_config.events_buffer);

        let orchestrator = Orchestrator::new(self.config, executor, sampler, events_tx);

        Ok((orchestrator, events_rx))
    }
}

impl Default for OrchestratorBuilder {
    fn default() -> Self {
        Self::new()
    }
}
