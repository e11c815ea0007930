//! Tests for the Orchestrator module

use super::builder::OrchestratorBuilder;
use crate::channel::ChannelConfig;
use crate::config::{ConfigError, PromptSize, RunConfig};
use crate::error::{BenchError, ErrorKind};
use crate::outcome::RequestOutcome;
use crate::request::RequestSpec;
use crate::traits::{RequestExecutor, Sampler, SamplerError};

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

// ============================================================================
// Mock Sampler
// ============================================================================

struct MockSampler {
    counter: AtomicUsize,
    max_samples: Option<usize>,
}

impl MockSampler {
    fn new() -> Self {
        Self {
            counter: AtomicUsize::new(0),
            max_samples: None,
        }
    }

    fn with_max_samples(mut self, max: usize) -> Self {
        self.max_samples = Some(max);
        self
    }
}

impl Sampler for MockSampler {
    fn name(&self) -> &str {
        "mock"
    }

    fn sample(&self, size: PromptSize) -> Result<String, SamplerError> {
        let count = self.counter.fetch_add(1, Ordering::SeqCst);

        if let Some(max) = self.max_samples {
            if count >= max {
                return Err(SamplerError::Exhausted);
            }
        }

        Ok(format!("{size} prompt #{count}"))
    }
}

// ============================================================================
// Mock Executor
// ============================================================================

/// Returns 10 tokens per request after `delay`, with TTFT when streaming
struct MockExecutor {
    delay: Duration,
    fail_index: Option<usize>,
    calls: AtomicUsize,
    seen: Mutex<Vec<RequestSpec>>,
}

impl MockExecutor {
    fn new() -> Self {
        Self {
            delay: Duration::ZERO,
            fail_index: None,
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        }
    }

    fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    fn with_timeout_on(mut self, index: usize) -> Self {
        self.fail_index = Some(index);
        self
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RequestExecutor for MockExecutor {
    fn name(&self) -> &str {
        "mock"
    }

    async fn execute(&self, spec: &RequestSpec) -> RequestOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().unwrap().push(spec.clone());

        let start = Instant::now();
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        if self.fail_index == Some(spec.index()) {
            return RequestOutcome::failure(
                ErrorKind::Timeout,
                format!("no response within {:?}", spec.timeout),
                start.elapsed(),
            );
        }

        let wall = start.elapsed().max(Duration::from_millis(1));
        let ttft = spec.stream.then(|| wall / 10);
        RequestOutcome::success(10, Some(5), wall, ttft)
    }
}

fn config(n: usize, p: usize) -> RunConfig {
    RunConfig::new("http://localhost:8000", "test-model")
        .with_num_requests(n)
        .with_parallelism(p)
}

// ============================================================================
// Builder
// ============================================================================

#[test]
fn test_builder_missing_executor() {
    let result = OrchestratorBuilder::new()
        .sampler(Arc::new(MockSampler::new()))
        .build();

    assert!(matches!(
        result,
        Err(BenchError::MissingComponent("executor"))
    ));
}

#[test]
fn test_builder_missing_sampler() {
    let result = OrchestratorBuilder::new()
        .executor(Arc::new(MockExecutor::new()))
        .build();

    assert!(matches!(result, Err(BenchError::MissingComponent("sampler"))));
}

#[test]
fn test_builder_rejects_invalid_config() {
    let executor = Arc::new(MockExecutor::new());
    let result = OrchestratorBuilder::new()
        .config(config(8, 0))
        .executor(executor.clone())
        .sampler(Arc::new(MockSampler::new()))
        .build();

    assert!(matches!(
        result,
        Err(BenchError::Config(ConfigError::InvalidParallelism(0)))
    ));
    assert_eq!(executor.calls(), 0);
}

#[test]
fn test_builder_shorthand_setters() {
    let (orchestrator, _rx) = OrchestratorBuilder::new()
        .num_requests(3)
        .parallelism(2)
        .channel_config(ChannelConfig::default().with_events_buffer(4))
        .executor(Arc::new(MockExecutor::new()))
        .sampler(Arc::new(MockSampler::new()))
        .build()
        .expect("Failed to build orchestrator");

    assert_eq!(orchestrator.config().num_requests, 3);
    assert_eq!(orchestrator.config().parallelism, 2);
}

// ============================================================================
// Runs
// ============================================================================

#[tokio::test]
async fn test_run_all_success() {
    let executor = Arc::new(MockExecutor::new());
    let (orchestrator, _rx) = OrchestratorBuilder::new()
        .config(config(8, 4))
        .executor(executor.clone())
        .sampler(Arc::new(MockSampler::new()))
        .build()
        .expect("Failed to build orchestrator");

    let report = orchestrator.run().await.expect("Run failed");

    assert_eq!(report.result.len(), 8);
    assert_eq!(report.stats.total_requests, 8);
    assert_eq!(report.stats.successful_requests, 8);
    assert_eq!(report.stats.failed_requests, 0);
    assert_eq!(report.stats.total_completion_tokens, 80);
    assert_eq!(report.stats.total_prompt_tokens, 40);
    assert!(report.result.peak_in_flight <= 4);
    assert_eq!(executor.calls(), 8);
}

#[tokio::test]
async fn test_specs_carry_config_and_prompts() {
    let executor = Arc::new(MockExecutor::new());
    let run_config = config(3, 1)
        .with_max_tokens(32)
        .with_prompt_size(PromptSize::Large)
        .with_stream(false);
    let (orchestrator, _rx) = OrchestratorBuilder::new()
        .config(run_config)
        .executor(executor.clone())
        .sampler(Arc::new(MockSampler::new()))
        .build()
        .expect("Failed to build orchestrator");

    orchestrator.run().await.expect("Run failed");

    let seen = executor.seen.lock().unwrap();
    assert_eq!(seen.len(), 3);
    for (i, spec) in seen.iter().enumerate() {
        assert_eq!(spec.index(), i);
        assert_eq!(spec.model, "test-model");
        assert_eq!(spec.max_tokens, 32);
        assert!(!spec.stream);
        assert_eq!(spec.prompt, format!("large prompt #{i}"));
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_run_wall_time_reflects_parallelism() {
    let (orchestrator, _rx) = OrchestratorBuilder::new()
        .config(config(4, 2))
        .executor(Arc::new(
            MockExecutor::new().with_delay(Duration::from_millis(500)),
        ))
        .sampler(Arc::new(MockSampler::new()))
        .build()
        .expect("Failed to build orchestrator");

    let report = orchestrator.run().await.expect("Run failed");

    let wall = report.result.wall_time;
    assert!(wall >= Duration::from_millis(1000), "wall time {wall:?}");
    assert!(wall < Duration::from_millis(1900), "wall time {wall:?}");
    assert_eq!(report.stats.successful_requests, 4);
    assert_eq!(report.result.peak_in_flight, 2);
}

#[tokio::test]
async fn test_run_with_one_timeout() {
    let (orchestrator, _rx) = OrchestratorBuilder::new()
        .config(config(5, 2))
        .executor(Arc::new(MockExecutor::new().with_timeout_on(3)))
        .sampler(Arc::new(MockSampler::new()))
        .build()
        .expect("Failed to build orchestrator");

    let report = orchestrator.run().await.expect("Run failed");

    assert_eq!(report.stats.successful_requests, 4);
    assert_eq!(report.stats.failed_requests, 1);
    assert_eq!(report.stats.failures_of(ErrorKind::Timeout), 1);
    assert_eq!(
        report.result.outcomes[3].error_kind(),
        Some(ErrorKind::Timeout)
    );
}

#[tokio::test]
async fn test_non_streaming_run_has_no_ttft() {
    let (orchestrator, _rx) = OrchestratorBuilder::new()
        .config(config(3, 3).with_stream(false))
        .executor(Arc::new(MockExecutor::new()))
        .sampler(Arc::new(MockSampler::new()))
        .build()
        .expect("Failed to build orchestrator");

    let report = orchestrator.run().await.expect("Run failed");

    assert!(report.stats.time_to_first_token.is_none());
    assert!(report.stats.mean_ttft_ms().is_nan());
    assert!(report.stats.tokens_per_second.is_some());
}

#[tokio::test]
async fn test_sampler_failure_is_fatal_before_dispatch() {
    let executor = Arc::new(MockExecutor::new());
    let (orchestrator, _rx) = OrchestratorBuilder::new()
        .config(config(4, 2))
        .executor(executor.clone())
        .sampler(Arc::new(MockSampler::new().with_max_samples(2)))
        .build()
        .expect("Failed to build orchestrator");

    let result = orchestrator.run().await;

    assert!(matches!(
        result,
        Err(BenchError::Sampler(SamplerError::Exhausted))
    ));
    assert_eq!(executor.calls(), 0);
}

// ============================================================================
// Progress and cancellation
// ============================================================================

#[tokio::test]
async fn test_progress_channel_yields_one_event_per_request() {
    let (orchestrator, mut rx) = OrchestratorBuilder::new()
        .config(config(6, 3))
        .executor(Arc::new(MockExecutor::new()))
        .sampler(Arc::new(MockSampler::new()))
        .build()
        .expect("Failed to build orchestrator");

    let collector = tokio::spawn(async move {
        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
        }
        events
    });

    orchestrator.run().await.expect("Run failed");
    let events = collector.await.expect("Collector panicked");

    assert_eq!(events.len(), 6);
    let mut ids: Vec<usize> = events.iter().map(|e| e.id.0).collect();
    ids.sort_unstable();
    assert_eq!(ids, vec![0, 1, 2, 3, 4, 5]);
}

#[tokio::test]
async fn test_undrained_progress_channel_does_not_stall_run() {
    let executor = Arc::new(MockExecutor::new());
    let (orchestrator, _rx) = OrchestratorBuilder::new()
        .config(config(1100, 8))
        .executor(executor.clone())
        .sampler(Arc::new(MockSampler::new()))
        .build()
        .expect("Failed to build orchestrator");

    let report = tokio::time::timeout(Duration::from_secs(10), orchestrator.run())
        .await
        .expect("Run stalled behind an unread progress channel")
        .expect("Run failed");

    assert_eq!(report.result.outcomes.len(), 1100);
    assert_eq!(report.stats.successful_requests, 1100);
    assert_eq!(executor.calls(), 1100);
}

#[tokio::test]
async fn test_tiny_event_buffer_keeps_every_outcome() {
    let (orchestrator, mut rx) = OrchestratorBuilder::new()
        .config(config(20, 4))
        .channel_config(ChannelConfig::default().with_events_buffer(1))
        .executor(Arc::new(MockExecutor::new()))
        .sampler(Arc::new(MockSampler::new()))
        .build()
        .expect("Failed to build orchestrator");

    let report = orchestrator.run().await.expect("Run failed");

    assert_eq!(report.result.outcomes.len(), 20);
    assert!(rx.recv().await.is_some());
    assert!(rx.recv().await.is_none());
}

#[tokio::test]
async fn test_cancelled_run_reports_every_request() {
    let executor = Arc::new(MockExecutor::new());
    let (orchestrator, _rx) = OrchestratorBuilder::new()
        .config(config(5, 2))
        .executor(executor.clone())
        .sampler(Arc::new(MockSampler::new()))
        .build()
        .expect("Failed to build orchestrator");

    let handle = orchestrator.cancel_handle();
    handle.cancel();
    assert!(handle.is_cancelled());

    let report = orchestrator.run().await.expect("Run failed");

    assert_eq!(report.stats.total_requests, 5);
    assert_eq!(report.stats.successful_requests, 0);
    assert_eq!(report.stats.failures_of(ErrorKind::Cancelled), 5);
    assert_eq!(executor.calls(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_cancel_during_run() {
    let (orchestrator, _rx) = OrchestratorBuilder::new()
        .config(config(4, 2))
        .executor(Arc::new(
            MockExecutor::new().with_delay(Duration::from_secs(30)),
        ))
        .sampler(Arc::new(MockSampler::new()))
        .build()
        .expect("Failed to build orchestrator");

    let handle = orchestrator.cancel_handle();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        handle.cancel();
    });

    let start = Instant::now();
    let report = orchestrator.run().await.expect("Run failed");

    assert!(start.elapsed() < Duration::from_secs(5));
    assert_eq!(report.result.len(), 4);
    assert_eq!(report.stats.failures_of(ErrorKind::Cancelled), 4);
}
