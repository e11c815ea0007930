//! vllm-bench-core: Core data structures and run engine for benchmarking
//! OpenAI-compatible completion servers
//!
//! This crate provides the foundational types used across all vllm-bench
//! components, including:
//!
//! - Run configuration and request specs
//! - Core traits (RequestExecutor, Sampler)
//! - The concurrency controller and orchestrator
//! - Outcome aggregation and statistics
//! - Error handling

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod channel;
pub mod config;
pub mod controller;
pub mod error;
pub mod metrics;
pub mod orchestrator;
pub mod outcome;
pub mod request;
pub mod traits;

pub use channel::ChannelConfig;
pub use config::{ConfigError, PromptSize, RunConfig};
pub use controller::{CompletionEvent, ConcurrencyController, ControllerBuilder, InFlightGauge};
pub use error::{BenchError, BenchResult, ErrorKind};
pub use metrics::{AggregateStats, Percentiles, RunReport};
pub use orchestrator::{CancelHandle, Orchestrator, OrchestratorBuilder};
pub use outcome::{CompletionMetrics, RequestFailure, RequestOutcome, RunResult};
pub use request::{RequestId, RequestSpec};
pub use traits::{RequestExecutor, Sampler, SamplerError};
