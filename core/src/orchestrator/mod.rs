//! Orchestrator for the run lifecycle
//!
//! The Orchestrator turns a [`RunConfig`](crate::config::RunConfig) into a
//! finished [`RunReport`](crate::metrics::RunReport):
//! - Validating the configuration before any request is sent
//! - Materialising one request spec per index from the sampler
//! - Handing the specs to the concurrency controller
//! - Assembling the run result and its aggregate statistics
//!
//! # Example
//!
//! ```ignore
//! use vllm_bench_core::{OrchestratorBuilder, RunConfig};
//!
//! let (orchestrator, events_rx) = OrchestratorBuilder::new()
//!     .config(RunConfig::new("http://localhost:8000", "my-model"))
//!     .executor(executor)
//!     .sampler(sampler)
//!     .build()?;
//!
//! let report = orchestrator.run_with_signal_handling().await?;
//! ```

mod builder;
mod executor;

pub use builder::OrchestratorBuilder;
pub use executor::{CancelHandle, Orchestrator};

#[cfg(test)]
mod tests;
