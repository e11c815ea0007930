//! Core traits for request executors and prompt samplers
//!
//! These traits are defined in core so the controller and orchestrator stay
//! free of any HTTP stack. Implementations live in their respective crates
//! (vendors/, samplers/).

use async_trait::async_trait;

use crate::config::PromptSize;
use crate::outcome::RequestOutcome;
use crate::request::RequestSpec;

// ============================================================================
// Request Executor Trait
// ============================================================================

/// Performs exactly one completion call per invocation
///
/// `execute` is infallible by contract: every failure mode (connection,
/// timeout, status, parse) is reported as a failed [`RequestOutcome`], so the
/// controller never has to reason about errors escaping a request.
#[async_trait]
pub trait RequestExecutor: Send + Sync {
    /// Executor identifier (e.g. "openai")
    fn name(&self) -> &str;

    /// Execute one request and report how it went
    async fn execute(&self, spec: &RequestSpec) -> RequestOutcome;
}

// ============================================================================
// Sampler Trait
// ============================================================================

/// Produces prompt text for a size class
///
/// The orchestrator calls `sample` once per request index; the returned string
/// is treated as opaque.
pub trait Sampler: Send + Sync {
    /// Sampler name for identification
    fn name(&self) -> &str;

    /// Produce one prompt of the given size class
    fn sample(&self, size: PromptSize) -> Result<String, SamplerError>;
}

/// Sampler-specific errors
#[derive(Debug, thiserror::Error)]
pub enum SamplerError {
    /// No more prompts available
    #[error("prompt source exhausted")]
    Exhausted,

    /// Invalid sampler configuration
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// IO error (e.g. reading a prompt file)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
