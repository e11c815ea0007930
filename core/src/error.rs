//! Error types for vllm-bench-core
//!
//! Two layers live here. [`ErrorKind`] classifies why a single request failed and
//! travels inside a failed [`RequestOutcome`](crate::RequestOutcome); it never
//! aborts a run. [`BenchError`] is reserved for conditions that stop a run before
//! the first request is sent.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::ConfigError;
use crate::traits::SamplerError;

/// Why a single request failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Connection could not be established or dropped mid-response
    ConnectionError,
    /// Per-request timeout elapsed before completion
    Timeout,
    /// Server answered with a non-success status
    HttpError,
    /// Body or stream could not be parsed into the expected shape
    MalformedResponse,
    /// Execution was cancelled before completion
    Cancelled,
}

impl ErrorKind {
    /// Every kind, in reporting order
    pub const ALL: [ErrorKind; 5] = [
        ErrorKind::ConnectionError,
        ErrorKind::Timeout,
        ErrorKind::HttpError,
        ErrorKind::MalformedResponse,
        ErrorKind::Cancelled,
    ];

    /// Stable snake_case identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::ConnectionError => "connection_error",
            ErrorKind::Timeout => "timeout",
            ErrorKind::HttpError => "http_error",
            ErrorKind::MalformedResponse => "malformed_response",
            ErrorKind::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fatal error that prevents a run from starting
#[derive(Error, Debug)]
pub enum BenchError {
    /// Configuration was rejected by validation
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A builder was finalised without a required component
    #[error("missing required component: {0}")]
    MissingComponent(&'static str),

    /// The prompt source could not produce a prompt
    #[error("sampler error: {0}")]
    Sampler(#[from] SamplerError),
}

impl BenchError {
    /// Shorthand for a missing builder component
    pub fn missing(component: &'static str) -> Self {
        BenchError::MissingComponent(component)
    }
}

/// Result type alias
pub type BenchResult<T> = std::result::Result<T, BenchError>;
