//! Per-request outcomes and the assembled run result

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::RunConfig;
use crate::error::ErrorKind;

/// Metrics of a request that completed successfully
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionMetrics {
    /// Generated (completion) tokens
    pub total_tokens: u64,

    /// Prompt tokens, when the server reported them
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_tokens: Option<u64>,

    /// Elapsed time from send to full receipt
    pub wall_time: Duration,

    /// Elapsed time from send to the first content-bearing chunk (streaming only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_to_first_token: Option<Duration>,

    /// `total_tokens / wall_time`, or 0 when either is zero
    pub tokens_per_second: f64,
}

impl CompletionMetrics {
    /// Build metrics, deriving tokens/second
    ///
    /// A TTFT later than the wall time is clamped to the wall time.
    pub fn new(
        total_tokens: u64,
        prompt_tokens: Option<u64>,
        wall_time: Duration,
        time_to_first_token: Option<Duration>,
    ) -> Self {
        let secs = wall_time.as_secs_f64();
        let tokens_per_second = if total_tokens == 0 || secs <= 0.0 {
            0.0
        } else {
            total_tokens as f64 / secs
        };

        Self {
            total_tokens,
            prompt_tokens,
            wall_time,
            time_to_first_token: time_to_first_token.map(|t| t.min(wall_time)),
            tokens_per_second,
        }
    }
}

/// Cause of a failed request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestFailure {
    /// Failure classification
    pub kind: ErrorKind,

    /// Human-readable detail
    pub message: String,

    /// Time from send until the failure was observed
    pub elapsed: Duration,
}

/// Terminal result of executing one request spec
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RequestOutcome {
    /// Request completed
    Success(CompletionMetrics),
    /// Request failed
    Failure(RequestFailure),
}

impl RequestOutcome {
    /// Shorthand for a successful outcome
    pub fn success(
        total_tokens: u64,
        prompt_tokens: Option<u64>,
        wall_time: Duration,
        time_to_first_token: Option<Duration>,
    ) -> Self {
        RequestOutcome::Success(CompletionMetrics::new(
            total_tokens,
            prompt_tokens,
            wall_time,
            time_to_first_token,
        ))
    }

    /// Shorthand for a failed outcome
    pub fn failure(kind: ErrorKind, message: impl Into<String>, elapsed: Duration) -> Self {
        RequestOutcome::Failure(RequestFailure {
            kind,
            message: message.into(),
            elapsed,
        })
    }

    /// Check if the request succeeded
    pub fn is_success(&self) -> bool {
        matches!(self, RequestOutcome::Success(_))
    }

    /// Success metrics, if any
    pub fn metrics(&self) -> Option<&CompletionMetrics> {
        match self {
            RequestOutcome::Success(m) => Some(m),
            RequestOutcome::Failure(_) => None,
        }
    }

    /// Failure details, if any
    pub fn failure_info(&self) -> Option<&RequestFailure> {
        match self {
            RequestOutcome::Success(_) => None,
            RequestOutcome::Failure(f) => Some(f),
        }
    }

    /// Failure kind, if any
    pub fn error_kind(&self) -> Option<ErrorKind> {
        self.failure_info().map(|f| f.kind)
    }

    /// Time spent on the request regardless of result
    pub fn elapsed(&self) -> Duration {
        match self {
            RequestOutcome::Success(m) => m.wall_time,
            RequestOutcome::Failure(f) => f.elapsed,
        }
    }
}

/// Full output of one run
///
/// Assembled once every outcome is in and immutable afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResult {
    /// One outcome per request, indexed like the specs that produced them
    pub outcomes: Vec<RequestOutcome>,

    /// Wall-clock duration of the whole run
    pub wall_time: Duration,

    /// When the run started
    pub started_at: chrono::DateTime<chrono::Utc>,

    /// Highest number of requests that were executing at the same time
    #[serde(default)]
    pub peak_in_flight: usize,

    /// Configuration the run used
    pub config: RunConfig,
}

impl RunResult {
    /// Number of outcomes
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    /// Check if the run recorded no outcomes
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Successful outcomes' metrics, in request order
    pub fn successes(&self) -> impl Iterator<Item = &CompletionMetrics> {
        self.outcomes.iter().filter_map(RequestOutcome::metrics)
    }

    /// Failed outcomes, in request order
    pub fn failures(&self) -> impl Iterator<Item = &RequestFailure> {
        self.outcomes.iter().filter_map(RequestOutcome::failure_info)
    }
}
