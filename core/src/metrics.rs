//! Metrics aggregation and percentile calculation

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

use crate::error::ErrorKind;
use crate::outcome::RunResult;

/// Summary of a sample distribution
///
/// Latency distributions are in milliseconds, throughput distributions in
/// tokens per second.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Percentiles {
    /// Number of samples
    pub count: usize,
    /// Minimum value
    pub min: f64,
    /// 50th percentile (median)
    pub p50: f64,
    /// 90th percentile
    pub p90: f64,
    /// 95th percentile
    pub p95: f64,
    /// 99th percentile
    pub p99: f64,
    /// Maximum value
    pub max: f64,
    /// Mean value
    pub mean: f64,
    /// Sample standard deviation
    pub stddev: f64,
}

impl Percentiles {
    /// Summarise a set of values; `None` when there are none
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }

        let mut sorted: Vec<f64> = values.to_vec();
        sorted.sort_by(f64::total_cmp);

        let len = sorted.len();
        let mean = sorted.iter().sum::<f64>() / len as f64;

        let variance = if len > 1 {
            sorted.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (len - 1) as f64
        } else {
            0.0
        };

        Some(Self {
            count: len,
            min: sorted[0],
            p50: percentile(&sorted, 0.50),
            p90: percentile(&sorted, 0.90),
            p95: percentile(&sorted, 0.95),
            p99: percentile(&sorted, 0.99),
            max: sorted[len - 1],
            mean,
            stddev: variance.sqrt(),
        })
    }

    /// Median (alias for p50)
    pub fn median(&self) -> f64 {
        self.p50
    }
}

/// Calculate percentile from sorted values using linear interpolation
fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    if sorted.len() == 1 {
        return sorted[0];
    }

    let idx = p * (sorted.len() - 1) as f64;
    let lower = idx.floor() as usize;
    let upper = idx.ceil() as usize;
    let frac = idx - lower as f64;

    if upper >= sorted.len() {
        sorted[sorted.len() - 1]
    } else {
        sorted[lower] * (1.0 - frac) + sorted[upper] * frac
    }
}

fn millis(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

/// Summary statistics derived from a [`RunResult`]
///
/// Distributions cover successful outcomes only and are `None` when nothing
/// qualified (no successes, or no streaming TTFT samples).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateStats {
    /// Requests in the run
    pub total_requests: usize,
    /// Requests that succeeded
    pub successful_requests: usize,
    /// Requests that failed
    pub failed_requests: usize,
    /// Failure counts per kind; kinds with no failures are absent
    pub failures_by_kind: BTreeMap<ErrorKind, usize>,

    /// Completion tokens across successful requests
    pub total_completion_tokens: u64,
    /// Prompt tokens across successful requests that reported them
    pub total_prompt_tokens: u64,

    /// Run wall-clock duration
    pub wall_time: Duration,
    /// Completion tokens divided by run wall-clock time
    pub aggregate_tokens_per_second: f64,
    /// Successful requests divided by run wall-clock time
    pub requests_per_second: f64,

    /// Per-request tokens/second
    pub tokens_per_second: Option<Percentiles>,
    /// Time to first token in milliseconds (streaming successes)
    pub time_to_first_token: Option<Percentiles>,
    /// End-to-end request latency in milliseconds
    pub latency: Option<Percentiles>,
}

impl AggregateStats {
    /// Compute statistics from a finished run
    ///
    /// Pure and deterministic: the same input always yields bit-identical
    /// output.
    pub fn from_run(run: &RunResult) -> Self {
        let total_requests = run.outcomes.len();

        let mut failures_by_kind = BTreeMap::new();
        for failure in run.failures() {
            *failures_by_kind.entry(failure.kind).or_insert(0usize) += 1;
        }
        let failed_requests: usize = failures_by_kind.values().sum();
        let successful_requests = total_requests - failed_requests;

        let total_completion_tokens: u64 = run.successes().map(|m| m.total_tokens).sum();
        let total_prompt_tokens: u64 = run.successes().filter_map(|m| m.prompt_tokens).sum();

        let secs = run.wall_time.as_secs_f64();
        let (aggregate_tokens_per_second, requests_per_second) = if secs > 0.0 {
            (
                total_completion_tokens as f64 / secs,
                successful_requests as f64 / secs,
            )
        } else {
            (0.0, 0.0)
        };

        let tps_values: Vec<f64> = run.successes().map(|m| m.tokens_per_second).collect();
        let ttft_values: Vec<f64> = run
            .successes()
            .filter_map(|m| m.time_to_first_token)
            .map(millis)
            .collect();
        let latency_values: Vec<f64> = run.successes().map(|m| millis(m.wall_time)).collect();

        Self {
            total_requests,
            successful_requests,
            failed_requests,
            failures_by_kind,
            total_completion_tokens,
            total_prompt_tokens,
            wall_time: run.wall_time,
            aggregate_tokens_per_second,
            requests_per_second,
            tokens_per_second: Percentiles::from_values(&tps_values),
            time_to_first_token: Percentiles::from_values(&ttft_values),
            latency: Percentiles::from_values(&latency_values),
        }
    }

    /// Success rate (0.0 - 1.0)
    pub fn success_rate(&self) -> f64 {
        if self.total_requests > 0 {
            self.successful_requests as f64 / self.total_requests as f64
        } else {
            0.0
        }
    }

    /// Error rate (0.0 - 1.0)
    pub fn error_rate(&self) -> f64 {
        if self.total_requests > 0 {
            self.failed_requests as f64 / self.total_requests as f64
        } else {
            0.0
        }
    }

    /// Failures of one kind
    pub fn failures_of(&self, kind: ErrorKind) -> usize {
        self.failures_by_kind.get(&kind).copied().unwrap_or(0)
    }

    /// Mean per-request tokens/second, NaN when undefined
    pub fn mean_tokens_per_second(&self) -> f64 {
        self.tokens_per_second.map_or(f64::NAN, |p| p.mean)
    }

    /// Median per-request tokens/second, NaN when undefined
    pub fn median_tokens_per_second(&self) -> f64 {
        self.tokens_per_second.map_or(f64::NAN, |p| p.median())
    }

    /// Mean TTFT in milliseconds, NaN when undefined
    pub fn mean_ttft_ms(&self) -> f64 {
        self.time_to_first_token.map_or(f64::NAN, |p| p.mean)
    }

    /// Median TTFT in milliseconds, NaN when undefined
    pub fn median_ttft_ms(&self) -> f64 {
        self.time_to_first_token.map_or(f64::NAN, |p| p.median())
    }
}

/// A finished run paired with its statistics, handed to the reporting layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// Raw run output
    pub result: RunResult,
    /// Statistics computed from `result`
    pub stats: AggregateStats,
}

impl RunReport {
    /// Pair a run result with freshly computed statistics
    pub fn new(result: RunResult) -> Self {
        let stats = AggregateStats::from_run(&result);
        Self { result, stats }
    }
}
