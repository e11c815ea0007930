//! Plain-text views of a run

use std::fmt;
use std::time::Duration;

use vllm_bench_core::{CompletionEvent, ErrorKind, RequestOutcome, RunConfig, RunReport};

use crate::memory::MemorySummary;

const RULE_WIDTH: usize = 60;

fn millis(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

// ============================================================================
// Banner
// ============================================================================

/// Run header printed before the first request is sent
#[derive(Debug, Clone, Copy)]
pub struct Banner<'a> {
    config: &'a RunConfig,
    endpoint: &'a str,
}

impl<'a> Banner<'a> {
    /// Banner for a run against `endpoint`
    pub fn new(config: &'a RunConfig, endpoint: &'a str) -> Self {
        Self { config, endpoint }
    }
}

impl fmt::Display for Banner<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "=".repeat(RULE_WIDTH);
        let c = self.config;

        writeln!(f, "{rule}")?;
        writeln!(
            f,
            " vllm-bench: {} requests, {} parallel",
            c.num_requests, c.parallelism
        )?;
        writeln!(f, " Server : {}", self.endpoint)?;
        writeln!(f, " Model  : {}", c.model)?;
        writeln!(
            f,
            " Max tok: {}  |  Prompt size: {}",
            c.max_tokens, c.prompt_size
        )?;
        writeln!(f, " Stream : {}", c.stream)?;
        write!(f, "{rule}")
    }
}

// ============================================================================
// Progress line
// ============================================================================

/// One line per finished request, in completion order
#[derive(Debug, Clone, Copy)]
pub struct ProgressLine<'a> {
    event: &'a CompletionEvent,
}

impl<'a> ProgressLine<'a> {
    /// Line for one completion event
    pub fn new(event: &'a CompletionEvent) -> Self {
        Self { event }
    }
}

impl fmt::Display for ProgressLine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let event = self.event;
        let width = event.total.to_string().len();
        write!(f, "[{:>width$}/{}] ", event.completed, event.total)?;

        match &event.outcome {
            RequestOutcome::Success(m) => {
                let tps = if m.tokens_per_second > 0.0 {
                    format!("{:6.1} t/s", m.tokens_per_second)
                } else {
                    format!("{:>10}", "n/a")
                };
                let ttft = match m.time_to_first_token {
                    Some(t) => format!("{:6.0}ms", millis(t)),
                    None => format!("{:>8}", "n/a"),
                };
                write!(
                    f,
                    "OK   {tps}  TTFT {ttft}  ({:>4} tok in {:.2}s)",
                    m.total_tokens,
                    m.wall_time.as_secs_f64()
                )
            }
            RequestOutcome::Failure(e) => write!(
                f,
                "ERR  {:>10}  TTFT {:>8}  ({:>4} tok in {:.2}s)  | {}: {}",
                "n/a",
                "n/a",
                0,
                e.elapsed.as_secs_f64(),
                e.kind,
                e.message
            ),
        }
    }
}

// ============================================================================
// Summary
// ============================================================================

/// End-of-run results block
///
/// Undefined statistics (no successes, no streaming TTFT) are left out rather
/// than printed as NaN.
#[derive(Debug, Clone, Copy)]
pub struct Summary<'a> {
    report: &'a RunReport,
    memory: Option<&'a MemorySummary>,
}

impl<'a> Summary<'a> {
    /// Summary of a finished run
    pub fn new(report: &'a RunReport) -> Self {
        Self {
            report,
            memory: None,
        }
    }

    /// Include a RAM block
    pub fn with_memory(mut self, memory: Option<&'a MemorySummary>) -> Self {
        self.memory = memory;
        self
    }
}

impl fmt::Display for Summary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "=".repeat(RULE_WIDTH);
        let stats = &self.report.stats;

        writeln!(f, "{rule}")?;
        writeln!(f, " RESULTS")?;
        writeln!(f, "{rule}")?;
        writeln!(
            f,
            "  Wall time         : {:.2}s",
            stats.wall_time.as_secs_f64()
        )?;
        writeln!(
            f,
            "  Requests          : {} ok / {} errors ({:.1}% success, {:.1}% errors)",
            stats.successful_requests,
            stats.failed_requests,
            stats.success_rate() * 100.0,
            stats.error_rate() * 100.0
        )?;

        if stats.failed_requests > 0 {
            let breakdown: Vec<String> = ErrorKind::ALL
                .iter()
                .filter_map(|kind| {
                    let n = stats.failures_of(*kind);
                    (n > 0).then(|| format!("{kind} {n}"))
                })
                .collect();
            writeln!(f, "  Failures          : {}", breakdown.join(", "))?;
        }

        if stats.successful_requests == 0 {
            writeln!(f, "  All requests failed.")?;
        } else {
            writeln!(f, "  Prompt tokens     : {}", stats.total_prompt_tokens)?;
            writeln!(f, "  Completion tokens : {}", stats.total_completion_tokens)?;
            writeln!(f, "  ---")?;
            writeln!(
                f,
                "  Aggregate tok/s   : {:.1}  (total tokens / wall time)",
                stats.aggregate_tokens_per_second
            )?;
            writeln!(
                f,
                "  Requests/s        : {:.2}",
                stats.requests_per_second
            )?;

            if let Some(tps) = &stats.tokens_per_second {
                writeln!(f, "  Avg tok/s per req : {:.1}", tps.mean)?;
                writeln!(f, "  Median tok/s      : {:.1}", tps.median())?;
                writeln!(f, "  Fastest           : {:.1} t/s", tps.max)?;
                writeln!(f, "  Slowest           : {:.1} t/s", tps.min)?;
            }

            if let Some(ttft) = &stats.time_to_first_token {
                writeln!(f, "  Avg TTFT          : {:.0}ms", ttft.mean)?;
                writeln!(f, "  Median TTFT       : {:.0}ms", ttft.median())?;
            }

            if let Some(latency) = &stats.latency {
                writeln!(
                    f,
                    "  Latency p50/p90/p99 : {:.0} / {:.0} / {:.0} ms",
                    latency.p50, latency.p90, latency.p99
                )?;
            }
        }

        if let Some(mem) = self.memory {
            writeln!(f, "  ---")?;
            writeln!(f, "  RAM total         : {:.1} GB", mem.total_gb)?;
            writeln!(f, "  RAM start         : {:.1} GB", mem.start_gb)?;
            writeln!(f, "  RAM peak          : {:.1} GB", mem.peak_gb)?;
            writeln!(f, "  RAM end           : {:.1} GB", mem.end_gb)?;
            writeln!(f, "  RAM avg           : {:.1} GB", mem.avg_gb)?;
        }

        write!(f, "{rule}")
    }
}
