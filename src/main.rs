//! vllm-bench - Load generator and throughput meter for OpenAI-compatible servers

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;
use vllm_bench_core::{CompletionEvent, OrchestratorBuilder, Sampler};
use vllm_bench_report::{Banner, JsonExporter, ProgressLine, Summary};
use vllm_bench_samplers::{BuiltinPromptSampler, PromptListSampler};
use vllm_bench_vendors::{HttpClientPool, OpenAIExecutor};

mod cli;
mod monitor;

use cli::Cli;
use monitor::RamMonitor;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Logs go to stderr; the report owns stdout
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    run(cli).await
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let config = cli.run_config();
    config.validate().context("invalid arguments")?;

    let http = cli.http_config(&config);
    let pool = HttpClientPool::new(&http).context("failed to build HTTP client")?;
    let executor = Arc::new(OpenAIExecutor::new(pool, cli.api_key.clone()));

    let sampler: Arc<dyn Sampler> = match &cli.prompt_file {
        Some(path) => Arc::new(
            PromptListSampler::from_file(path)
                .with_context(|| format!("failed to load prompts from {}", path.display()))?,
        ),
        None => Arc::new(BuiltinPromptSampler::new()),
    };

    let (orchestrator, events) = OrchestratorBuilder::new()
        .config(config.clone())
        .executor(executor)
        .sampler(sampler)
        .build()?;

    println!(
        "{}",
        Banner::new(&config, &OpenAIExecutor::endpoint(&config.base_url))
    );

    let bar = ProgressBar::new(config.num_requests as u64);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} {msg}")
    {
        bar.set_style(style.progress_chars("#>-"));
    }
    let progress = tokio::spawn(render_progress(events, bar));

    let monitor = (!cli.no_ram).then(RamMonitor::start);
    let result = orchestrator.run_with_signal_handling().await;
    let memory = match monitor {
        Some(monitor) => monitor.stop().await,
        None => None,
    };

    // The event channel closes once the run is over
    if let Err(e) = progress.await {
        tracing::warn!(error = %e, "Progress task failed");
    }

    let report = result.context("run could not start")?;

    println!();
    println!("{}", Summary::new(&report).with_memory(memory.as_ref()));

    if let Some(path) = &cli.output {
        JsonExporter::export(&report, memory.as_ref(), path)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        println!("Report written to {}", path.display());
    }

    if report.stats.successful_requests == 0 {
        return Ok(ExitCode::FAILURE);
    }

    Ok(ExitCode::SUCCESS)
}

/// Print one line per finished request above the progress bar
async fn render_progress(mut events: mpsc::Receiver<CompletionEvent>, bar: ProgressBar) {
    while let Some(event) = events.recv().await {
        let line = ProgressLine::new(&event).to_string();
        bar.suspend(|| println!("{line}"));
        bar.inc(1);
        if let Some(kind) = event.outcome.error_kind() {
            bar.set_message(format!("last error: {kind}"));
        }
    }
    bar.finish_and_clear();
}
