//! CLI argument parsing

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use vllm_bench_core::{PromptSize, RunConfig};
use vllm_bench_vendors::HttpConfig;

#[derive(Parser, Debug)]
#[command(name = "vllm-bench")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Server base URL
    #[arg(short, long, default_value = "http://localhost:8000")]
    pub base_url: String,

    /// Model identifier sent with every request
    #[arg(short, long, default_value = "default")]
    pub model: String,

    /// Bearer token for servers that require one
    #[arg(short = 'k', long, env = "VLLM_BENCH_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Maximum simultaneously active requests
    #[arg(short, long = "parallel", default_value_t = 4)]
    pub parallel: usize,

    /// Total number of requests
    #[arg(short = 'n', long = "requests", default_value_t = 8)]
    pub requests: usize,

    /// Maximum tokens to generate per request
    #[arg(long, default_value_t = 64)]
    pub max_tokens: u32,

    /// Prompt size class
    #[arg(long, value_enum, default_value_t = PromptSizeArg::Small)]
    pub prompt_size: PromptSizeArg,

    /// File with one prompt per line, used instead of the built-in pools
    #[arg(long)]
    pub prompt_file: Option<PathBuf>,

    /// Sampling temperature
    #[arg(long, default_value_t = 0.7)]
    pub temperature: f32,

    /// Request complete responses instead of streaming
    #[arg(long)]
    pub no_stream: bool,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 120)]
    pub timeout: u64,

    /// TCP connect timeout in seconds
    #[arg(long, default_value_t = 10)]
    pub connect_timeout: u64,

    /// Write the full report as JSON to this path
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Skip sampling system memory
    #[arg(long)]
    pub no_ram: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum PromptSizeArg {
    Small,
    Medium,
    Large,
}

impl From<PromptSizeArg> for PromptSize {
    fn from(arg: PromptSizeArg) -> Self {
        match arg {
            PromptSizeArg::Small => PromptSize::Small,
            PromptSizeArg::Medium => PromptSize::Medium,
            PromptSizeArg::Large => PromptSize::Large,
        }
    }
}

impl Cli {
    /// HTTP client settings sized for the run
    pub fn http_config(&self, config: &RunConfig) -> HttpConfig {
        HttpConfig::default()
            .with_connect_timeout(Duration::from_secs(self.connect_timeout))
            .with_pool_max_idle(config.effective_parallelism())
    }

    /// Run configuration described by the arguments
    pub fn run_config(&self) -> RunConfig {
        RunConfig::new(&self.base_url, &self.model)
            .with_num_requests(self.requests)
            .with_parallelism(self.parallel)
            .with_max_tokens(self.max_tokens)
            .with_prompt_size(self.prompt_size.into())
            .with_temperature(Some(self.temperature))
            .with_stream(!self.no_stream)
            .with_request_timeout(Duration::from_secs(self.timeout))
    }
}
