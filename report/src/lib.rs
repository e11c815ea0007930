//! Report rendering for vllm-bench runs
//!
//! This crate turns a finished [`RunReport`](vllm_bench_core::RunReport) into
//! output for people and tools:
//!
//! - [`Banner`], [`ProgressLine`] and [`Summary`]: plain-text views
//! - [`JsonExporter`]: the full report as pretty JSON
//! - [`MemorySummary`]: RAM figures sampled while the run was in flight

#![warn(missing_docs)]
#![warn(clippy::all)]

mod json_export;
mod memory;
mod text;

pub use json_export::JsonExporter;
pub use memory::MemorySummary;
pub use text::{Banner, ProgressLine, Summary};
