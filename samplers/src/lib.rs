//! Prompt sources for vllm-bench
//!
//! This crate provides implementations of the `Sampler` trait:
//!
//! - [`BuiltinPromptSampler`]: built-in small/medium/large prompt pools
//! - [`PromptListSampler`]: prompts loaded from a file, one per line
//! - [`FixedPromptSampler`]: the same prompt for every request

#![warn(missing_docs)]
#![warn(clippy::all)]

mod builtin;
mod list;
mod prompts;

pub use builtin::BuiltinPromptSampler;
pub use list::{FixedPromptSampler, PromptListSampler};
