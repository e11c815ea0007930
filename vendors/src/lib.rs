//! Request executor for OpenAI-compatible completion servers
//!
//! This crate provides the HTTP side of vllm-bench:
//!
//! - [`OpenAIExecutor`]: the `RequestExecutor` implementation for
//!   `/v1/chat/completions`, streaming and non-streaming
//! - [`HttpClientPool`]: the shared, connection-pooling reqwest client
//! - [`SSEParser`] and [`StreamAccumulator`]: server-sent event framing and
//!   per-request stream bookkeeping
//! - [`VendorError`]: per-request failure causes, each mapped to one
//!   [`ErrorKind`](vllm_bench_core::ErrorKind)

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod client;
pub mod error;
pub mod openai;
pub mod streaming;
mod wire;

pub use client::{HttpClientPool, HttpConfig};
pub use error::VendorError;
pub use openai::OpenAIExecutor;
pub use streaming::{SSEEvent, SSEParser, StreamAccumulator};
