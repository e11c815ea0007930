//! Concurrency controller for executing a batch of requests
//!
//! The controller runs N request specs to completion with at most P of them
//! active at once. It is the only place in the crate that coordinates
//! concurrent work:
//!
//! 1. Wait for a free slot on the admission gate (a counting semaphore)
//! 2. Admit the next not-yet-started spec and spawn it as a tokio task
//! 3. The task runs the executor, releases its slot, publishes a completion event
//! 4. Outcomes are written back at the spec's original index
//!
//! A failed or timed-out request only affects its own outcome. Cancellation
//! turns in-flight and not-yet-admitted requests into `cancelled` outcomes, so
//! the returned collection always has one entry per spec.
//!
//! # Example
//!
//! ```ignore
//! use vllm_bench_core::controller::ControllerBuilder;
//!
//! let controller = ControllerBuilder::new()
//!     .executor(executor)
//!     .events_tx(tx)
//!     .build()?;
//!
//! let outcomes = controller.run(specs, 4).await?;
//! assert_eq!(outcomes.len(), specs_len);
//! ```

mod builder;
mod executor;
mod stats;

pub use builder::ControllerBuilder;
pub use executor::{CompletionEvent, ConcurrencyController};
pub use stats::{InFlightGauge, InFlightGuard};
