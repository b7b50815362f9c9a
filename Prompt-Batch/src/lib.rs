//! # Prompt Batch
//!
//! Prompt variation expander and bounded-parallel batch runner for image
//! generation jobs.
//!
//! ## Key Features
//!
//! - **Deterministic expansion**: one base description becomes N prompts by
//!   cycling round-robin through material, gemstone, style, angle,
//!   background and lighting options
//! - **Bounded fan-out**: at most `max_workers` generation calls in flight
//! - **Completion-order streaming**: results arrive as soon as each call
//!   finishes, never blocked behind a slower earlier task
//! - **Failure isolation**: an error or panic in one call becomes a
//!   `Failure` result for that task and nothing else
//! - **Explicit wrappers**: retries and per-call deadlines wrap the
//!   [`Submitter`], they are not hidden inside the runner
//!
//! ## Quick Start
//!
//! 1. Expand a base prompt with [`expand`]
//! 2. Implement [`Submitter`] for your API client (or use [`submit_fn`])
//! 3. Call [`run`] and consume the returned [`BatchStream`]
//!
//! ```no_run
//! use futures::StreamExt;
//! use prompt_batch::{expand, run, submit_fn, PromptTask, VariationAxes};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let tasks = expand("elegant solitaire ring", 20, &VariationAxes::default())?;
//!
//! let submitter = submit_fn(|task: PromptTask| async move {
//!     // call the image API here
//!     Ok(format!("https://cdn.example/{}.png", task.metadata.index))
//! });
//!
//! let mut results = run(tasks, submitter, 5)?;
//! while let Some(result) = results.next().await {
//!     println!("#{} success={}", result.metadata().index, result.is_success());
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod prompt;
pub mod runner;
pub mod submit;
pub mod summary;
pub mod templates;
pub mod types;

pub use config::{BatchConfig, BatchConfigBuilder};
pub use error::{BatchError, Result};
pub use prompt::{expand, QUALITY_SUFFIX};
pub use runner::{run, BatchRunner, BatchStream};
pub use submit::{
    blocking_fn, submit_fn, BlockingSubmitter, Deadline, FnSubmitter, Retry, RetryPolicy,
    Submitter,
};
pub use summary::{gather, BatchSummary, FailedTask, ResultFilter};
pub use types::{Axis, JobResult, PromptTask, TaskMetadata, VariationAxes};
