//! # fal-client
//!
//! Async Rust client for the [fal.ai](https://fal.ai) queue API, focused on
//! Flux text-to-image models.
//!
//! Provides a typed client for queue submission, status polling and result
//! retrieval, a request builder for Flux arguments, and [`FalSubmitter`],
//! which plugs fal.ai into the `prompt-batch` runner for bulk generation.
//!
//! ## Quick Start
//!
//! ```no_run
//! use fal_client::{FalClient, FalCredentials, FalSubmitter, FluxModel, FluxRequest};
//! use futures::StreamExt;
//! use prompt_batch::{expand, run, VariationAxes};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let client = FalClient::new(FalCredentials::from_env()?);
//! let submitter = FalSubmitter::new(client.clone(), FluxModel::Dev)
//!     .with_template(FluxRequest::new("").steps(28).guidance_scale(3.5));
//!
//! let tasks = expand("vintage cocktail ring", 10, &VariationAxes::default())?;
//! let mut results = run(tasks, submitter, 5)?;
//!
//! while let Some(result) = results.next().await {
//!     if let Some(image) = result.payload() {
//!         let bytes = client.image(&image.url).await?;
//!         std::fs::write(format!("ring_{:03}.png", result.metadata().index), &bytes)?;
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod credentials;
pub mod error;
pub mod request;
pub mod submitter;
pub mod types;

pub use client::{FalClient, DEFAULT_ENDPOINT};
pub use credentials::{FalCredentials, FAL_KEY_ENV};
pub use error::{FalError, Result};
pub use request::{FluxModel, FluxRequest, ImageSize};
pub use submitter::{FalSubmitter, DEFAULT_GENERATION_TIMEOUT};
pub use types::{GeneratedImage, GenerationOutput, QueueReceipt, RequestStatus};
