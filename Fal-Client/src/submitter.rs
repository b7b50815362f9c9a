use std::time::Duration;

use anyhow::Context;
use prompt_batch::{PromptTask, Submitter};

use crate::client::FalClient;
use crate::request::{FluxModel, FluxRequest};
use crate::types::GeneratedImage;

/// Default time allowed for one queued generation.
pub const DEFAULT_GENERATION_TIMEOUT: Duration = Duration::from_secs(300);

/// Generates one image per [`PromptTask`] through the fal.ai queue.
///
/// Every task is rendered with the settings of `template`; only the prompt
/// is replaced. Plug it straight into [`prompt_batch::run`] or
/// [`prompt_batch::BatchRunner`].
#[derive(Debug, Clone)]
pub struct FalSubmitter {
    client: FalClient,
    model: FluxModel,
    template: FluxRequest,
    timeout: Duration,
}

impl FalSubmitter {
    pub fn new(client: FalClient, model: FluxModel) -> Self {
        Self {
            client,
            model,
            template: FluxRequest::new(""),
            timeout: DEFAULT_GENERATION_TIMEOUT,
        }
    }

    /// Generation settings shared by every task.
    pub fn with_template(mut self, template: FluxRequest) -> Self {
        self.template = template;
        self
    }

    /// How long [`FalClient::subscribe`] may wait per task.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn model(&self) -> &FluxModel {
        &self.model
    }

    pub fn template(&self) -> &FluxRequest {
        &self.template
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Arguments sent for `task`, with the seed they resolve to.
    pub fn arguments(&self, task: &PromptTask) -> (serde_json::Value, i64) {
        self.template.clone().prompt(task.prompt.clone()).build()
    }
}

impl Submitter<GeneratedImage> for FalSubmitter {
    async fn submit(&self, task: &PromptTask) -> anyhow::Result<GeneratedImage> {
        let (args, seed) = self.arguments(task);
        tracing::debug!(index = task.metadata.index, seed, model = %self.model, "submitting to fal.ai");

        let output = self
            .client
            .subscribe(&self.model, &args, self.timeout)
            .await
            .with_context(|| format!("{} request for task {}", self.model, task.metadata.index))?;

        output
            .images
            .into_iter()
            .next()
            .ok_or_else(|| anyhow::anyhow!("{} returned no images", self.model))
    }
}
