use serde::{Deserialize, Serialize};

/// Handle returned when a request is accepted onto the fal.ai queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueReceipt {
    pub request_id: String,
    pub status_url: String,
    pub response_url: String,
}

/// Queue state of a submitted request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestStatus {
    /// Waiting for a runner. `position` is the place in line when reported.
    InQueue { position: Option<u32> },
    InProgress,
    Completed,
}

/// One generated image as hosted by fal.ai.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedImage {
    pub url: String,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub content_type: Option<String>,
}

/// Result payload of a completed Flux request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationOutput {
    #[serde(default)]
    pub images: Vec<GeneratedImage>,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub has_nsfw_concepts: Vec<bool>,
    #[serde(default)]
    pub prompt: Option<String>,
}
