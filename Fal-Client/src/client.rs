use reqwest::{Client, Response};
use serde_json::Value;
use std::time::{Duration, Instant};

use crate::credentials::FalCredentials;
use crate::error::{FalError, Result};
use crate::types::*;

/// Default fal.ai queue endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://queue.fal.run";

fn normalize(endpoint: String) -> String {
    endpoint.trim_end_matches('/').to_string()
}

/// Async client for the fal.ai queue API.
///
/// Requests are queued with [`submit`](Self::submit), tracked with
/// [`status`](Self::status) and collected with [`result`](Self::result).
/// [`subscribe`](Self::subscribe) runs all three and blocks until the
/// output is ready.
///
/// # Example
/// ```no_run
/// use fal_client::{FalClient, FalCredentials, FluxModel, FluxRequest};
/// use std::time::Duration;
///
/// # async fn example() -> fal_client::Result<()> {
/// let client = FalClient::new(FalCredentials::from_env()?);
/// let (args, _seed) = FluxRequest::new("platinum ring with sapphire").build();
/// let output = client
///     .subscribe(&FluxModel::Dev, &args, Duration::from_secs(300))
///     .await?;
/// println!("{}", output.images[0].url);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct FalClient {
    http: Client,
    endpoint: String,
    credentials: FalCredentials,
    poll_interval: Duration,
}

impl FalClient {
    /// Create a client for the public fal.ai queue.
    pub fn new(credentials: FalCredentials) -> Self {
        Self {
            http: Client::new(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            credentials,
            poll_interval: Duration::from_secs(1),
        }
    }

    /// Point the client at another queue endpoint (proxies, test servers).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = normalize(endpoint.into());
        self
    }

    /// Use a custom `reqwest::Client` (for connection pooling, timeouts, TLS).
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http = client;
        self
    }

    /// Interval between status checks in [`subscribe`](Self::subscribe).
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Returns the configured endpoint URL.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    // ── Queue ───────────────────────────────────────────────────────

    /// Queue a request for `model` with the given arguments.
    pub async fn submit(&self, model: impl AsRef<str>, args: &Value) -> Result<QueueReceipt> {
        let model = model.as_ref();
        let url = format!("{}/{}", self.endpoint, model.trim_matches('/'));

        let resp = self
            .http
            .post(&url)
            .header("Authorization", self.credentials.authorization())
            .timeout(Duration::from_secs(30))
            .json(args)
            .send()
            .await
            .map_err(|e| FalError::Network {
                context: format!("Cannot reach fal.ai at {}", self.endpoint),
                source: e,
            })?;

        let json = read_json(resp, "submit").await?;
        let receipt = parse_receipt(&json)?;
        tracing::debug!(model, request_id = %receipt.request_id, "queued fal.ai request");
        Ok(receipt)
    }

    /// Current queue state of a submitted request.
    pub async fn status(&self, receipt: &QueueReceipt) -> Result<RequestStatus> {
        let resp = self
            .http
            .get(&receipt.status_url)
            .header("Authorization", self.credentials.authorization())
            .timeout(Duration::from_secs(10))
            .send()
            .await
            .map_err(|e| FalError::Network {
                context: format!("Failed to fetch status of {}", receipt.request_id),
                source: e,
            })?;

        let json = read_json(resp, "status").await?;
        parse_status(&json)
    }

    /// Output of a completed request.
    pub async fn result(&self, receipt: &QueueReceipt) -> Result<GenerationOutput> {
        let resp = self
            .http
            .get(&receipt.response_url)
            .header("Authorization", self.credentials.authorization())
            .timeout(Duration::from_secs(30))
            .send()
            .await
            .map_err(|e| FalError::Network {
                context: format!("Failed to fetch result of {}", receipt.request_id),
                source: e,
            })?;

        let json = read_json(resp, "result").await?;
        parse_output(json)
    }

    // ── Completion waiting ──────────────────────────────────────────

    /// Submit, poll until completed, then fetch the output.
    ///
    /// Returns [`FalError::Timeout`] if the request is not completed within
    /// `timeout`. The queued request itself is left alone.
    pub async fn subscribe(
        &self,
        model: impl AsRef<str>,
        args: &Value,
        timeout: Duration,
    ) -> Result<GenerationOutput> {
        let receipt = self.submit(model, args).await?;
        let start = Instant::now();
        loop {
            match self.status(&receipt).await? {
                RequestStatus::Completed => break,
                RequestStatus::InQueue { position } => {
                    tracing::trace!(request_id = %receipt.request_id, ?position, "in queue");
                }
                RequestStatus::InProgress => {
                    tracing::trace!(request_id = %receipt.request_id, "in progress");
                }
            }
            if start.elapsed() > timeout {
                tracing::warn!(
                    request_id = %receipt.request_id,
                    timeout_secs = timeout.as_secs(),
                    "gave up waiting for fal.ai request"
                );
                return Err(FalError::Timeout(timeout.as_secs()));
            }
            tokio::time::sleep(self.poll_interval).await;
        }
        self.result(&receipt).await
    }

    // ── Image download ──────────────────────────────────────────────

    /// Download a generated image. Returns raw bytes.
    pub async fn image(&self, url: &str) -> Result<Vec<u8>> {
        let resp = self
            .http
            .get(url)
            .timeout(Duration::from_secs(60))
            .send()
            .await
            .map_err(|e| FalError::Network {
                context: format!("Failed to fetch image {}", url),
                source: e,
            })?;

        if !resp.status().is_success() {
            return Err(FalError::Http {
                status: resp.status().as_u16(),
                body: format!("Failed to fetch image {}", url),
            });
        }

        let bytes = resp.bytes().await.map_err(|e| FalError::Network {
            context: "Failed to read image bytes".into(),
            source: e,
        })?;
        Ok(bytes.to_vec())
    }
}

async fn read_json(resp: Response, what: &str) -> Result<Value> {
    if !resp.status().is_success() {
        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        return Err(FalError::Http { status, body });
    }
    resp.json().await.map_err(|e| FalError::Network {
        context: format!("Failed to parse fal.ai {} response", what),
        source: e,
    })
}

fn str_field(json: &Value, key: &str) -> Result<String> {
    json.get(key)
        .and_then(|v| v.as_str())
        .map(String::from)
        .ok_or_else(|| FalError::InvalidResponse(format!("Response missing {}", key)))
}

pub(crate) fn parse_receipt(json: &Value) -> Result<QueueReceipt> {
    Ok(QueueReceipt {
        request_id: str_field(json, "request_id")?,
        status_url: str_field(json, "status_url")?,
        response_url: str_field(json, "response_url")?,
    })
}

pub(crate) fn parse_status(json: &Value) -> Result<RequestStatus> {
    match json.get("status").and_then(|v| v.as_str()) {
        Some("IN_QUEUE") => Ok(RequestStatus::InQueue {
            position: json
                .get("queue_position")
                .and_then(|v| v.as_u64())
                .map(|p| p as u32),
        }),
        Some("IN_PROGRESS") => Ok(RequestStatus::InProgress),
        Some("COMPLETED") => match json.get("error").and_then(|v| v.as_str()) {
            Some(err) => Err(FalError::GenerationFailed(err.to_string())),
            None => Ok(RequestStatus::Completed),
        },
        Some(other) => Err(FalError::InvalidResponse(format!(
            "Unknown request status {}",
            other
        ))),
        None => Err(FalError::InvalidResponse("Response missing status".into())),
    }
}

pub(crate) fn parse_output(json: Value) -> Result<GenerationOutput> {
    if let Some(detail) = json.get("detail") {
        return Err(FalError::GenerationFailed(detail.to_string()));
    }
    Ok(serde_json::from_value(json)?)
}
