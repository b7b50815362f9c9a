use std::collections::{BTreeMap, BTreeSet};

use chrono::Utc;
use futures::StreamExt;
use serde::{Deserialize, Serialize};

use crate::runner::BatchStream;
use crate::types::{Axis, JobResult, TaskMetadata};

/// A task that ended in `Failure`, kept for reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailedTask {
    pub index: usize,
    pub error: String,
}

/// Caller-side fold over a batch's results.
///
/// The runner itself has no aggregate status; build one of these from the
/// collected results (or with [`gather`]) when you need counts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSummary {
    pub batch_id: Option<String>,
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub total_duration_ms: u64,
    pub avg_duration_ms: u64,
    /// Successful results per axis value.
    pub breakdown: BTreeMap<Axis, BTreeMap<String, usize>>,
    /// Failures ordered by task index.
    pub failures: Vec<FailedTask>,
    /// ISO 8601 timestamp when collection started.
    pub started_at: Option<String>,
    /// ISO 8601 timestamp when the last result arrived.
    pub completed_at: Option<String>,
}

impl BatchSummary {
    pub fn from_results<P>(results: &[JobResult<P>]) -> Self {
        let mut summary = BatchSummary {
            total: results.len(),
            ..Default::default()
        };

        for result in results {
            summary.total_duration_ms += result.duration_ms();
            match result {
                JobResult::Success { metadata, .. } => {
                    summary.succeeded += 1;
                    for axis in Axis::ALL {
                        *summary
                            .breakdown
                            .entry(axis)
                            .or_default()
                            .entry(metadata.value(axis).to_string())
                            .or_insert(0) += 1;
                    }
                }
                JobResult::Failure {
                    error, metadata, ..
                } => {
                    summary.failed += 1;
                    summary.failures.push(FailedTask {
                        index: metadata.index,
                        error: error.clone(),
                    });
                }
            }
        }

        summary.failures.sort_by_key(|f| f.index);
        if summary.total > 0 {
            summary.avg_duration_ms = summary.total_duration_ms / summary.total as u64;
        }
        summary
    }

    /// True when at least one task succeeded and none failed.
    pub fn all_succeeded(&self) -> bool {
        self.total > 0 && self.failed == 0
    }

    /// Successful results whose `axis` took `value`.
    pub fn count(&self, axis: Axis, value: &str) -> usize {
        self.breakdown
            .get(&axis)
            .and_then(|counts| counts.get(value))
            .copied()
            .unwrap_or(0)
    }

    /// Number of distinct values of `axis` among successful results.
    pub fn distinct(&self, axis: Axis) -> usize {
        self.breakdown.get(&axis).map(|c| c.len()).unwrap_or(0)
    }

    /// `(value, count)` pairs for `axis`, most frequent first, ties by name.
    pub fn ranked(&self, axis: Axis) -> Vec<(String, usize)> {
        let mut ranked: Vec<(String, usize)> = self
            .breakdown
            .get(&axis)
            .map(|counts| counts.iter().map(|(v, n)| (v.clone(), *n)).collect())
            .unwrap_or_default();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked
    }
}

/// Drain a batch stream, returning the results in arrival order and a
/// summary stamped with the batch ID and collection timestamps.
pub async fn gather<P>(mut stream: BatchStream<P>) -> (Vec<JobResult<P>>, BatchSummary) {
    let started_at = Utc::now().to_rfc3339();
    let batch_id = stream.batch_id().to_string();

    let mut results = Vec::with_capacity(stream.total());
    while let Some(result) = stream.next().await {
        results.push(result);
    }

    let mut summary = BatchSummary::from_results(&results);
    summary.batch_id = Some(batch_id);
    summary.started_at = Some(started_at);
    summary.completed_at = Some(Utc::now().to_rfc3339());
    (results, summary)
}

/// Narrows a result list to the entries whose metadata matches every
/// constrained axis. An axis with no allowed values is unconstrained.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultFilter {
    allowed: BTreeMap<Axis, BTreeSet<String>>,
}

impl ResultFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Only keep results whose `axis` value is one of `values`.
    pub fn allow<I, S>(mut self, axis: Axis, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed
            .entry(axis)
            .or_default()
            .extend(values.into_iter().map(Into::into));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.allowed.values().all(|v| v.is_empty())
    }

    pub fn matches(&self, metadata: &TaskMetadata) -> bool {
        self.allowed
            .iter()
            .all(|(axis, values)| values.is_empty() || values.contains(metadata.value(*axis)))
    }

    pub fn apply<'a, P>(
        &'a self,
        results: &'a [JobResult<P>],
    ) -> impl Iterator<Item = &'a JobResult<P>> + 'a {
        results.iter().filter(move |r| self.matches(r.metadata()))
    }
}
