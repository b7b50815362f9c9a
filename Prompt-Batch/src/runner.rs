use std::any::Any;
use std::collections::VecDeque;
use std::panic::AssertUnwindSafe;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use std::time::Instant;

use futures::{FutureExt, Stream};
use tokio::sync::{mpsc, Semaphore};
use tracing::{debug, debug_span, info, Instrument};
use uuid::Uuid;

use crate::config::BatchConfig;
use crate::error::{BatchError, Result};
use crate::submit::{Deadline, Retry, RetryPolicy, Submitter};
use crate::types::{JobResult, PromptTask};

type TaskQueue = Arc<Mutex<VecDeque<PromptTask>>>;

tokio::task_local! {
    /// One-permit slot of the worker running the current task. Work that
    /// outlives its future (a `blocking_fn` call after a deadline) holds the
    /// permit until it returns, and the worker waits for it before taking
    /// the next task.
    pub(crate) static WORKER_SLOT: Arc<Semaphore>;
}

/// Run every task through `submitter` with at most `max_workers` calls in
/// flight, yielding results in completion order.
///
/// Spawns `min(max_workers, tasks.len())` Tokio workers. Each one pulls the
/// next unclaimed task, awaits a single submit call, publishes the
/// [`JobResult`] and moves on. An error or panic inside `submit` becomes a
/// `Failure` for that task only.
///
/// The returned stream yields exactly `tasks.len()` items and then ends.
/// Dropping it early does not stop the batch: every task still runs.
///
/// # Errors
///
/// `InvalidArgument` if `max_workers` is 0. Nothing is spawned in that case.
///
/// # Panics
///
/// Must be called from within a Tokio runtime.
pub fn run<S, P>(tasks: Vec<PromptTask>, submitter: S, max_workers: usize) -> Result<BatchStream<P>>
where
    S: Submitter<P>,
    P: Send + 'static,
{
    if max_workers < 1 {
        return Err(BatchError::invalid("max_workers must be at least 1"));
    }

    let batch_id = Uuid::new_v4().to_string();
    let total = tasks.len();
    let (tx, rx) = mpsc::channel(total.max(1));

    if total == 0 {
        debug!(batch_id = %batch_id, "empty batch, nothing to submit");
        return Ok(BatchStream::new(batch_id, rx, 0));
    }

    let workers = max_workers.min(total);
    info!(batch_id = %batch_id, total, workers, "starting batch");

    let queue: TaskQueue = Arc::new(Mutex::new(VecDeque::from(tasks)));
    let submitter = Arc::new(submitter);

    for worker in 0..workers {
        let span = debug_span!("batch_worker", batch_id = %batch_id, worker);
        tokio::spawn(
            worker_loop(Arc::clone(&queue), Arc::clone(&submitter), tx.clone()).instrument(span),
        );
    }

    Ok(BatchStream::new(batch_id, rx, total))
}

fn next_task(queue: &TaskQueue) -> Option<PromptTask> {
    match queue.lock() {
        Ok(mut q) => q.pop_front(),
        Err(poisoned) => poisoned.into_inner().pop_front(),
    }
}

async fn worker_loop<S, P>(queue: TaskQueue, submitter: Arc<S>, tx: mpsc::Sender<JobResult<P>>)
where
    S: Submitter<P>,
    P: Send + 'static,
{
    let mut consumer_gone = false;
    let slot = Arc::new(Semaphore::new(1));

    loop {
        // Wait out any call from the previous task still running detached.
        if let Ok(permit) = slot.acquire().await {
            drop(permit);
        }
        let Some(task) = next_task(&queue) else {
            break;
        };
        let index = task.metadata.index;
        let result = WORKER_SLOT
            .scope(Arc::clone(&slot), execute(submitter.as_ref(), task))
            .instrument(debug_span!("prompt_task", index))
            .await;

        if tx.send(result).await.is_err() && !consumer_gone {
            debug!("result stream dropped, continuing remaining tasks");
            consumer_gone = true;
        }
    }
}

async fn execute<S, P>(submitter: &S, task: PromptTask) -> JobResult<P>
where
    S: Submitter<P>,
{
    let start = Instant::now();
    // Calling `submit` inside the guarded future also catches panics raised
    // before the returned future is first polled.
    let outcome = AssertUnwindSafe(async { submitter.submit(&task).await })
        .catch_unwind()
        .await;
    let duration_ms = start.elapsed().as_millis() as u64;
    let metadata = task.metadata;

    match outcome {
        Ok(Ok(payload)) => {
            debug!(duration_ms, "task succeeded");
            JobResult::Success {
                payload,
                metadata,
                duration_ms,
            }
        }
        Ok(Err(e)) => {
            let error = format!("{:#}", e);
            debug!(duration_ms, error = %error, "task failed");
            JobResult::Failure {
                error,
                metadata,
                duration_ms,
            }
        }
        Err(panic) => {
            let error = format!("submit panicked: {}", panic_message(panic.as_ref()));
            debug!(duration_ms, error = %error, "task panicked");
            JobResult::Failure {
                error,
                metadata,
                duration_ms,
            }
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

/// Results of one batch, in the order tasks finish.
///
/// Implements [`Stream`]; use `futures::StreamExt::next` to consume it.
/// The stream ends once every task has produced its result.
#[derive(Debug)]
pub struct BatchStream<P> {
    batch_id: String,
    rx: mpsc::Receiver<JobResult<P>>,
    total: usize,
    received: usize,
}

impl<P> BatchStream<P> {
    fn new(batch_id: String, rx: mpsc::Receiver<JobResult<P>>, total: usize) -> Self {
        Self {
            batch_id,
            rx,
            total,
            received: 0,
        }
    }

    /// Unique ID of this batch, also attached to the workers' log spans.
    pub fn batch_id(&self) -> &str {
        &self.batch_id
    }

    /// Number of tasks in the batch.
    pub fn total(&self) -> usize {
        self.total
    }
}

impl<P> Stream for BatchStream<P> {
    type Item = JobResult<P>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = &mut *self;
        match this.rx.poll_recv(cx) {
            Poll::Ready(Some(result)) => {
                this.received += 1;
                Poll::Ready(Some(result))
            }
            Poll::Ready(None) => {
                if this.total > 0 {
                    info!(
                        batch_id = %this.batch_id,
                        total = this.total,
                        received = this.received,
                        "batch finished"
                    );
                }
                Poll::Ready(None)
            }
            Poll::Pending => Poll::Pending,
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.total.saturating_sub(self.received);
        (remaining, Some(remaining))
    }
}

/// A runner bound to a [`BatchConfig`].
///
/// Wraps each submitter in [`Deadline`] and [`Retry`] according to the
/// config, then hands it to [`run`].
#[derive(Debug, Clone, Default)]
pub struct BatchRunner {
    config: BatchConfig,
}

impl BatchRunner {
    pub fn new(config: BatchConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    /// See [`run`]. Must be called from within a Tokio runtime.
    pub fn run<S, P>(&self, tasks: Vec<PromptTask>, submitter: S) -> Result<BatchStream<P>>
    where
        S: Submitter<P>,
        P: Send + 'static,
    {
        let policy = self.config.retry.unwrap_or_else(RetryPolicy::none);
        let submitter = Retry::new(Deadline::new(submitter, self.config.submit_timeout), policy);
        run(tasks, submitter, self.config.max_workers)
    }
}
