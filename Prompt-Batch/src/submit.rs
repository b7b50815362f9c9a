//! The generation callback seam and its wrappers.
//!
//! The runner only knows about [`Submitter`]. Everything that changes how a
//! single call behaves (running blocking code, bounding a call's duration,
//! retrying) is a wrapper around a submitter, never part of the runner.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use anyhow::anyhow;
use tracing::{debug, warn};

use crate::runner::WORKER_SLOT;
use crate::types::PromptTask;

/// Performs one generation request for one task.
///
/// Implement this for your API client. `P` is the payload handed back on
/// success (an image URL, raw bytes, a record ID); the runner passes it
/// through without looking at it.
///
/// Any `Err` is converted into a
/// [`JobResult::Failure`](crate::types::JobResult::Failure) by the runner.
/// Implementations must not rely on process-wide mutable state such as
/// environment variables: several calls run at the same time.
///
/// # Example
///
/// ```ignore
/// use prompt_batch::*;
///
/// struct EchoSubmitter;
///
/// impl Submitter<String> for EchoSubmitter {
///     async fn submit(&self, task: &PromptTask) -> anyhow::Result<String> {
///         Ok(format!("generated #{}", task.metadata.index))
///     }
/// }
/// ```
pub trait Submitter<P>: Send + Sync + 'static {
    fn submit(&self, task: &PromptTask) -> impl Future<Output = anyhow::Result<P>> + Send;
}

impl<S, P> Submitter<P> for Arc<S>
where
    S: Submitter<P>,
{
    fn submit(&self, task: &PromptTask) -> impl Future<Output = anyhow::Result<P>> + Send {
        (**self).submit(task)
    }
}

// ── Closure adapters ────────────────────────────────────────────────

/// Submitter backed by an async closure. Build with [`submit_fn`].
#[derive(Clone)]
pub struct FnSubmitter<F> {
    f: F,
}

/// Wrap an async closure as a [`Submitter`]. The closure receives its own
/// copy of the task.
pub fn submit_fn<F, Fut, P>(f: F) -> FnSubmitter<F>
where
    F: Fn(PromptTask) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<P>> + Send,
{
    FnSubmitter { f }
}

impl<F, Fut, P> Submitter<P> for FnSubmitter<F>
where
    F: Fn(PromptTask) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<P>> + Send,
{
    fn submit(&self, task: &PromptTask) -> impl Future<Output = anyhow::Result<P>> + Send {
        (self.f)(task.clone())
    }
}

/// Submitter backed by a synchronous, potentially slow function. Each call
/// runs on Tokio's blocking thread pool. Build with [`blocking_fn`].
///
/// A blocking call cannot be interrupted. Under the runner it holds its
/// worker's slot until the function returns, even if the submit future was
/// dropped by a [`Deadline`], so at most `max_workers` calls ever run and a
/// retry never overlaps the call it replaces.
pub struct BlockingSubmitter<F> {
    f: Arc<F>,
}

/// Wrap a blocking function as a [`Submitter`].
pub fn blocking_fn<F, P>(f: F) -> BlockingSubmitter<F>
where
    F: Fn(&PromptTask) -> anyhow::Result<P> + Send + Sync + 'static,
    P: Send + 'static,
{
    BlockingSubmitter { f: Arc::new(f) }
}

impl<F, P> Submitter<P> for BlockingSubmitter<F>
where
    F: Fn(&PromptTask) -> anyhow::Result<P> + Send + Sync + 'static,
    P: Send + 'static,
{
    fn submit(&self, task: &PromptTask) -> impl Future<Output = anyhow::Result<P>> + Send {
        let f = Arc::clone(&self.f);
        let task = task.clone();
        async move {
            let permit = match WORKER_SLOT.try_with(Arc::clone) {
                Ok(slot) => Some(
                    slot.acquire_owned()
                        .await
                        .map_err(|e| anyhow!("worker slot unavailable: {}", e))?,
                ),
                Err(_) => None,
            };
            tokio::task::spawn_blocking(move || {
                let _permit = permit;
                f(&task)
            })
            .await
            .map_err(|e| anyhow!("blocking submit did not complete: {}", e))?
        }
    }
}

// ── Deadline ────────────────────────────────────────────────────────

/// Bounds each call of the inner submitter.
///
/// When the limit elapses the inner future is dropped and the task fails
/// with a timeout error. Dropping cancels async work; a [`blocking_fn`] call
/// already running on another thread keeps going until it returns, and the
/// runner does not start that worker's next task until then. The runner
/// itself never interrupts a call; this wrapper is the opt-in way to do it.
#[derive(Debug, Clone)]
pub struct Deadline<S> {
    inner: S,
    limit: Option<Duration>,
}

impl<S> Deadline<S> {
    /// `None` disables the deadline.
    pub fn new(inner: S, limit: Option<Duration>) -> Self {
        Self { inner, limit }
    }

    pub fn limit(&self) -> Option<Duration> {
        self.limit
    }
}

impl<S, P> Submitter<P> for Deadline<S>
where
    S: Submitter<P>,
    P: Send + 'static,
{
    fn submit(&self, task: &PromptTask) -> impl Future<Output = anyhow::Result<P>> + Send {
        async move {
            let Some(limit) = self.limit else {
                return self.inner.submit(task).await;
            };
            match tokio::time::timeout(limit, self.inner.submit(task)).await {
                Ok(result) => result,
                Err(_) => Err(anyhow!(
                    "task {} exceeded deadline of {}ms",
                    task.metadata.index,
                    limit.as_millis()
                )),
            }
        }
    }
}

// ── Retry ───────────────────────────────────────────────────────────

/// How many times a failing call is attempted and how long to wait between
/// attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first. Values below 1 count as 1.
    pub attempts: u32,
    /// Pause before each retry.
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            delay: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    pub fn new(attempts: u32, delay: Duration) -> Self {
        Self { attempts, delay }
    }

    /// Single attempt, no retries.
    pub fn none() -> Self {
        Self {
            attempts: 1,
            delay: Duration::ZERO,
        }
    }
}

/// Re-invokes the inner submitter on error, up to `policy.attempts` times.
///
/// Only the last error is reported. With more than one attempt configured it
/// is prefixed with the attempt count.
#[derive(Debug, Clone)]
pub struct Retry<S> {
    inner: S,
    policy: RetryPolicy,
}

impl<S> Retry<S> {
    pub fn new(inner: S, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }
}

impl<S, P> Submitter<P> for Retry<S>
where
    S: Submitter<P>,
    P: Send + 'static,
{
    fn submit(&self, task: &PromptTask) -> impl Future<Output = anyhow::Result<P>> + Send {
        async move {
            let attempts = self.policy.attempts.max(1);
            let mut attempt = 1;
            loop {
                match self.inner.submit(task).await {
                    Ok(payload) => {
                        if attempt > 1 {
                            debug!(index = task.metadata.index, attempt, "submit succeeded after retry");
                        }
                        return Ok(payload);
                    }
                    Err(e) if attempt < attempts => {
                        warn!(
                            index = task.metadata.index,
                            attempt,
                            error = %format!("{:#}", e),
                            "submit failed, retrying in {}ms",
                            self.policy.delay.as_millis()
                        );
                        tokio::time::sleep(self.policy.delay).await;
                        attempt += 1;
                    }
                    Err(e) if attempts > 1 => {
                        return Err(e.context(format!("failed after {} attempts", attempts)));
                    }
                    Err(e) => return Err(e),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::expand;
    use crate::types::VariationAxes;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn task() -> PromptTask {
        expand("signet ring", 1, &VariationAxes::default())
            .unwrap()
            .remove(0)
    }

    fn flaky(failures: u32, calls: Arc<AtomicU32>) -> impl Submitter<u32> {
        submit_fn(move |_task| {
            let calls = Arc::clone(&calls);
            async move {
                let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                if n <= failures {
                    Err(anyhow!("upstream 503 on call {}", n))
                } else {
                    Ok(n)
                }
            }
        })
    }

    #[tokio::test]
    async fn test_fn_submitter_receives_task() {
        let s = submit_fn(|task: PromptTask| async move { Ok(task.metadata.index * 10) });
        assert_eq!(s.submit(&task()).await.unwrap(), 10);
    }

    #[tokio::test]
    async fn test_blocking_submitter() {
        let s = blocking_fn(|task: &PromptTask| {
            std::thread::sleep(Duration::from_millis(5));
            Ok(task.prompt.len())
        });
        let t = task();
        assert_eq!(s.submit(&t).await.unwrap(), t.prompt.len());
    }

    #[tokio::test]
    async fn test_blocking_submitter_panic_is_error() {
        let s = blocking_fn(|_task: &PromptTask| -> anyhow::Result<()> { panic!("driver crashed") });
        let err = s.submit(&task()).await.unwrap_err();
        assert!(err.to_string().contains("blocking submit did not complete"));
    }

    #[tokio::test]
    async fn test_retry_recovers() {
        let calls = Arc::new(AtomicU32::new(0));
        let s = Retry::new(
            flaky(2, Arc::clone(&calls)),
            RetryPolicy::new(3, Duration::from_millis(1)),
        );
        assert_eq!(s.submit(&task()).await.unwrap(), 3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_retry_gives_up_with_last_error() {
        let calls = Arc::new(AtomicU32::new(0));
        let s = Retry::new(
            flaky(10, Arc::clone(&calls)),
            RetryPolicy::new(3, Duration::from_millis(1)),
        );
        let err = s.submit(&task()).await.unwrap_err();
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(
            format!("{:#}", err),
            "failed after 3 attempts: upstream 503 on call 3"
        );
    }

    #[tokio::test]
    async fn test_retry_none_is_passthrough() {
        let calls = Arc::new(AtomicU32::new(0));
        let s = Retry::new(flaky(1, Arc::clone(&calls)), RetryPolicy::none());
        let err = s.submit(&task()).await.unwrap_err();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(format!("{:#}", err), "upstream 503 on call 1");
    }

    #[test]
    fn test_default_retry_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.attempts, 3);
        assert_eq!(policy.delay, Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_deadline_expires() {
        let slow = submit_fn(|_task: PromptTask| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        });
        let s = Deadline::new(slow, Some(Duration::from_millis(20)));
        let err = s.submit(&task()).await.unwrap_err();
        assert_eq!(err.to_string(), "task 1 exceeded deadline of 20ms");
    }

    #[tokio::test]
    async fn test_deadline_disabled() {
        let fast = submit_fn(|_task: PromptTask| async { Ok("done") });
        let s = Deadline::new(fast, None);
        assert_eq!(s.submit(&task()).await.unwrap(), "done");
    }
}
