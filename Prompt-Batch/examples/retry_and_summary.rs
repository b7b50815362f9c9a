use prompt_batch::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let axes = VariationAxes::catalog();
    let tasks = expand("bold cocktail ring with large center stone", 24, &axes)?;

    // Every third call fails once, then succeeds on retry.
    let calls = Arc::new(AtomicUsize::new(0));
    let submitter = submit_fn(move |task: PromptTask| {
        let calls = Arc::clone(&calls);
        async move {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(30)).await;
            if n % 3 == 0 {
                anyhow::bail!("429 Too Many Requests");
            }
            Ok(task.metadata.index)
        }
    });

    let runner = BatchRunner::new(
        BatchConfig::builder()
            .with_max_workers(4)
            .with_retry(RetryPolicy::new(3, Duration::from_millis(200)))
            .with_submit_timeout(Duration::from_secs(30))
            .build(),
    );

    let (results, summary) = gather(runner.run(tasks, submitter)?).await;

    println!("{}", serde_json::to_string_pretty(&summary)?);
    for (material, count) in summary.ranked(Axis::Material) {
        println!("{:<12} {}", material, count);
    }

    let gold = ResultFilter::new().allow(Axis::Material, ["gold", "rose gold"]);
    println!("gold results: {}", gold.apply(&results).count());
    Ok(())
}
