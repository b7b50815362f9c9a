use futures::StreamExt;
use prompt_batch::*;
use std::time::Duration;

struct FakeImageApi;

impl Submitter<String> for FakeImageApi {
    async fn submit(&self, task: &PromptTask) -> anyhow::Result<String> {
        // Simulate a network-bound generation call
        let millis = 50 + (task.metadata.index as u64 * 37) % 200;
        tokio::time::sleep(Duration::from_millis(millis)).await;

        if task.metadata.index % 7 == 0 {
            anyhow::bail!("simulated upstream error");
        }
        Ok(format!("https://cdn.example/jewelry_{:03}.png", task.metadata.index))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let template = templates::find("Engagement Ring - Classic Solitaire")
        .ok_or_else(|| anyhow::anyhow!("template missing"))?;
    let tasks = expand(template.prompt, 20, &VariationAxes::default())?;
    let total = tasks.len();

    let mut results = run(tasks, FakeImageApi, 5)?;
    let (mut ok, mut failed) = (0, 0);

    while let Some(result) = results.next().await {
        match &result {
            JobResult::Success { payload, metadata, .. } => {
                ok += 1;
                println!("#{:>3} {} / {} -> {}", metadata.index, metadata.material, metadata.gemstone, payload);
            }
            JobResult::Failure { error, metadata, .. } => {
                failed += 1;
                println!("#{:>3} failed: {}", metadata.index, error);
            }
        }
        println!("  progress: {}/{} ({} errors)", ok + failed, total, failed);
    }

    Ok(())
}
