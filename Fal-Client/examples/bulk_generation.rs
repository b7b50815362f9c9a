//! Generate a batch of jewelry product shots from one template.
//!
//! Requires `FAL_KEY` to be set. Images are written to `./output`.
//!
//! ```sh
//! cargo run --example bulk_generation -- "Necklace - Pearl Strand" 12
//! ```

use std::path::Path;

use fal_client::{FalClient, FalCredentials, FalSubmitter, FluxModel, FluxRequest};
use futures::StreamExt;
use prompt_batch::{
    expand, templates, Axis, BatchConfig, BatchRunner, BatchSummary, RetryPolicy, VariationAxes,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut args = std::env::args().skip(1);
    let template_name = args
        .next()
        .unwrap_or_else(|| "Engagement Ring - Classic Solitaire".to_string());
    let count: usize = args.next().map(|c| c.parse::<usize>()).transpose()?.unwrap_or(10);

    let template = templates::find(&template_name)
        .ok_or_else(|| anyhow::anyhow!("unknown template '{}'", template_name))?;
    let tasks = expand(template.prompt, count, &VariationAxes::default())?;

    let client = FalClient::new(FalCredentials::from_env()?);
    let submitter = FalSubmitter::new(client.clone(), FluxModel::Dev)
        .with_template(FluxRequest::new("").steps(28).guidance_scale(3.5));

    let runner = BatchRunner::new(
        BatchConfig::builder()
            .with_max_workers(5)
            .with_retry(RetryPolicy::default())
            .build(),
    );

    let out_dir = Path::new("output");
    std::fs::create_dir_all(out_dir)?;

    let mut stream = runner.run(tasks, submitter)?;
    let total = stream.total();
    println!("Batch {}: {} images of '{}'", stream.batch_id(), total, template.name);

    let started = std::time::Instant::now();
    let mut results = Vec::with_capacity(total);
    while let Some(result) = stream.next().await {
        let meta = result.metadata();
        match result.payload() {
            Some(image) => {
                let path = out_dir.join(format!(
                    "jewelry_{:03}_{}_{}.png",
                    meta.index,
                    meta.material.replace(' ', "_"),
                    meta.style
                ));
                match client.image(&image.url).await {
                    Ok(bytes) => std::fs::write(&path, bytes)?,
                    Err(e) => eprintln!("download failed for #{}: {}", meta.index, e),
                }
                println!("[{}/{}] #{} ok -> {}", results.len() + 1, total, meta.index, path.display());
            }
            None => println!(
                "[{}/{}] #{} failed: {}",
                results.len() + 1,
                total,
                meta.index,
                result.error().unwrap_or("unknown error")
            ),
        }
        results.push(result);
    }

    let summary = BatchSummary::from_results(&results);
    println!(
        "\n{} succeeded, {} failed in {:.1}s",
        summary.succeeded,
        summary.failed,
        started.elapsed().as_secs_f64()
    );
    for (material, n) in summary.ranked(Axis::Material) {
        println!("  {:<12} {}", material, n);
    }
    if !summary.all_succeeded() {
        std::fs::write(
            out_dir.join("failures.json"),
            serde_json::to_string_pretty(&summary.failures)?,
        )?;
    }
    Ok(())
}
