//! Generate one Flux image and save it to disk.
//!
//! Requires `FAL_KEY` to be set.
//!
//! ```sh
//! cargo run --example single_image -- "emerald cut engagement ring" fal-ai/flux/schnell
//! ```

use fal_client::{FalClient, FalCredentials, FluxModel, FluxRequest, ImageSize};
use std::time::Duration;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut args = std::env::args().skip(1);
    let prompt = args
        .next()
        .unwrap_or_else(|| "elegant gold ring with diamond, product photography".to_string());
    let model: FluxModel = match args.next() {
        Some(m) => m.parse()?,
        None => FluxModel::default(),
    };

    let client = FalClient::new(FalCredentials::from_env()?);

    let (arguments, seed) = FluxRequest::new(prompt)
        .image_size(ImageSize::SQUARE)
        .steps(28)
        .guidance_scale(3.5)
        .build();
    println!("Model: {}  Seed: {}", model, seed);

    let output = client
        .subscribe(&model, &arguments, Duration::from_secs(300))
        .await?;

    let image = output
        .images
        .first()
        .ok_or_else(|| anyhow::anyhow!("no images returned"))?;
    let bytes = client.image(&image.url).await?;
    let filename = format!("flux_{}.png", seed);
    std::fs::write(&filename, &bytes)?;
    println!("Saved {} ({} bytes) from {}", filename, bytes.len(), image.url);
    Ok(())
}
