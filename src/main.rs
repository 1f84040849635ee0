//! Food Access Maps - renders Washington food access maps from fixed inputs.

use food_access_maps::{pipeline, PipelineConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = PipelineConfig::default();
    pipeline::run(&config)?;

    info!("All maps written");
    Ok(())
}
