//! Pipeline driver: load, report coverage, render every map in order.

use crate::charts::StaticMapRenderer;
use crate::config::PipelineConfig;
use crate::data::load_joined;
use crate::stats::AccessCalculator;
use anyhow::{Context, Result};
use tracing::info;

pub fn run(config: &PipelineConfig) -> Result<()> {
    let columns = &config.columns;
    let output = &config.output;

    let tracts = load_joined(config).with_context(|| {
        format!(
            "Failed to load {:?} joined with {:?}",
            config.shapefile, config.food_access_csv
        )
    })?;

    let coverage = AccessCalculator::coverage_percentage(&tracts, columns, &config.target_state)
        .context("Failed to compute food access coverage")?;
    info!(
        state = %config.target_state,
        coverage_pct = coverage,
        "Food access data coverage"
    );

    StaticMapRenderer::plot_map(&tracts, &output.map, output.map_size)
        .with_context(|| format!("Failed to render {:?}", output.map))?;
    StaticMapRenderer::plot_population_map(
        &tracts,
        columns,
        &output.population_map,
        output.map_size,
    )
    .with_context(|| format!("Failed to render {:?}", output.population_map))?;
    StaticMapRenderer::plot_population_county_map(
        &tracts,
        columns,
        &output.county_population_map,
        output.map_size,
    )
    .with_context(|| format!("Failed to render {:?}", output.county_population_map))?;
    StaticMapRenderer::plot_food_access_by_county(
        &tracts,
        columns,
        &output.county_food_access,
        output.grid_size,
    )
    .with_context(|| format!("Failed to render {:?}", output.county_food_access))?;
    StaticMapRenderer::plot_low_access_tracts(
        &tracts,
        columns,
        &output.low_access,
        output.overlay_size,
    )
    .with_context(|| format!("Failed to render {:?}", output.low_access))?;

    Ok(())
}
