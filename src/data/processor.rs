//! Data Processor Module
//! Dissolves tracts into counties: project, group, sum, derive ratios.

use crate::config::Columns;
use crate::data::GeoFrame;
use geo::{MultiPolygon, Polygon};
use polars::prelude::*;
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum ProcessorError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error("Dissolve requires at least one column to sum")]
    NothingToSum,
}

/// A derived `numerator / denominator` column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RatioSpec {
    pub name: String,
    pub numerator: String,
    pub denominator: String,
}

impl RatioSpec {
    /// Ratio named `{numerator}_ratio`.
    pub fn of(numerator: impl Into<String>, denominator: impl Into<String>) -> Self {
        let numerator = numerator.into();
        Self {
            name: format!("{}_ratio", numerator),
            numerator,
            denominator: denominator.into(),
        }
    }

    /// NaN where the denominator is zero.
    fn expr(&self) -> Expr {
        let numerator = col(self.numerator.as_str());
        let denominator = col(self.denominator.as_str());
        when(denominator.clone().eq(lit(0.0)))
            .then(lit(f64::NAN))
            .otherwise(numerator / denominator)
            .alias(self.name.as_str())
    }
}

/// What to dissolve by, what to sum, and which ratios to derive afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DissolveSpec {
    pub key: String,
    pub sums: Vec<String>,
    pub ratios: Vec<RatioSpec>,
}

impl DissolveSpec {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            sums: Vec::new(),
            ratios: Vec::new(),
        }
    }

    pub fn sum(mut self, column: impl Into<String>) -> Self {
        self.sums.push(column.into());
        self
    }

    pub fn ratio(mut self, ratio: RatioSpec) -> Self {
        self.ratios.push(ratio);
        self
    }
}

/// Handles the tract to county dissolve.
pub struct DataProcessor;

impl DataProcessor {
    /// Group rows by `spec.key`, summing `spec.sums` and merging geometry.
    ///
    /// Only the key and summed columns survive. Rows with a null key are
    /// dropped. Output is sorted by key.
    pub fn dissolve(frame: &GeoFrame, spec: &DissolveSpec) -> Result<GeoFrame, ProcessorError> {
        if spec.sums.is_empty() {
            return Err(ProcessorError::NothingToSum);
        }

        let key = spec.key.as_str();
        let mut projection = vec![col(key).cast(DataType::String)];
        projection.extend(spec.sums.iter().map(|c| col(c.as_str()).cast(DataType::Float64)));
        let sums: Vec<Expr> = spec.sums.iter().map(|c| col(c.as_str()).sum()).collect();
        let ratios: Vec<Expr> = spec.ratios.iter().map(RatioSpec::expr).collect();

        let mut grouped = frame
            .data
            .clone()
            .lazy()
            .select(projection)
            .filter(col(key).is_not_null())
            .group_by_stable([col(key)])
            .agg(sums);
        if !ratios.is_empty() {
            grouped = grouped.with_columns(ratios);
        }
        let grouped = grouped
            .sort([key], SortMultipleOptions::default())
            .collect()?;

        let mut members: BTreeMap<String, Vec<Polygon<f64>>> = BTreeMap::new();
        for (group, geometry) in frame.str_values(key)?.into_iter().zip(&frame.geometry) {
            if let Some(group) = group {
                members
                    .entry(group)
                    .or_default()
                    .extend(geometry.0.iter().cloned());
            }
        }

        let geometry = frame_keys(&grouped, key)?
            .into_iter()
            .map(|group| MultiPolygon::new(members.remove(&group).unwrap_or_default()))
            .collect();

        debug!(
            key,
            groups = grouped.height(),
            rows = frame.height(),
            "Dissolved rows"
        );
        Ok(GeoFrame::new(grouped, geometry)?)
    }

    /// Sum a single column per county.
    pub fn dissolve_sum(
        frame: &GeoFrame,
        key: &str,
        column: &str,
    ) -> Result<GeoFrame, ProcessorError> {
        Self::dissolve(frame, &DissolveSpec::new(key).sum(column))
    }

    /// Population and the four low access counts per county, plus each count
    /// as a share of county population.
    pub fn county_food_access(
        frame: &GeoFrame,
        columns: &Columns,
    ) -> Result<GeoFrame, ProcessorError> {
        let mut spec = DissolveSpec::new(columns.county).sum(columns.population);
        for column in columns.low_access() {
            spec = spec
                .sum(column)
                .ratio(RatioSpec::of(column, columns.population));
        }
        Self::dissolve(frame, &spec)
    }
}

fn frame_keys(df: &DataFrame, key: &str) -> PolarsResult<Vec<String>> {
    Ok(df
        .column(key)?
        .str()?
        .into_iter()
        .map(|v| v.unwrap_or_default().to_string())
        .collect())
}
