//! Food Access Calculator Module
//! Coverage percentage and the low access threshold rule.

use crate::config::Columns;
use crate::data::GeoFrame;
use polars::prelude::*;
use thiserror::Error;
use tracing::debug;

/// Absolute low access threshold, in people.
pub const LOW_ACCESS_POPULATION: f64 = 500.0;

/// Relative low access threshold, as a share of tract population.
pub const LOW_ACCESS_SHARE: f64 = 1.0 / 3.0;

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),
}

/// True when at least 500 people, or a third of the population, lack access.
pub fn is_low_access(low_access_population: f64, population: f64) -> bool {
    low_access_population >= LOW_ACCESS_POPULATION
        || low_access_population / population >= LOW_ACCESS_SHARE
}

/// Handles food access statistics over the joined tract data.
pub struct AccessCalculator;

impl AccessCalculator {
    /// Row predicate: either distance count holds a non-zero value.
    pub fn has_access_data(columns: &Columns) -> Expr {
        col(columns.la_half)
            .cast(DataType::Float64)
            .neq(lit(0.0))
            .or(col(columns.la_ten).cast(DataType::Float64).neq(lit(0.0)))
    }

    /// Percentage of `state`'s tracts with food access data.
    ///
    /// An empty state subset yields NaN.
    pub fn coverage_percentage(
        frame: &GeoFrame,
        columns: &Columns,
        state: &str,
    ) -> Result<f64, AnalysisError> {
        let state_rows = frame
            .data
            .clone()
            .lazy()
            .filter(col(columns.state).is_not_null())
            .filter(col(columns.state).eq(lit(state)))
            .collect()?;
        let total = state_rows.height();

        let with_data = state_rows
            .lazy()
            .filter(Self::has_access_data(columns))
            .collect()?
            .height();

        debug!(state, total, with_data, "Counted tracts with access data");
        Ok(with_data as f64 / total as f64 * 100.0)
    }

    /// Per-row version of [`Self::has_access_data`]; null rows are false.
    pub fn access_data_mask(frame: &GeoFrame, columns: &Columns) -> Result<Vec<bool>, AnalysisError> {
        let mask = frame
            .data
            .clone()
            .lazy()
            .select([Self::has_access_data(columns).fill_null(lit(false)).alias("mask")])
            .collect()?;
        Ok(mask
            .column("mask")?
            .bool()?
            .into_iter()
            .map(|v| v.unwrap_or(false))
            .collect())
    }

    /// Rows flagged by `flag` (equal to 1) that meet the low access rule for
    /// the `count` column.
    pub fn low_access_mask(
        frame: &GeoFrame,
        flag: &str,
        count: &str,
        population: &str,
    ) -> Result<Vec<bool>, AnalysisError> {
        let flags = frame.f64_values(flag)?;
        let counts = frame.f64_values(count)?;
        let populations = frame.f64_values(population)?;

        Ok(flags
            .iter()
            .zip(&counts)
            .zip(&populations)
            .map(|((flag, count), population)| match (flag, count, population) {
                (Some(f), Some(c), Some(p)) if *f == 1.0 => is_low_access(*c, *p),
                (Some(f), Some(c), None) if *f == 1.0 => *c >= LOW_ACCESS_POPULATION,
                _ => false,
            })
            .collect())
    }
}
