//! Geometry-bearing DataFrame.
//! Polars holds the attribute table; polygons live alongside it, one per row.

use geo::MultiPolygon;
use polars::prelude::*;

/// An attribute table with one geometry per row.
#[derive(Debug, Clone)]
pub struct GeoFrame {
    pub data: DataFrame,
    pub geometry: Vec<MultiPolygon<f64>>,
}

impl GeoFrame {
    /// Pair a table with its geometry. Both must have the same row count.
    pub fn new(data: DataFrame, geometry: Vec<MultiPolygon<f64>>) -> PolarsResult<Self> {
        if data.height() != geometry.len() {
            return Err(PolarsError::ShapeMismatch(
                format!(
                    "table has {} rows but {} geometries were given",
                    data.height(),
                    geometry.len()
                )
                .into(),
            ));
        }
        Ok(Self { data, geometry })
    }

    pub fn height(&self) -> usize {
        self.data.height()
    }

    pub fn is_empty(&self) -> bool {
        self.data.height() == 0
    }

    /// Read a column as nullable floats, casting numeric and string columns.
    pub fn f64_values(&self, name: &str) -> PolarsResult<Vec<Option<f64>>> {
        let column = self.data.column(name)?.cast(&DataType::Float64)?;
        let values = column.f64()?.into_iter().collect();
        Ok(values)
    }

    /// Read a column as nullable strings.
    pub fn str_values(&self, name: &str) -> PolarsResult<Vec<Option<String>>> {
        let column = self.data.column(name)?.cast(&DataType::String)?;
        let values = column
            .str()?
            .into_iter()
            .map(|v| v.map(str::to_string))
            .collect();
        Ok(values)
    }
}
