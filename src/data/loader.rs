//! Tract Data Loader Module
//! Reads tract polygons from a shapefile and food access rows from a CSV,
//! then left-joins them on the tract identifier.

use crate::config::PipelineConfig;
use crate::data::GeoFrame;
use geo::MultiPolygon;
use polars::prelude::*;
use shapefile::dbase::FieldValue;
use shapefile::{Reader, Shape};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Row index used to keep geometry aligned through the join.
const ROW_INDEX: &str = "__tract_row";

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Failed to read shapefile: {0}")]
    Shapefile(#[from] shapefile::Error),
    #[error("Field '{0}' not found in shapefile records")]
    MissingIdField(String),
    #[error("Field '{field}' has unsupported type for a tract id: {value:?}")]
    UnsupportedIdField { field: String, value: String },
    #[error("Failed to convert {0} geometry")]
    Geometry(&'static str),
    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),
}

/// Tract identifiers and polygons in shapefile order.
#[derive(Debug, Clone, Default)]
pub struct TractShapes {
    pub ids: Vec<String>,
    pub geometry: Vec<MultiPolygon<f64>>,
}

impl TractShapes {
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn push(&mut self, id: impl Into<String>, geometry: MultiPolygon<f64>) {
        self.ids.push(id.into());
        self.geometry.push(geometry);
    }
}

/// Read every polygon in the shapefile together with its `id_field` value.
pub fn read_tracts(path: &Path, id_field: &str) -> Result<TractShapes, LoaderError> {
    let mut reader = Reader::from_path(path)?;
    let mut tracts = TractShapes::default();

    for result in reader.iter_shapes_and_records() {
        let (shape, record) = result?;

        let value = record
            .get(id_field)
            .ok_or_else(|| LoaderError::MissingIdField(id_field.to_string()))?;
        let Some(id) = tract_id(id_field, value)? else {
            warn!(field = id_field, "Skipping shape with null tract id");
            continue;
        };

        let geometry: MultiPolygon<f64> = match shape {
            Shape::Polygon(polygon) => polygon
                .try_into()
                .map_err(|_| LoaderError::Geometry("Polygon"))?,
            Shape::PolygonM(polygon) => polygon
                .try_into()
                .map_err(|_| LoaderError::Geometry("PolygonM"))?,
            Shape::PolygonZ(polygon) => polygon
                .try_into()
                .map_err(|_| LoaderError::Geometry("PolygonZ"))?,
            other => {
                warn!(tract = %id, shape = ?other.shapetype(), "Skipping non-polygon shape");
                continue;
            }
        };

        tracts.push(id, geometry);
    }

    info!(path = %path.display(), tracts = tracts.len(), "Loaded tract shapes");
    Ok(tracts)
}

/// Character ids are trimmed; numeric ids lose their fractional part.
fn tract_id(field: &str, value: &FieldValue) -> Result<Option<String>, LoaderError> {
    match value {
        FieldValue::Character(Some(s)) => Ok(Some(s.trim().to_string())),
        FieldValue::Character(None) | FieldValue::Numeric(None) => Ok(None),
        FieldValue::Numeric(Some(n)) => Ok(Some(format!("{:.0}", n))),
        other => Err(LoaderError::UnsupportedIdField {
            field: field.to_string(),
            value: format!("{:?}", other),
        }),
    }
}

/// Load the food access CSV. Columns are not validated here.
pub fn read_food_access(path: &Path) -> Result<DataFrame, LoaderError> {
    let df = LazyCsvReader::new(path)
        .with_infer_schema_length(Some(10000))
        .finish()?
        .collect()?;

    info!(
        path = %path.display(),
        rows = df.height(),
        columns = df.width(),
        "Loaded food access table"
    );
    Ok(df)
}

/// Left-join the CSV onto the tract shapes.
///
/// The shapefile drives the join: every tract survives, and tracts without a
/// CSV match carry nulls in every CSV column. Output follows shapefile order.
pub fn join_tracts(
    tracts: TractShapes,
    table: &DataFrame,
    shape_key: &str,
    csv_key: &str,
) -> Result<GeoFrame, LoaderError> {
    let row_index: Vec<u32> = (0..tracts.len() as u32).collect();
    let left = DataFrame::new(vec![
        Column::new(shape_key.into(), tracts.ids),
        Column::new(ROW_INDEX.into(), row_index),
    ])?;

    let right = table
        .clone()
        .lazy()
        .with_columns([col(csv_key).cast(DataType::String)]);

    let joined = left
        .lazy()
        .join(
            right,
            [col(shape_key)],
            [col(csv_key)],
            JoinArgs::new(JoinType::Left),
        )
        .sort(
            [ROW_INDEX],
            SortMultipleOptions::default().with_maintain_order(true),
        )
        .collect()?;

    let source_rows: Vec<usize> = joined
        .column(ROW_INDEX)?
        .u32()?
        .into_no_null_iter()
        .map(|i| i as usize)
        .collect();
    let geometry = source_rows
        .iter()
        .map(|&i| tracts.geometry[i].clone())
        .collect();

    let frame = GeoFrame::new(joined.drop(ROW_INDEX)?, geometry)?;
    debug!(rows = frame.height(), "Joined tracts with food access table");
    Ok(frame)
}

/// Load both inputs named by the config and join them.
pub fn load_joined(config: &PipelineConfig) -> Result<GeoFrame, LoaderError> {
    let columns = &config.columns;
    let tracts = read_tracts(&config.shapefile, columns.tract_shape)?;
    let table = read_food_access(&config.food_access_csv)?;
    let frame = join_tracts(tracts, &table, columns.tract_shape, columns.tract_csv)?;
    info!(rows = frame.height(), "Joined dataset ready");
    Ok(frame)
}
