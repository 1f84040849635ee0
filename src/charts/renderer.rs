//! Static Map Renderer
//! Draws tract and county maps to PNG files with the plotters bitmap backend.
//!
//! Each public function writes exactly one image:
//! 1. Plain map of every tract
//! 2. Tract population choropleth
//! 3. County population choropleth
//! 4. 2x2 grid of county low access ratios on a shared 0-1 scale
//! 5. Layered low access map (all tracts, tracts with data, urban and rural
//!    low access tracts)

use crate::charts::plotter::{
    format_tick, ramp, ColorScale, MapProjection, PixelRings, BASE_GREY, COVERAGE_GREY,
    PLAIN_FILL, RURAL_HIGHLIGHT, URBAN_HIGHLIGHT,
};
use crate::config::Columns;
use crate::data::{DataProcessor, GeoFrame, ProcessorError, RatioSpec};
use crate::stats::{AccessCalculator, AnalysisError};
use geo::MultiPolygon;
use plotters::coord::Shift;
use plotters::prelude::*;
use polars::prelude::PolarsError;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

const PADDING: u32 = 10;
/// Width of the color bar strip to the right of each choropleth.
pub const LEGEND_WIDTH: i32 = 90;
const BAR_WIDTH: i32 = 20;
const TICKS: [f64; 5] = [0.0, 0.25, 0.5, 0.75, 1.0];

type Area<'a> = DrawingArea<BitMapBackend<'a>, Shift>;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Drawing failed: {0}")]
    Drawing(String),
    #[error("Nothing to draw: no geometry has an extent")]
    EmptyDataset,
    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),
    #[error(transparent)]
    Processor(#[from] ProcessorError),
    #[error(transparent)]
    Analysis(#[from] AnalysisError),
}

fn drawing_error<E: std::fmt::Display>(err: E) -> RenderError {
    RenderError::Drawing(err.to_string())
}

pub struct StaticMapRenderer;

impl StaticMapRenderer {
    /// Every tract in a single color.
    pub fn plot_map(frame: &GeoFrame, path: &Path, size: (u32, u32)) -> Result<(), RenderError> {
        let root = Self::canvas(path, size)?;
        let projection = Self::projection(&frame.geometry, root.dim_in_pixel())?;

        for rings in projection.project_all(&frame.geometry) {
            Self::fill_rings(&root, &rings, PLAIN_FILL)?;
        }

        Self::finish(root, path)
    }

    /// Tracts colored by population.
    pub fn plot_population_map(
        frame: &GeoFrame,
        columns: &Columns,
        path: &Path,
        size: (u32, u32),
    ) -> Result<(), RenderError> {
        let values = frame.f64_values(columns.population)?;
        let scale = ColorScale::from_values(&values);

        let root = Self::canvas(path, size)?;
        Self::draw_choropleth(&root, &frame.geometry, &values, scale)?;
        Self::finish(root, path)
    }

    /// Counties colored by summed tract population.
    pub fn plot_population_county_map(
        frame: &GeoFrame,
        columns: &Columns,
        path: &Path,
        size: (u32, u32),
    ) -> Result<(), RenderError> {
        let counties = DataProcessor::dissolve_sum(frame, columns.county, columns.population)?;
        let values = counties.f64_values(columns.population)?;
        let scale = ColorScale::from_values(&values);

        let root = Self::canvas(path, size)?;
        Self::draw_choropleth(&root, &counties.geometry, &values, scale)?;
        Self::finish(root, path)
    }

    /// Four county maps, one per low access ratio, sharing a 0-1 scale.
    pub fn plot_food_access_by_county(
        frame: &GeoFrame,
        columns: &Columns,
        path: &Path,
        size: (u32, u32),
    ) -> Result<(), RenderError> {
        let counties = DataProcessor::county_food_access(frame, columns)?;
        let scale = ColorScale::new(0.0, 1.0);
        let panels = [
            (columns.la_half, "Low Access: Half"),
            (columns.la_low_income_half, "Low Access + Low Income: Half"),
            (columns.la_ten, "Low Access: 10"),
            (columns.la_low_income_ten, "Low Access + Low Income: 10"),
        ];

        let root = Self::canvas(path, size)?;
        for (area, (column, title)) in root.split_evenly((2, 2)).iter().zip(panels) {
            let ratio = RatioSpec::of(column, columns.population);
            let values = counties.f64_values(&ratio.name)?;
            let panel = area
                .titled(title, ("sans-serif", 24))
                .map_err(drawing_error)?;
            Self::draw_choropleth(&panel, &counties.geometry, &values, scale)?;
        }
        Self::finish(root, path)
    }

    /// Light grey tracts, darker grey where access data exists, blue where
    /// urban or rural tracts meet the low access rule on the 1/2 mile count.
    pub fn plot_low_access_tracts(
        frame: &GeoFrame,
        columns: &Columns,
        path: &Path,
        size: (u32, u32),
    ) -> Result<(), RenderError> {
        let with_data = AccessCalculator::access_data_mask(frame, columns)?;
        let urban = AccessCalculator::low_access_mask(
            frame,
            columns.urban,
            columns.la_half,
            columns.population,
        )?;
        let rural = AccessCalculator::low_access_mask(
            frame,
            columns.rural,
            columns.la_half,
            columns.population,
        )?;
        debug!(
            with_data = count(&with_data),
            urban_low_access = count(&urban),
            rural_low_access = count(&rural),
            "Low access layers"
        );

        let root = Self::canvas(path, size)?;
        let projection = Self::projection(&frame.geometry, root.dim_in_pixel())?;
        let rings = projection.project_all(&frame.geometry);

        Self::draw_layer(&root, &rings, None, BASE_GREY)?;
        Self::draw_layer(&root, &rings, Some(with_data.as_slice()), COVERAGE_GREY)?;
        Self::draw_layer(&root, &rings, Some(urban.as_slice()), URBAN_HIGHLIGHT)?;
        Self::draw_layer(&root, &rings, Some(rural.as_slice()), RURAL_HIGHLIGHT)?;
        Self::finish(root, path)
    }

    fn canvas(path: &Path, size: (u32, u32)) -> Result<Area<'_>, RenderError> {
        let root = BitMapBackend::new(path, size).into_drawing_area();
        root.fill(&WHITE).map_err(drawing_error)?;
        Ok(root)
    }

    fn finish(root: Area<'_>, path: &Path) -> Result<(), RenderError> {
        root.present().map_err(drawing_error)?;
        info!(path = %path.display(), "Wrote map");
        Ok(())
    }

    fn projection(
        geometry: &[MultiPolygon<f64>],
        size: (u32, u32),
    ) -> Result<MapProjection, RenderError> {
        MapProjection::fit(geometry, size, PADDING).ok_or(RenderError::EmptyDataset)
    }

    fn fill_rings(area: &Area<'_>, rings: &PixelRings, color: RGBColor) -> Result<(), RenderError> {
        for ring in rings.iter().filter(|r| r.len() >= 3) {
            area.draw(&Polygon::new(ring.clone(), color.filled()))
                .map_err(drawing_error)?;
        }
        Ok(())
    }

    /// Fill the rows selected by `mask`, or every row without one.
    fn draw_layer(
        area: &Area<'_>,
        rings: &[PixelRings],
        mask: Option<&[bool]>,
        color: RGBColor,
    ) -> Result<(), RenderError> {
        for (i, geometry) in rings.iter().enumerate() {
            if mask.map_or(true, |m| m.get(i).copied().unwrap_or(false)) {
                Self::fill_rings(area, geometry, color)?;
            }
        }
        Ok(())
    }

    /// Map on the left, color bar on the right.
    fn draw_choropleth(
        area: &Area<'_>,
        geometry: &[MultiPolygon<f64>],
        values: &[Option<f64>],
        scale: ColorScale,
    ) -> Result<(), RenderError> {
        let (width, _) = area.dim_in_pixel();
        let (map_area, legend_area) =
            area.split_horizontally((width as i32 - LEGEND_WIDTH).max(1));

        let projection = Self::projection(geometry, map_area.dim_in_pixel())?;
        for (rings, value) in projection.project_all(geometry).iter().zip(values) {
            Self::fill_rings(&map_area, rings, scale.color(*value))?;
        }

        Self::draw_color_bar(&legend_area, scale)
    }

    fn draw_color_bar(area: &Area<'_>, scale: ColorScale) -> Result<(), RenderError> {
        let (_, height) = area.dim_in_pixel();
        let left = 10;
        let right = left + BAR_WIDTH;
        let top = PADDING as i32 + 10;
        let bottom = (height as i32 - PADDING as i32 - 10).max(top + 1);
        let span = bottom - top;

        for step in 0..span {
            let t = 1.0 - step as f64 / span as f64;
            area.draw(&Rectangle::new(
                [(left, top + step), (right, top + step + 1)],
                ramp(t).filled(),
            ))
            .map_err(drawing_error)?;
        }
        area.draw(&Rectangle::new(
            [(left, top), (right, bottom)],
            BLACK.stroke_width(1),
        ))
        .map_err(drawing_error)?;

        for tick in TICKS {
            let value = scale.min + tick * (scale.max - scale.min);
            let y = bottom - (tick * span as f64).round() as i32;
            area.draw(&Text::new(
                format_tick(value),
                (right + 6, y - 7),
                ("sans-serif", 14).into_font(),
            ))
            .map_err(drawing_error)?;
        }
        Ok(())
    }
}

fn count(mask: &[bool]) -> usize {
    mask.iter().filter(|&&m| m).count()
}
