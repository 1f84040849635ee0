//! Map Plotter Module
//! Color scales and the lon/lat to pixel projection used by the renderer.

use geo::{BoundingRect, MultiPolygon, Rect};
use plotters::style::RGBColor;
use rayon::prelude::*;

/// Base layer for every tract.
pub const BASE_GREY: RGBColor = RGBColor(0xEE, 0xEE, 0xEE);
/// Tracts that carry food access data.
pub const COVERAGE_GREY: RGBColor = RGBColor(0xAA, 0xAA, 0xAA);
/// Choropleth fill for rows without a value.
pub const MISSING_GREY: RGBColor = RGBColor(0xD3, 0xD3, 0xD3);
/// Default fill for the plain map.
pub const PLAIN_FILL: RGBColor = RGBColor(31, 119, 180);
pub const URBAN_HIGHLIGHT: RGBColor = RGBColor(31, 119, 180);
pub const RURAL_HIGHLIGHT: RGBColor = RGBColor(18, 78, 150);

/// Viridis, sampled at five evenly spaced stops.
pub const VIRIDIS: [RGBColor; 5] = [
    RGBColor(68, 1, 84),
    RGBColor(59, 82, 139),
    RGBColor(33, 145, 140),
    RGBColor(94, 201, 98),
    RGBColor(253, 231, 37),
];

/// Projected outer rings of one geometry, in pixels.
pub type PixelRings = Vec<Vec<(i32, i32)>>;

/// Linear color scale over `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorScale {
    pub min: f64,
    pub max: f64,
}

impl ColorScale {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Span the finite values; falls back to 0..1 when there are none.
    pub fn from_values(values: &[Option<f64>]) -> Self {
        let (min, max) = values
            .iter()
            .flatten()
            .filter(|v| v.is_finite())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });

        if min > max {
            Self::new(0.0, 1.0)
        } else if min == max {
            Self::new(min, min + 1.0)
        } else {
            Self::new(min, max)
        }
    }

    /// Position of `value` on the scale, clamped to `[0, 1]`.
    pub fn position(&self, value: f64) -> f64 {
        ((value - self.min) / (self.max - self.min)).clamp(0.0, 1.0)
    }

    /// Fill color for a value; null and NaN get [`MISSING_GREY`].
    pub fn color(&self, value: Option<f64>) -> RGBColor {
        match value {
            Some(v) if !v.is_nan() => ramp(self.position(v)),
            _ => MISSING_GREY,
        }
    }
}

/// Interpolate along [`VIRIDIS`] for `t` in `[0, 1]`.
pub fn ramp(t: f64) -> RGBColor {
    let t = t.clamp(0.0, 1.0);
    let segments = (VIRIDIS.len() - 1) as f64;
    let scaled = t * segments;
    let i = (scaled.floor() as usize).min(VIRIDIS.len() - 2);
    let frac = scaled - i as f64;

    let RGBColor(r0, g0, b0) = VIRIDIS[i];
    let RGBColor(r1, g1, b1) = VIRIDIS[i + 1];
    let lerp = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * frac).round() as u8;
    RGBColor(lerp(r0, r1), lerp(g0, g1), lerp(b0, b1))
}

/// Label text for a scale tick.
pub fn format_tick(value: f64) -> String {
    let magnitude = value.abs();
    if magnitude >= 100.0 {
        format!("{:.0}", value)
    } else if magnitude >= 1.0 {
        format!("{:.1}", value)
    } else {
        format!("{:.2}", value)
    }
}

/// Equirectangular projection fitted to a pixel area.
///
/// Longitude is scaled by the cosine of the mid latitude so shapes keep their
/// proportions, and the map is centered with a fixed padding.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapProjection {
    min_x: f64,
    max_y: f64,
    x_stretch: f64,
    scale: f64,
    offset: (f64, f64),
}

impl MapProjection {
    /// Fit all geometries into `size` pixels. `None` when nothing has extent.
    pub fn fit(geometry: &[MultiPolygon<f64>], size: (u32, u32), padding: u32) -> Option<Self> {
        let bounds = geometry
            .iter()
            .filter_map(|g| g.bounding_rect())
            .reduce(|a, b| {
                Rect::new(
                    (a.min().x.min(b.min().x), a.min().y.min(b.min().y)),
                    (a.max().x.max(b.max().x), a.max().y.max(b.max().y)),
                )
            })?;

        let mid_lat = (bounds.min().y + bounds.max().y) / 2.0;
        let x_stretch = mid_lat.to_radians().cos().abs().max(f64::EPSILON);
        let world_w = bounds.width() * x_stretch;
        let world_h = bounds.height();

        let avail_w = size.0.saturating_sub(2 * padding).max(1) as f64;
        let avail_h = size.1.saturating_sub(2 * padding).max(1) as f64;
        let scale_w = if world_w > 0.0 { avail_w / world_w } else { f64::INFINITY };
        let scale_h = if world_h > 0.0 { avail_h / world_h } else { f64::INFINITY };
        let scale = match scale_w.min(scale_h) {
            s if s.is_finite() => s,
            _ => 1.0,
        };

        let offset = (
            (size.0 as f64 - world_w * scale) / 2.0,
            (size.1 as f64 - world_h * scale) / 2.0,
        );

        Some(Self {
            min_x: bounds.min().x,
            max_y: bounds.max().y,
            x_stretch,
            scale,
            offset,
        })
    }

    pub fn point(&self, x: f64, y: f64) -> (i32, i32) {
        let px = self.offset.0 + (x - self.min_x) * self.x_stretch * self.scale;
        let py = self.offset.1 + (self.max_y - y) * self.scale;
        (px.round() as i32, py.round() as i32)
    }

    /// Outer rings only; interior rings are not drawn.
    pub fn project(&self, geometry: &MultiPolygon<f64>) -> PixelRings {
        geometry
            .0
            .iter()
            .map(|polygon| {
                polygon
                    .exterior()
                    .coords()
                    .map(|c| self.point(c.x, c.y))
                    .collect()
            })
            .collect()
    }

    pub fn project_all(&self, geometry: &[MultiPolygon<f64>]) -> Vec<PixelRings> {
        geometry.par_iter().map(|g| self.project(g)).collect()
    }
}
