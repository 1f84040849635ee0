//! Charts module - map rendering

mod plotter;
mod renderer;

pub use plotter::{ColorScale, MapProjection, MISSING_GREY, VIRIDIS};
pub use renderer::{RenderError, StaticMapRenderer, LEGEND_WIDTH};
