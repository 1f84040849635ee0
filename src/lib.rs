//! Food Access Maps - census tract food access analysis
//!
//! Joins census tract shapes with the USDA food access table, reports how
//! many tracts carry access data, and renders county and tract maps to PNG.

pub mod charts;
pub mod config;
pub mod data;
pub mod pipeline;
pub mod stats;

pub use config::{Columns, OutputConfig, PipelineConfig};
