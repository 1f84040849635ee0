//! Data module - tract loading, joining and county dissolve

mod frame;
mod loader;
mod processor;

pub use frame::GeoFrame;
pub use loader::{
    join_tracts, load_joined, read_food_access, read_tracts, LoaderError, TractShapes,
};
pub use processor::{DataProcessor, DissolveSpec, ProcessorError, RatioSpec};
