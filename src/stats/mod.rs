//! Stats module - coverage and low access statistics

mod calculator;

pub use calculator::{
    is_low_access, AccessCalculator, AnalysisError, LOW_ACCESS_POPULATION, LOW_ACCESS_SHARE,
};
