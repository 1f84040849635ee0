//! Pipeline Configuration
//! Fixed input paths, schema column names and output targets.

use std::path::PathBuf;

/// Column names of the joined tract table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Columns {
    /// Tract identifier in the shapefile's DBF table.
    pub tract_shape: &'static str,
    /// Tract identifier in the food access CSV.
    pub tract_csv: &'static str,
    pub state: &'static str,
    pub county: &'static str,
    pub population: &'static str,
    pub urban: &'static str,
    pub rural: &'static str,
    /// Low access population at 1/2 mile.
    pub la_half: &'static str,
    /// Low access population at 10 miles.
    pub la_ten: &'static str,
    /// Low access and low income population at 1/2 mile.
    pub la_low_income_half: &'static str,
    /// Low access and low income population at 10 miles.
    pub la_low_income_ten: &'static str,
}

impl Default for Columns {
    fn default() -> Self {
        Self {
            tract_shape: "CTIDFP00",
            tract_csv: "CensusTract",
            state: "State",
            county: "County",
            population: "POP2010",
            urban: "Urban",
            rural: "Rural",
            la_half: "lapophalf",
            la_ten: "lapop10",
            la_low_income_half: "lalowihalf",
            la_low_income_ten: "lalowi10",
        }
    }
}

impl Columns {
    /// The four low access counts, in panel order.
    pub fn low_access(&self) -> [&'static str; 4] {
        [
            self.la_half,
            self.la_ten,
            self.la_low_income_half,
            self.la_low_income_ten,
        ]
    }
}

/// Where the five maps are written and how large they are.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputConfig {
    pub map: PathBuf,
    pub population_map: PathBuf,
    pub county_population_map: PathBuf,
    pub county_food_access: PathBuf,
    pub low_access: PathBuf,
    /// Size of the single-panel maps in pixels.
    pub map_size: (u32, u32),
    /// Size of the 2x2 food access grid.
    pub grid_size: (u32, u32),
    /// Size of the layered low access map.
    pub overlay_size: (u32, u32),
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            map: PathBuf::from("washington_map.png"),
            population_map: PathBuf::from("washington_population_map.png"),
            county_population_map: PathBuf::from("washington_county_population_map.png"),
            county_food_access: PathBuf::from("washington_county_food_access.png"),
            low_access: PathBuf::from("washington_low_access.png"),
            map_size: (1000, 750),
            grid_size: (2000, 1000),
            overlay_size: (1000, 500),
        }
    }
}

/// Everything the pipeline needs; there is no outside configuration surface.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub shapefile: PathBuf,
    pub food_access_csv: PathBuf,
    /// State code the coverage figure is computed for.
    pub target_state: String,
    pub columns: Columns,
    pub output: OutputConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            shapefile: PathBuf::from("tl_2010_53_tract00/tl_2010_53_tract00.shp"),
            food_access_csv: PathBuf::from("food_access.csv"),
            target_state: "WA".to_string(),
            columns: Columns::default(),
            output: OutputConfig::default(),
        }
    }
}
