use food_access_maps::charts::{
    MapProjection, StaticMapRenderer, LEGEND_WIDTH, MISSING_GREY, VIRIDIS,
};
use food_access_maps::data::{join_tracts, DataProcessor, GeoFrame, TractShapes};
use food_access_maps::stats::AccessCalculator;
use food_access_maps::Columns;
use geo::{polygon, MultiPolygon};
use image::RgbImage;
use plotters::style::RGBColor;
use polars::prelude::*;
use std::fs;
use std::path::PathBuf;

/// Fixed padding the renderer keeps around every map.
const PADDING: u32 = 10;
/// Rough height of a grid panel title; samples sit well inside each county.
const TITLE_HEIGHT: u32 = 34;

fn square(x: f64, y: f64) -> MultiPolygon<f64> {
    MultiPolygon::new(vec![polygon![
        (x: x, y: y),
        (x: x + 1.0, y: y),
        (x: x + 1.0, y: y + 1.0),
        (x: x, y: y + 1.0),
    ]])
}

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "food_access_maps_{}_{}",
        std::process::id(),
        name
    ));
    fs::create_dir_all(&dir).expect("create scratch dir");
    dir
}

fn rgb(color: RGBColor) -> [u8; 3] {
    let RGBColor(r, g, b) = color;
    [r, g, b]
}

/// Pixel under the lon/lat point, for a map fitted to `size` at `origin`.
fn pixel_at(
    img: &RgbImage,
    geometry: &[MultiPolygon<f64>],
    origin: (u32, u32),
    size: (u32, u32),
    point: (f64, f64),
) -> [u8; 3] {
    let projection = MapProjection::fit(geometry, size, PADDING).expect("fit projection");
    let (px, py) = projection.point(point.0, point.1);
    img.get_pixel(origin.0 + px as u32, origin.1 + py as u32).0
}

/// Five tracts in three counties plus one tract missing from the CSV.
///
/// | tract | county   | pop  | area  | lapophalf | lapop10 |
/// |-------|----------|------|-------|-----------|---------|
/// | 1     | Adams    | 1000 | urban | 500       | 0       |
/// | 2     | Adams    | 2000 | rural | 700       | 0       |
/// | 3     | Whitman  | 1000 | rural | 300       | 900     |
/// | 4     | Garfield | 0    | rural | 0         | 0       |
/// | 5     | -        | -    | -     | -         | -       |
fn joined_tracts() -> GeoFrame {
    let mut shapes = TractShapes::default();
    shapes.push("53001950100", square(-118.0, 46.0));
    shapes.push("53001950200", square(-117.0, 46.0));
    shapes.push("53075000100", square(-118.0, 47.0));
    shapes.push("53023970100", square(-117.0, 47.0));
    shapes.push("53099999999", square(-119.0, 47.0));

    let table = df!(
        "CensusTract" => &[53001950100i64, 53001950200, 53075000100, 53023970100],
        "State" => &["WA", "WA", "WA", "WA"],
        "County" => &["Adams", "Adams", "Whitman", "Garfield"],
        "POP2010" => &[1000i64, 2000, 1000, 0],
        "Urban" => &[1i64, 0, 0, 0],
        "Rural" => &[0i64, 1, 1, 1],
        "lapophalf" => &[500.0, 700.0, 300.0, 0.0],
        "lapop10" => &[0.0, 0.0, 900.0, 0.0],
        "lalowihalf" => &[100.0, 200.0, 0.0, 0.0],
        "lalowi10" => &[0.0, 0.0, 50.0, 0.0],
    )
    .expect("build food access table");

    join_tracts(shapes, &table, "CTIDFP00", "CensusTract").expect("join tracts")
}

#[test]
fn test_join_dissolve_and_coverage() {
    let columns = Columns::default();
    let tracts = joined_tracts();

    assert_eq!(tracts.height(), 5);
    assert_eq!(tracts.f64_values("POP2010").unwrap()[4], None);

    let coverage = AccessCalculator::coverage_percentage(&tracts, &columns, "WA").unwrap();
    assert_eq!(coverage, 75.0);

    let counties = DataProcessor::county_food_access(&tracts, &columns).unwrap();
    assert_eq!(
        counties.str_values("County").unwrap(),
        vec![
            Some("Adams".to_string()),
            Some("Garfield".to_string()),
            Some("Whitman".to_string())
        ]
    );

    let tract_total: f64 = tracts.f64_values("POP2010").unwrap().into_iter().flatten().sum();
    let county_total: f64 = counties.f64_values("POP2010").unwrap().into_iter().flatten().sum();
    assert_eq!(tract_total, county_total);

    let half = counties.f64_values("lapophalf_ratio").unwrap();
    assert_eq!(half[0], Some(1200.0 / 3000.0));
    assert!(half[1].is_some_and(f64::is_nan));
    assert_eq!(half[2], Some(300.0 / 1000.0));

    let ten = counties.f64_values("lapop10_ratio").unwrap();
    assert_eq!(ten[0], Some(0.0));
    assert_eq!(ten[2], Some(900.0 / 1000.0));

    assert_eq!(counties.geometry[0].0.len(), 2);
    assert_eq!(counties.geometry[1].0.len(), 1);
    assert_eq!(counties.geometry[2].0.len(), 1);
}

#[test]
fn test_plain_map_has_requested_size() {
    let dir = scratch_dir("plain");
    let path = dir.join("map.png");

    StaticMapRenderer::plot_map(&joined_tracts(), &path, (320, 240)).unwrap();

    let img = image::open(&path).expect("read rendered map");
    assert_eq!((img.width(), img.height()), (320, 240));
    fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_population_map_colors_tracts_by_population() {
    let columns = Columns::default();
    let tracts = joined_tracts();
    let dir = scratch_dir("population");
    let path = dir.join("population.png");
    let size = (600, 400);

    StaticMapRenderer::plot_population_map(&tracts, &columns, &path, size).unwrap();

    let img = image::open(&path).expect("read rendered map").to_rgb8();
    assert_eq!(img.dimensions(), size);

    let map_size = (size.0 - LEGEND_WIDTH as u32, size.1);
    let at = |x, y| pixel_at(&img, &tracts.geometry, (0, 0), map_size, (x, y));
    // Scale runs from 0 to 2000 people.
    assert_eq!(at(-116.5, 46.5), rgb(VIRIDIS[4]));
    assert_eq!(at(-117.5, 46.5), rgb(VIRIDIS[2]));
    assert_eq!(at(-116.5, 47.5), rgb(VIRIDIS[0]));
    // Not in the CSV, so no population.
    assert_eq!(at(-118.5, 47.5), rgb(MISSING_GREY));

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_county_population_map_colors_dissolved_counties() {
    let columns = Columns::default();
    let tracts = joined_tracts();
    let dir = scratch_dir("county_population");
    let path = dir.join("county_population.png");
    let size = (600, 400);

    StaticMapRenderer::plot_population_county_map(&tracts, &columns, &path, size).unwrap();

    let img = image::open(&path).expect("read rendered map").to_rgb8();
    assert_eq!(img.dimensions(), size);

    let counties = DataProcessor::dissolve_sum(&tracts, columns.county, columns.population).unwrap();
    let map_size = (size.0 - LEGEND_WIDTH as u32, size.1);
    let at = |x, y| pixel_at(&img, &counties.geometry, (0, 0), map_size, (x, y));
    // Adams holds 3000 people across both of its tracts.
    assert_eq!(at(-117.5, 46.5), rgb(VIRIDIS[4]));
    assert_eq!(at(-116.5, 46.5), rgb(VIRIDIS[4]));
    assert_eq!(at(-116.5, 47.5), rgb(VIRIDIS[0]));

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_food_access_grid_shares_unit_scale() {
    let columns = Columns::default();
    let tracts = joined_tracts();
    let dir = scratch_dir("grid");
    let path = dir.join("county_food_access.png");
    let size = (1200, 800);

    StaticMapRenderer::plot_food_access_by_county(&tracts, &columns, &path, size).unwrap();

    let img = image::open(&path).expect("read rendered map").to_rgb8();
    assert_eq!(img.dimensions(), size);

    let counties = DataProcessor::county_food_access(&tracts, &columns).unwrap();
    let (panel_w, panel_h) = (size.0 / 2, size.1 / 2);
    let map_size = (panel_w - LEGEND_WIDTH as u32, panel_h - TITLE_HEIGHT);
    let at = |col: u32, row: u32, x, y| {
        let origin = (col * panel_w, row * panel_h + TITLE_HEIGHT);
        pixel_at(&img, &counties.geometry, origin, map_size, (x, y))
    };

    // Top left, lapophalf: Garfield has no population.
    assert_eq!(at(0, 0, -116.5, 47.5), rgb(MISSING_GREY));
    // Top right, lalowihalf: Whitman has none of its 1000 people counted.
    assert_eq!(at(1, 0, -117.5, 47.5), rgb(VIRIDIS[0]));
    // Bottom left, lapop10: Adams is at zero.
    assert_eq!(at(0, 1, -117.5, 46.5), rgb(VIRIDIS[0]));
    // Bottom right, lalowi10: Adams at zero, Garfield still missing.
    assert_eq!(at(1, 1, -116.5, 46.5), rgb(VIRIDIS[0]));
    assert_eq!(at(1, 1, -116.5, 47.5), rgb(MISSING_GREY));

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_low_access_layers() {
    let columns = Columns::default();
    let tracts = joined_tracts();
    let dir = scratch_dir("overlay");
    let path = dir.join("low_access.png");
    let size = (400, 300);

    StaticMapRenderer::plot_low_access_tracts(&tracts, &columns, &path, size).unwrap();

    let img = image::open(&path).expect("read rendered map").to_rgb8();
    let at = |x, y| pixel_at(&img, &tracts.geometry, (0, 0), size, (x, y));

    // Urban tract with 500 people beyond half a mile.
    assert_eq!(at(-117.5, 46.5), [31, 119, 180]);
    // Rural tract with 700 people beyond half a mile and none beyond ten.
    assert_eq!(at(-116.5, 46.5), [18, 78, 150]);
    // Rural tract with 300 of 1000 beyond half a mile: has data but is not
    // low access, even with 900 people beyond ten miles.
    assert_eq!(at(-117.5, 47.5), [0xAA, 0xAA, 0xAA]);
    // No access data at all.
    assert_eq!(at(-116.5, 47.5), [0xEE, 0xEE, 0xEE]);
    // Not in the CSV.
    assert_eq!(at(-118.5, 47.5), [0xEE, 0xEE, 0xEE]);

    fs::remove_dir_all(&dir).ok();
}
