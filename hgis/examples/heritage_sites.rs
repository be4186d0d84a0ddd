//! This example loads a GeoJSON file with heritage sites, shows it in the Korea 2000 central belt
//! projection together with a survey line stored in memory, and draws the map with a recording
//! painter.
//!
//! Run with an optional path to a GeoJSON file:
//!
//! ```sh
//! cargo run --example heritage_sites -- path/to/sites.geojson
//! ```

use hgis::canvas::{InputEvent, MapCanvas};
use hgis::hgis_types::{Crs, Point2d, Size};
use hgis::layer::vector_layer::{PointShape, Symbol};
use hgis::layer::MapLayer;
use hgis::provider::{Feature, MemoryProvider};
use hgis::render::RecordingPainter;
use hgis::{Color, LayerManager, VectorLayer};
use log::{error, info};

const DEFAULT_DATA: &str = concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/examples/data/heritage_sites.geojson"
);

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_DATA.to_string());

    let mut sites = match VectorLayer::from_file(&path) {
        Ok(layer) => layer,
        Err(err) => {
            error!("Failed to load {path}: {err}");
            return;
        }
    };
    sites.set_symbol(Symbol {
        fill_color: Color::rgba(200, 40, 40, 200),
        point_shape: PointShape::Star,
        point_size: 6.0,
        ..Default::default()
    });
    sites.set_label_field("name");
    sites.set_labels_enabled(true);

    info!(
        "Layer '{}': {} {} features, fields {:?}",
        sites.name(),
        sites.feature_count(),
        sites.geometry_type().display_name(),
        sites.fields()
    );

    let mut manager = LayerManager::new();
    manager.set_project_crs(Crs::korea_2000_central_belt());
    manager.add_layer(Box::new(survey_line()));
    manager.add_layer(Box::new(sites));

    let mut canvas = MapCanvas::default();
    canvas.set_viewport_size(Size::new(1024.0, 768.0));
    canvas.zoom_to_full_extent(&manager);
    info!(
        "Full extent {:?}, scale 1:{:.0}",
        canvas.extent(),
        canvas.scale_denominator(manager.project_crs())
    );

    canvas.handle_input(
        &InputEvent::Scroll(1.0, Point2d::new(700.0, 500.0)),
        &manager,
    );

    let mut painter = RecordingPainter::new();
    canvas.render(&manager, &mut painter);
    info!(
        "Rendered {} shapes at scale 1:{:.0}",
        painter.drawing_count(),
        canvas.scale_denominator(manager.project_crs())
    );
}

fn survey_line() -> VectorLayer {
    let line = Feature::new(
        1,
        "LineString",
        vec![
            Point2d::new(198_000.0, 451_000.0),
            Point2d::new(199_500.0, 452_300.0),
            Point2d::new(201_200.0, 452_900.0),
        ],
    )
    .with_attribute("name", "시굴 조사선");

    let provider = MemoryProvider::new("survey", "LineString", 5186, vec![line]);
    VectorLayer::with_provider("조사선", Box::new(provider))
}
