//! Feature data sources.
//!
//! A [`FeatureProvider`] gives a vector layer access to the features of one data source. Providers
//! for files are created by [`open_provider`], which picks a driver by the file extension.
//! GeoJSON files are supported out of the box. With the `gdal` feature, shapefile, GeoPackage,
//! KML, GML, SQLite and MapInfo files are read through OGR. Drivers for other formats can be added
//! by the application with [`register_driver`].

use crate::error::ProviderError;
use hgis_types::Rect;
use lazy_static::lazy_static;
use parking_lot::RwLock;
use std::path::Path;
use std::sync::Arc;

mod feature;
#[cfg(feature = "gdal")]
mod gdal;
mod geojson;
mod memory;

pub use feature::{AttributeValue, Feature, FeatureId};
#[cfg(feature = "gdal")]
pub use self::gdal::GdalProvider;
pub use self::geojson::GeoJsonProvider;
pub use memory::MemoryProvider;

/// File extensions of the vector formats the application works with.
pub const SUPPORTED_EXTENSIONS: [&str; 8] =
    ["shp", "gpkg", "geojson", "json", "kml", "gml", "sqlite", "tab"];

/// Access to the features of a single data source.
pub trait FeatureProvider: Send + Sync {
    /// Location of the data source.
    fn uri(&self) -> &str;
    /// Opens the data source. Reopening an open provider reloads its data.
    fn open(&mut self) -> Result<(), ProviderError>;
    /// Closes the data source and releases its data.
    fn close(&mut self);
    /// Returns true if the data source is open.
    fn is_valid(&self) -> bool;
    /// Name of the data layer inside the data source.
    fn layer_name(&self) -> &str;
    /// Number of features.
    fn feature_count(&self) -> usize;
    /// Names of the attribute fields.
    fn fields(&self) -> Vec<String>;
    /// Geometry type name of the data layer, e.g. `Point`, `MultiPolygon` or `Unknown`.
    fn geometry_type(&self) -> &str;
    /// Bounding rectangle of all features, or `None` if there are no features with geometry.
    fn extent(&self) -> Option<Rect>;
    /// WKT of the coordinate reference system of the data source, if it is known.
    fn crs_wkt(&self) -> Option<String>;
    /// EPSG code of the coordinate reference system, or `0` if unknown.
    fn epsg_code(&self) -> u32;
    /// Reads all features.
    fn read_features(&self) -> Vec<Feature>;
    /// Message of the last error, or empty string.
    fn error_message(&self) -> &str;
    /// Creates and opens a new provider for the same data source.
    fn reopen(&self) -> Result<Box<dyn FeatureProvider>, ProviderError>;

    /// Reads features whose geometry bounding box intersects `bounds`. Features without
    /// geometry are skipped.
    fn read_features_in(&self, bounds: &Rect) -> Vec<Feature> {
        self.read_features()
            .into_iter()
            .filter(|feature| {
                feature
                    .bounding_rect()
                    .is_some_and(|rect| rect.intersects(bounds))
            })
            .collect()
    }
}

/// Function creating an unopened provider for a file.
pub type ProviderFactory = Arc<dyn Fn(&Path) -> Box<dyn FeatureProvider> + Send + Sync>;

struct Driver {
    name: String,
    extensions: Vec<String>,
    factory: ProviderFactory,
}

lazy_static! {
    static ref DRIVERS: RwLock<Vec<Driver>> = RwLock::new(builtin_drivers());
}

fn builtin_drivers() -> Vec<Driver> {
    log::debug!("Registering built-in feature drivers");
    #[allow(unused_mut)]
    let mut drivers = vec![Driver {
        name: "GeoJSON".to_string(),
        extensions: vec!["geojson".to_string(), "json".to_string()],
        factory: Arc::new(|path| Box::new(GeoJsonProvider::new(path))),
    }];

    #[cfg(feature = "gdal")]
    drivers.push(Driver {
        name: "OGR".to_string(),
        extensions: ["shp", "gpkg", "kml", "gml", "sqlite", "tab"]
            .iter()
            .map(|ext| ext.to_string())
            .collect(),
        factory: Arc::new(|path| Box::new(GdalProvider::new(path))),
    });

    drivers
}

/// Registers built-in drivers if that has not been done yet. Calling this more than once has no
/// effect.
pub fn ensure_drivers_registered() {
    lazy_static::initialize(&DRIVERS);
}

/// Registers a driver for the given file extensions. Drivers registered later take precedence
/// over earlier ones for the same extension.
pub fn register_driver(
    name: &str,
    extensions: &[&str],
    factory: impl Fn(&Path) -> Box<dyn FeatureProvider> + Send + Sync + 'static,
) {
    log::info!("Registering feature driver {name} for {extensions:?}");
    DRIVERS.write().push(Driver {
        name: name.to_string(),
        extensions: extensions.iter().map(|e| e.to_ascii_lowercase()).collect(),
        factory: Arc::new(factory),
    });
}

/// Names of the registered drivers.
pub fn driver_names() -> Vec<String> {
    DRIVERS.read().iter().map(|d| d.name.clone()).collect()
}

/// File dialog filters of the supported formats: `*.shp`, `*.gpkg` and so on.
pub fn supported_formats() -> Vec<String> {
    SUPPORTED_EXTENSIONS
        .iter()
        .map(|ext| format!("*.{ext}"))
        .collect()
}

/// Geometry type shared by all features with geometry, or `Unknown` if there are none or the
/// types are mixed.
fn common_geometry_type(features: &[Feature]) -> String {
    let mut types = features
        .iter()
        .map(|feature| feature.geometry_type.as_str())
        .filter(|name| !name.is_empty());

    match types.next() {
        Some(first) if types.all(|name| name == first) => first.to_string(),
        _ => "Unknown".to_string(),
    }
}

fn features_extent(features: &[Feature]) -> Option<Rect> {
    features
        .iter()
        .filter_map(|feature| feature.bounding_rect())
        .reduce(|acc, rect| acc.merge(rect))
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
}

/// Returns true if the file has the extension of one of the supported formats. The content of the
/// file is not checked.
pub fn is_supported(path: impl AsRef<Path>) -> bool {
    extension(path.as_ref()).is_some_and(|ext| SUPPORTED_EXTENSIONS.contains(&ext.as_str()))
}

/// Creates and opens a provider for the file.
pub fn open_provider(path: impl AsRef<Path>) -> Result<Box<dyn FeatureProvider>, ProviderError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(ProviderError::NotFound(path.to_path_buf()));
    }

    let ext = extension(path).unwrap_or_default();
    if !SUPPORTED_EXTENSIONS.contains(&ext.as_str()) {
        return Err(ProviderError::UnsupportedFormat(ext));
    }

    let factory = DRIVERS
        .read()
        .iter()
        .rev()
        .find(|driver| driver.extensions.contains(&ext))
        .map(|driver| driver.factory.clone())
        .ok_or_else(|| ProviderError::DriverUnavailable(ext.clone()))?;

    let mut provider = factory(path);
    provider.open()?;
    Ok(provider)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::io::Write;

    // `assert_matches!` needs `Debug` on the matched value.
    impl std::fmt::Debug for dyn FeatureProvider {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("FeatureProvider")
                .field("uri", &self.uri())
                .finish()
        }
    }

    #[test]
    fn supported_extensions() {
        assert!(is_supported("heritage.shp"));
        assert!(is_supported("/data/Sites.GeoJSON"));
        assert!(is_supported("a.b.gpkg"));
        assert!(!is_supported("image.tif"));
        assert!(!is_supported("noextension"));
        assert_eq!(supported_formats().len(), SUPPORTED_EXTENSIONS.len());
        assert!(supported_formats().contains(&"*.kml".to_string()));
    }

    #[test]
    fn open_errors() {
        assert_matches!(
            open_provider("/nonexistent/sites.geojson"),
            Err(ProviderError::NotFound(_))
        );

        let dir = tempfile::tempdir().unwrap();
        let tif = dir.path().join("ortho.tif");
        std::fs::File::create(&tif).unwrap();
        assert_matches!(
            open_provider(&tif),
            Err(ProviderError::UnsupportedFormat(ext)) if ext == "tif"
        );

        let kml = dir.path().join("sites.kml");
        std::fs::File::create(&kml).unwrap();
        #[cfg(not(feature = "gdal"))]
        assert_matches!(
            open_provider(&kml),
            Err(ProviderError::DriverUnavailable(ext)) if ext == "kml"
        );
        #[cfg(feature = "gdal")]
        assert!(open_provider(&kml).is_err());
    }

    #[test]
    fn registered_driver_is_used() {
        register_driver("Test GML", &["GML"], |path| {
            Box::new(MemoryProvider::new(
                path.to_string_lossy().as_ref(),
                "Point",
                4326,
                vec![Feature::new(1, "Point", vec![hgis_types::Point2d::new(1.0, 2.0)])],
            ))
        });
        assert!(driver_names().contains(&"Test GML".to_string()));

        let dir = tempfile::tempdir().unwrap();
        let gml = dir.path().join("sites.gml");
        std::fs::File::create(&gml).unwrap();

        let provider = open_provider(&gml).unwrap();
        assert!(provider.is_valid());
        assert_eq!(provider.feature_count(), 1);
    }

    #[test]
    fn opens_geojson() {
        let mut file = tempfile::Builder::new()
            .suffix(".geojson")
            .tempfile()
            .unwrap();
        write!(
            file,
            r#"{{"type":"FeatureCollection","features":[{{"type":"Feature","properties":{{}},"geometry":{{"type":"Point","coordinates":[127.0,37.5]}}}}]}}"#
        )
        .unwrap();

        let provider = open_provider(file.path()).unwrap();
        assert!(provider.is_valid());
        assert_eq!(provider.feature_count(), 1);
        assert_eq!(provider.epsg_code(), 4326);
    }
}
