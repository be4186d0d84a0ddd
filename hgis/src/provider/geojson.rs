use super::{common_geometry_type, features_extent, AttributeValue, Feature, FeatureProvider};
use crate::error::ProviderError;
use geojson::{GeoJson, Value};
use hgis_types::{Crs, Point2d, Rect};
use std::path::{Path, PathBuf};

/// EPSG code assumed for GeoJSON files without a `crs` member.
const DEFAULT_EPSG: u32 = 4326;

/// Provider reading features from a GeoJSON file.
///
/// The whole file is loaded into memory on [`FeatureProvider::open`]. Coordinates are taken in the
/// CRS named by the legacy `crs` member of the file, or WGS84 if the file has none.
#[derive(Debug)]
pub struct GeoJsonProvider {
    path: PathBuf,
    uri: String,
    layer_name: String,
    data: Option<GeoJsonData>,
    error_message: String,
}

#[derive(Debug)]
struct GeoJsonData {
    features: Vec<Feature>,
    fields: Vec<String>,
    geometry_type: String,
    epsg: u32,
    extent: Option<Rect>,
}

impl GeoJsonProvider {
    /// Creates an unopened provider for the file.
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let layer_name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();

        Self {
            uri: path.to_string_lossy().into_owned(),
            path,
            layer_name,
            data: None,
            error_message: String::new(),
        }
    }

    /// Path of the file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<GeoJsonData, ProviderError> {
        if !self.path.exists() {
            return Err(ProviderError::NotFound(self.path.clone()));
        }

        let text =
            std::fs::read_to_string(&self.path).map_err(|err| ProviderError::Io(err.to_string()))?;
        parse(&text)
    }
}

fn parse(text: &str) -> Result<GeoJsonData, ProviderError> {
    let geojson = text
        .parse::<GeoJson>()
        .map_err(|err| ProviderError::Parse(err.to_string()))?;

    let (features, foreign_members) = match geojson {
        GeoJson::FeatureCollection(collection) => {
            (collection.features, collection.foreign_members)
        }
        GeoJson::Feature(feature) => (vec![feature], None),
        GeoJson::Geometry(geometry) => (
            vec![geojson::Feature {
                bbox: None,
                geometry: Some(geometry),
                id: None,
                properties: None,
                foreign_members: None,
            }],
            None,
        ),
    };

    let epsg = foreign_members
        .as_ref()
        .and_then(|members| members.get("crs"))
        .and_then(crs_member_epsg)
        .unwrap_or(DEFAULT_EPSG);

    let mut fields: Vec<String> = vec![];
    let features: Vec<Feature> = features
        .into_iter()
        .enumerate()
        .map(|(index, feature)| {
            let converted = convert_feature(index, feature);
            for name in converted.attributes.keys() {
                if !fields.contains(name) {
                    fields.push(name.clone());
                }
            }
            converted
        })
        .collect();

    let geometry_type = common_geometry_type(&features);
    let extent = features_extent(&features);

    Ok(GeoJsonData {
        features,
        fields,
        geometry_type,
        epsg,
        extent,
    })
}

fn convert_feature(index: usize, feature: geojson::Feature) -> Feature {
    let id = match &feature.id {
        Some(geojson::feature::Id::Number(n)) => n.as_i64(),
        Some(geojson::feature::Id::String(s)) => s.parse().ok(),
        None => None,
    }
    .unwrap_or(index as i64);

    let (geometry_type, geometry) = feature
        .geometry
        .as_ref()
        .map(|geometry| convert_geometry(&geometry.value))
        .unwrap_or_default();

    let mut result = Feature::new(id, geometry_type, geometry);
    if let Some(properties) = &feature.properties {
        for (name, value) in properties {
            result
                .attributes
                .insert(name.clone(), AttributeValue::from(value));
        }
    }

    result
}

fn to_point(position: &[f64]) -> Option<Point2d> {
    match position {
        [x, y, ..] => Some(Point2d::new(*x, *y)),
        _ => None,
    }
}

fn to_points(positions: &[Vec<f64>]) -> Vec<Point2d> {
    positions.iter().filter_map(|p| to_point(p)).collect()
}

/// Multi-geometries keep all points of a multipoint, the first line of a multiline and the outer
/// ring of the first polygon.
fn convert_geometry(value: &Value) -> (String, Vec<Point2d>) {
    match value {
        Value::Point(p) => ("Point".into(), to_point(p).into_iter().collect()),
        Value::MultiPoint(points) => ("MultiPoint".into(), to_points(points)),
        Value::LineString(line) => ("LineString".into(), to_points(line)),
        Value::MultiLineString(lines) => (
            "MultiLineString".into(),
            lines.first().map(|l| to_points(l)).unwrap_or_default(),
        ),
        Value::Polygon(rings) => (
            "Polygon".into(),
            rings.first().map(|r| to_points(r)).unwrap_or_default(),
        ),
        Value::MultiPolygon(polygons) => (
            "MultiPolygon".into(),
            polygons
                .first()
                .and_then(|rings| rings.first())
                .map(|r| to_points(r))
                .unwrap_or_default(),
        ),
        Value::GeometryCollection(geometries) => (
            "GeometryCollection".into(),
            geometries
                .first()
                .map(|g| convert_geometry(&g.value).1)
                .unwrap_or_default(),
        ),
    }
}

/// Reads the EPSG code from the legacy `{"type": "name", "properties": {"name": ...}}` member.
fn crs_member_epsg(crs: &serde_json::Value) -> Option<u32> {
    let name = crs.get("properties")?.get("name")?.as_str()?;
    if name.ends_with("CRS84") {
        return Some(4326);
    }

    let code = name
        .rsplit(':')
        .find(|part| !part.is_empty())?
        .trim()
        .parse()
        .ok()?;
    name.to_ascii_uppercase().contains("EPSG").then_some(code)
}

impl FeatureProvider for GeoJsonProvider {
    fn uri(&self) -> &str {
        &self.uri
    }

    fn open(&mut self) -> Result<(), ProviderError> {
        self.data = None;
        match self.load() {
            Ok(data) => {
                log::debug!(
                    "Opened GeoJSON {} with {} features",
                    self.uri,
                    data.features.len()
                );
                self.data = Some(data);
                self.error_message.clear();
                Ok(())
            }
            Err(err) => {
                log::warn!("Failed to open GeoJSON {}: {err}", self.uri);
                self.error_message = err.to_string();
                Err(err)
            }
        }
    }

    fn close(&mut self) {
        self.data = None;
    }

    fn is_valid(&self) -> bool {
        self.data.is_some()
    }

    fn layer_name(&self) -> &str {
        &self.layer_name
    }

    fn feature_count(&self) -> usize {
        self.data.as_ref().map(|d| d.features.len()).unwrap_or(0)
    }

    fn fields(&self) -> Vec<String> {
        self.data
            .as_ref()
            .map(|d| d.fields.clone())
            .unwrap_or_default()
    }

    fn geometry_type(&self) -> &str {
        self.data
            .as_ref()
            .map(|d| d.geometry_type.as_str())
            .unwrap_or("Unknown")
    }

    fn extent(&self) -> Option<Rect> {
        self.data.as_ref().and_then(|d| d.extent)
    }

    fn crs_wkt(&self) -> Option<String> {
        let crs = Crs::from_epsg(self.epsg_code()).ok()?;
        Some(crs.to_wkt().to_string())
    }

    fn epsg_code(&self) -> u32 {
        self.data.as_ref().map(|d| d.epsg).unwrap_or(0)
    }

    fn read_features(&self) -> Vec<Feature> {
        self.data
            .as_ref()
            .map(|d| d.features.clone())
            .unwrap_or_default()
    }

    fn error_message(&self) -> &str {
        &self.error_message
    }

    fn reopen(&self) -> Result<Box<dyn FeatureProvider>, ProviderError> {
        let mut provider = GeoJsonProvider::new(&self.path);
        provider.open()?;
        Ok(Box::new(provider))
    }
}
