use super::{common_geometry_type, features_extent, AttributeValue, Feature, FeatureProvider};
use crate::error::ProviderError;
use gdal::spatial_ref::SpatialRef;
use gdal::vector::{FieldValue, Geometry, LayerAccess};
use gdal::Dataset;
use hgis_types::{Crs, Point2d, Rect};
use std::path::{Path, PathBuf};

/// Provider reading the first layer of any data source supported by OGR.
///
/// All features are read into memory on [`FeatureProvider::open`] and the dataset is closed right
/// after, so the provider can be shared between threads.
#[derive(Debug)]
pub struct GdalProvider {
    path: PathBuf,
    uri: String,
    layer_name: String,
    data: Option<GdalData>,
    error_message: String,
}

#[derive(Debug)]
struct GdalData {
    features: Vec<Feature>,
    fields: Vec<String>,
    geometry_type: String,
    epsg: u32,
    wkt: Option<String>,
    extent: Option<Rect>,
}

impl GdalProvider {
    /// Creates a provider for the file. The file is not read until the provider is opened.
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

    fn load(&self) -> Result<(String, GdalData), ProviderError> {
        if !self.path.exists() {
            return Err(ProviderError::NotFound(self.path.clone()));
        }

        let dataset = Dataset::open(&self.path).map_err(|err| ProviderError::Io(err.to_string()))?;
        let mut layer = dataset
            .layer(0)
            .map_err(|err| ProviderError::Parse(err.to_string()))?;

        let layer_name = layer.name();
        let fields: Vec<String> = layer.defn().fields().map(|field| field.name()).collect();
        let (epsg, wkt) = layer
            .spatial_ref()
            .map(|mut srs| crs_identity(&mut srs))
            .unwrap_or((0, None));

        let features: Vec<Feature> = layer
            .features()
            .enumerate()
            .map(|(index, feature)| convert_feature(index, &feature))
            .collect();

        let geometry_type = common_geometry_type(&features);
        let extent = features_extent(&features);

        Ok((
            layer_name,
            GdalData {
                features,
                fields,
                geometry_type,
                epsg,
                wkt,
                extent,
            },
        ))
    }
}

impl FeatureProvider for GdalProvider {
    fn uri(&self) -> &str {
        &self.uri
    }

    fn open(&mut self) -> Result<(), ProviderError> {
        match self.load() {
            Ok((layer_name, data)) => {
                log::debug!(
                    "Opened {} with OGR: layer {layer_name}, {} features",
                    self.uri,
                    data.features.len()
                );
                if !layer_name.is_empty() {
                    self.layer_name = layer_name;
                }
                self.data = Some(data);
                self.error_message.clear();
                Ok(())
            }
            Err(err) => {
                log::warn!("Failed to open {} with OGR: {err}", self.uri);
                self.data = None;
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
        self.data.as_ref().map_or(0, |d| d.features.len())
    }

    fn fields(&self) -> Vec<String> {
        self.data
            .as_ref()
            .map(|d| d.fields.clone())
            .unwrap_or_default()
    }

    fn geometry_type(&self) -> String {
        self.data
            .as_ref()
            .map(|d| d.geometry_type.clone())
            .unwrap_or_else(|| "Unknown".to_string())
    }

    fn extent(&self) -> Option<Rect> {
        self.data.as_ref().and_then(|d| d.extent)
    }

    fn crs_wkt(&self) -> Option<String> {
        let data = self.data.as_ref()?;
        data.wkt.clone().or_else(|| {
            Crs::from_epsg(data.epsg)
                .ok()
                .map(|crs| crs.to_wkt().to_string())
        })
    }

    fn epsg_code(&self) -> u32 {
        self.data.as_ref().map_or(0, |d| d.epsg)
    }

    fn read_features(&self) -> Vec<Feature> {
        self.data
            .as_ref()
            .map(|d| d.features.clone())
            .unwrap_or_default()
    }

    fn error_message(&self) -> String {
        self.error_message.clone()
    }

    fn reopen(&self) -> Result<Box<dyn FeatureProvider>, ProviderError> {
        let mut provider = GdalProvider::new(&self.path);
        provider.open()?;
        Ok(Box::new(provider))
    }
}

/// EPSG code and WKT of the layer CRS. The code is 0 if OGR cannot match the CRS to an EPSG entry.
fn crs_identity(srs: &mut SpatialRef) -> (u32, Option<String>) {
    if srs.auth_code().is_err() {
        if let Err(err) = srs.auto_identify_epsg() {
            log::debug!("Layer CRS has no EPSG match: {err}");
        }
    }

    let epsg = match (srs.auth_name(), srs.auth_code()) {
        (Ok(name), Ok(code)) if name.eq_ignore_ascii_case("EPSG") => {
            u32::try_from(code).unwrap_or(0)
        }
        _ => 0,
    };

    (epsg, srs.to_wkt().ok())
}

fn convert_feature(index: usize, feature: &gdal::vector::Feature) -> Feature {
    let id = feature
        .fid()
        .and_then(|fid| i64::try_from(fid).ok())
        .unwrap_or(index as i64);

    let (geometry_type, geometry) = feature
        .geometry()
        .map(convert_geometry)
        .unwrap_or_default();

    let mut result = Feature::new(id, geometry_type, geometry);
    for (name, value) in feature.fields() {
        result.attributes.insert(name, convert_value(value));
    }

    result
}

fn convert_value(value: Option<FieldValue>) -> AttributeValue {
    match value {
        None => AttributeValue::Null,
        Some(FieldValue::IntegerValue(v)) => AttributeValue::Integer(v.into()),
        Some(FieldValue::Integer64Value(v)) => AttributeValue::Integer(v),
        Some(FieldValue::RealValue(v)) => AttributeValue::Real(v),
        Some(FieldValue::StringValue(v)) => AttributeValue::Text(v),
        Some(other) => other
            .into_string()
            .map(AttributeValue::Text)
            .unwrap_or(AttributeValue::Null),
    }
}

fn vertices(geometry: &Geometry) -> Vec<Point2d> {
    geometry
        .get_point_vec()
        .into_iter()
        .map(|(x, y, _)| Point2d::new(x, y))
        .collect()
}

fn first_part(geometry: &Geometry) -> Vec<Point2d> {
    if geometry.geometry_count() == 0 {
        return vec![];
    }
    vertices(&geometry.get_geometry(0))
}

/// Multi-geometries keep all points of a multipoint, the first line of a multiline and the outer
/// ring of the first polygon.
fn convert_geometry(geometry: &Geometry) -> (String, Vec<Point2d>) {
    let name = geometry.geometry_name().to_ascii_uppercase();
    match name.as_str() {
        "POINT" => ("Point".into(), vertices(geometry)),
        "LINESTRING" | "LINEARRING" => ("LineString".into(), vertices(geometry)),
        "POLYGON" => ("Polygon".into(), first_part(geometry)),
        "MULTIPOINT" => (
            "MultiPoint".into(),
            (0..geometry.geometry_count())
                .flat_map(|i| vertices(&geometry.get_geometry(i)))
                .collect(),
        ),
        "MULTILINESTRING" => ("MultiLineString".into(), first_part(geometry)),
        "MULTIPOLYGON" => {
            let points = if geometry.geometry_count() == 0 {
                vec![]
            } else {
                first_part(&geometry.get_geometry(0))
            };
            ("MultiPolygon".into(), points)
        }
        "GEOMETRYCOLLECTION" => {
            let points = if geometry.geometry_count() == 0 {
                vec![]
            } else {
                convert_geometry(&geometry.get_geometry(0)).1
            };
            ("GeometryCollection".into(), points)
        }
        other => {
            log::debug!("Unsupported OGR geometry {other}");
            (String::new(), vec![])
        }
    }
}
