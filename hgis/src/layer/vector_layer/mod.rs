//! Layer drawing features of a [`FeatureProvider`].

use crate::error::ProviderError;
use crate::layer::{LayerEvent, LayerProperties, LayerType, MapLayer};
use crate::provider::{open_provider, AttributeValue, Feature, FeatureId, FeatureProvider};
use crate::render::{Font, Painter, Pen};
use crate::Color;
use hgis_types::{Crs, Point2d, Rect};
use parking_lot::RwLock;
use std::any::Any;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::sync::Arc;

mod symbol;

pub use crate::render::PointShape;
pub use symbol::{GeometryType, LabelSettings, RendererType, Symbol};

/// Features read from the provider of a vector layer.
///
/// The cache is filled on the first call to [`VectorLayer::features`] and dropped as a whole every
/// time the layer data is (re)loaded.
#[derive(Debug, Clone, Default)]
pub enum FeatureCache {
    /// Features were not read yet.
    #[default]
    Empty,
    /// All features of the provider.
    Populated(Arc<Vec<Feature>>),
}

impl FeatureCache {
    /// Returns true if the cache holds features.
    pub fn is_populated(&self) -> bool {
        matches!(self, FeatureCache::Populated(_))
    }
}

/// Vector layer.
///
/// The layer owns a single feature provider. Without a provider (e.g. after a failed
/// [`VectorLayer::load_from_file`]) the layer is invalid and has no features.
pub struct VectorLayer {
    properties: LayerProperties,
    provider: Option<Box<dyn FeatureProvider>>,
    geometry_type: GeometryType,
    symbol: Symbol,
    renderer_type: RendererType,
    labels: LabelSettings,
    selected: BTreeSet<FeatureId>,
    cache: RwLock<FeatureCache>,
}

impl VectorLayer {
    /// Creates a layer without data.
    pub fn new(name: &str) -> Self {
        Self {
            properties: LayerProperties::new(LayerType::Vector, name, ""),
            provider: None,
            geometry_type: GeometryType::Unknown,
            symbol: Symbol::default(),
            renderer_type: RendererType::default(),
            labels: LabelSettings::default(),
            selected: BTreeSet::new(),
            cache: RwLock::new(FeatureCache::Empty),
        }
    }

    /// Creates a layer with the data of the file. The layer is named after the file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ProviderError> {
        let path = path.as_ref();
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mut layer = Self::new(&name);
        layer.load_from_file(path)?;
        Ok(layer)
    }

    /// Creates a layer with the data of an open provider. If `name` is empty, the layer name is
    /// taken from the provider.
    pub fn with_provider(name: &str, provider: Box<dyn FeatureProvider>) -> Self {
        let mut layer = Self::new(name);
        layer.properties.set_source(provider.uri());
        layer.bind_provider(provider);
        layer
    }

    /// Loads the data of the file, replacing the current data of the layer.
    ///
    /// On failure the layer is left without a provider: it is invalid and has no features.
    pub fn load_from_file(&mut self, path: impl AsRef<Path>) -> Result<(), ProviderError> {
        let path = path.as_ref();
        self.provider = None;
        self.geometry_type = GeometryType::Unknown;
        self.invalidate_cache();

        let provider = open_provider(path).inspect_err(|err| {
            log::warn!("Failed to open vector layer {}: {err}", path.display());
        })?;

        self.properties.set_source(&path.to_string_lossy());
        self.bind_provider(provider);
        Ok(())
    }

    fn bind_provider(&mut self, provider: Box<dyn FeatureProvider>) {
        if self.properties.name().is_empty() {
            let name = provider.layer_name().to_string();
            self.properties.set_name(&name);
        }

        let crs = match provider.epsg_code() {
            0 => provider
                .crs_wkt()
                .and_then(|wkt| Crs::from_wkt(&wkt).ok())
                .unwrap_or_default(),
            code => Crs::from_epsg(code).unwrap_or_default(),
        };
        self.properties.set_crs(crs);

        self.geometry_type = if provider.is_valid() {
            GeometryType::from_provider_name(provider.geometry_type())
        } else {
            GeometryType::Unknown
        };
        self.provider = Some(provider);
        self.invalidate_cache();

        log::info!(
            "Loaded vector layer {}: {} features, geometry type {:?}",
            self.name(),
            self.feature_count(),
            self.geometry_type
        );

        self.properties.emit(LayerEvent::DataChanged);
        self.properties.emit(LayerEvent::ExtentChanged);
    }

    fn invalidate_cache(&self) {
        *self.cache.write() = FeatureCache::Empty;
    }

    /// Provider of the layer data.
    pub fn provider(&self) -> Option<&dyn FeatureProvider> {
        self.provider.as_deref()
    }

    /// State of the feature cache.
    pub fn feature_cache(&self) -> FeatureCache {
        self.cache.read().clone()
    }

    /// Geometry type of the layer features.
    pub fn geometry_type(&self) -> GeometryType {
        self.geometry_type
    }

    /// Name of the geometry type as shown in the user interface.
    pub fn geometry_type_as_string(&self) -> &'static str {
        self.geometry_type.display_name()
    }

    /// Number of features, `0` without a provider.
    pub fn feature_count(&self) -> usize {
        self.provider
            .as_ref()
            .map(|p| p.feature_count())
            .unwrap_or(0)
    }

    /// Names of the attribute fields.
    pub fn fields(&self) -> Vec<String> {
        self.provider
            .as_ref()
            .map(|p| p.fields())
            .unwrap_or_default()
    }

    /// All features of the layer.
    pub fn features(&self) -> Vec<Feature> {
        self.cached_features()
            .map(|features| features.as_ref().clone())
            .unwrap_or_default()
    }

    fn cached_features(&self) -> Option<Arc<Vec<Feature>>> {
        let provider = self.provider.as_ref()?;
        if let FeatureCache::Populated(features) = &*self.cache.read() {
            return Some(features.clone());
        }

        let mut cache = self.cache.write();
        match &*cache {
            FeatureCache::Populated(features) => Some(features.clone()),
            FeatureCache::Empty => {
                let features = Arc::new(provider.read_features());
                *cache = FeatureCache::Populated(features.clone());
                Some(features)
            }
        }
    }

    /// Features intersecting the rectangle. Always queries the provider.
    pub fn features_in(&self, bounds: &Rect) -> Vec<Feature> {
        self.provider
            .as_ref()
            .map(|p| p.read_features_in(bounds))
            .unwrap_or_default()
    }

    /// Drawing style of the features.
    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    /// Sets the drawing style of the features.
    pub fn set_symbol(&mut self, symbol: Symbol) {
        self.symbol = symbol;
        self.properties.emit(LayerEvent::SymbolChanged);
        self.properties.emit(LayerEvent::RepaintRequested);
    }

    /// Classification of features for drawing.
    pub fn renderer_type(&self) -> RendererType {
        self.renderer_type
    }

    /// Sets the classification of features for drawing.
    pub fn set_renderer_type(&mut self, renderer_type: RendererType) {
        self.renderer_type = renderer_type;
        self.properties.emit(LayerEvent::RepaintRequested);
    }

    /// Label configuration.
    pub fn label_settings(&self) -> &LabelSettings {
        &self.labels
    }

    /// Returns true if labels are drawn.
    pub fn labels_enabled(&self) -> bool {
        self.labels.enabled
    }

    /// Turns labels on or off.
    pub fn set_labels_enabled(&mut self, enabled: bool) {
        if self.labels.enabled != enabled {
            self.labels.enabled = enabled;
            self.labels_changed();
        }
    }

    /// Attribute used as label text.
    pub fn label_field(&self) -> &str {
        &self.labels.field
    }

    /// Sets the attribute used as label text.
    pub fn set_label_field(&mut self, field: &str) {
        if self.labels.field != field {
            self.labels.field = field.to_string();
            self.labels_changed();
        }
    }

    /// Label font.
    pub fn label_font(&self) -> &Font {
        &self.labels.font
    }

    /// Sets the label font.
    pub fn set_label_font(&mut self, font: Font) {
        self.labels.font = font;
        self.labels_changed();
    }

    /// Label color.
    pub fn label_color(&self) -> Color {
        self.labels.color
    }

    /// Sets the label color.
    pub fn set_label_color(&mut self, color: Color) {
        self.labels.color = color;
        self.labels_changed();
    }

    fn labels_changed(&self) {
        self.properties.emit(LayerEvent::LabelsChanged);
        self.properties.emit(LayerEvent::RepaintRequested);
    }

    /// Ids of selected features.
    pub fn selected_feature_ids(&self) -> &BTreeSet<FeatureId> {
        &self.selected
    }

    /// Replaces the selection.
    pub fn select_features(&mut self, ids: impl IntoIterator<Item = FeatureId>) {
        self.selected = ids.into_iter().collect();
        self.selection_changed();
    }

    /// Adds a feature to the selection.
    pub fn select_feature(&mut self, id: FeatureId) {
        self.selected.insert(id);
        self.selection_changed();
    }

    /// Removes a feature from the selection.
    pub fn deselect_feature(&mut self, id: FeatureId) {
        self.selected.remove(&id);
        self.selection_changed();
    }

    /// Clears the selection.
    pub fn clear_selection(&mut self) {
        self.selected.clear();
        self.selection_changed();
    }

    /// Returns true if the feature is selected.
    pub fn is_feature_selected(&self, id: FeatureId) -> bool {
        self.selected.contains(&id)
    }

    fn selection_changed(&self) {
        let ids = self.selected.iter().copied().collect();
        self.properties.emit(LayerEvent::SelectionChanged(ids));
        self.properties.emit(LayerEvent::RepaintRequested);
    }

    /// Value of the attribute of the feature.
    pub fn attribute_value(&self, feature_id: FeatureId, field: &str) -> Option<AttributeValue> {
        self.cached_features()?
            .iter()
            .find(|f| f.id == feature_id)?
            .attribute(field)
            .cloned()
    }

    /// All attributes of the feature.
    pub fn attributes(&self, feature_id: FeatureId) -> Option<BTreeMap<String, AttributeValue>> {
        self.cached_features()?
            .iter()
            .find(|f| f.id == feature_id)
            .map(|f| f.attributes.clone())
    }

    fn numeric_values(&self, field: &str) -> Vec<f64> {
        self.cached_features()
            .map(|features| {
                features
                    .iter()
                    .filter_map(|f| f.attribute(field)?.as_f64())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Minimum numeric value of the attribute, or `None` if no feature has a numeric value.
    pub fn minimum_value(&self, field: &str) -> Option<f64> {
        self.numeric_values(field).into_iter().reduce(f64::min)
    }

    /// Maximum numeric value of the attribute, or `None` if no feature has a numeric value.
    pub fn maximum_value(&self, field: &str) -> Option<f64> {
        self.numeric_values(field).into_iter().reduce(f64::max)
    }

    /// Distinct non-null values of the attribute in the order of first appearance.
    pub fn unique_values(&self, field: &str) -> Vec<AttributeValue> {
        let mut values: Vec<AttributeValue> = vec![];
        let Some(features) = self.cached_features() else {
            return values;
        };

        for value in features.iter().filter_map(|f| f.attribute(field)) {
            if !value.is_null() && !values.contains(value) {
                values.push(value.clone());
            }
        }

        values
    }

    fn render_features(&self, painter: &mut dyn Painter, features: &[Feature]) {
        let highlighted = self.symbol.highlighted();
        for feature in features {
            let symbol = if self.is_feature_selected(feature.id) {
                &highlighted
            } else {
                &self.symbol
            };

            match self.geometry_type {
                GeometryType::Point | GeometryType::MultiPoint => {
                    for point in &feature.geometry {
                        draw_point_symbol(painter, *point, symbol);
                    }
                }
                GeometryType::LineString | GeometryType::MultiLineString => {
                    if feature.geometry.len() >= 2 {
                        painter.set_pen(symbol.pen());
                        painter.draw_path(&feature.geometry);
                    }
                }
                GeometryType::Polygon | GeometryType::MultiPolygon => {
                    if feature.geometry.len() >= 3 {
                        painter.set_pen(symbol.pen());
                        painter.set_brush(symbol.brush());
                        painter.draw_polygon(&feature.geometry);
                    }
                }
                GeometryType::Unknown => {}
            }
        }
    }

    fn render_labels(&self, painter: &mut dyn Painter, features: &[Feature]) {
        if self.labels.field.is_empty() {
            return;
        }

        painter.set_font(&self.labels.font);
        painter.set_pen(Pen::new(self.labels.color, 1.0));

        for feature in features {
            let Some(position) = self.label_position(feature) else {
                continue;
            };

            let text = feature
                .attribute(&self.labels.field)
                .map(|value| value.to_string())
                .unwrap_or_default();
            if text.is_empty() {
                continue;
            }

            painter.draw_text(position, &text);
        }
    }

    /// First vertex for point layers, mean of the vertices otherwise.
    fn label_position(&self, feature: &Feature) -> Option<Point2d> {
        let first = feature.geometry.first()?;
        if self.geometry_type.is_point() {
            return Some(*first);
        }

        let count = feature.geometry.len() as f64;
        let (sum_x, sum_y) = feature
            .geometry
            .iter()
            .fold((0.0, 0.0), |(x, y), p| (x + p.x, y + p.y));
        Some(Point2d::new(sum_x / count, sum_y / count))
    }
}

fn draw_point_symbol(painter: &mut dyn Painter, point: Point2d, symbol: &Symbol) {
    painter.set_pen(symbol.pen());
    painter.set_brush(symbol.brush());
    painter.draw_marker(point, symbol.point_shape, symbol.point_size);
}

impl MapLayer for VectorLayer {
    fn properties(&self) -> &LayerProperties {
        &self.properties
    }

    fn properties_mut(&mut self) -> &mut LayerProperties {
        &mut self.properties
    }

    fn extent(&self) -> Option<Rect> {
        self.provider.as_ref()?.extent()
    }

    fn render(&self, painter: &mut dyn Painter, extent: &Rect, scale: f64) {
        if !self.is_visible() || !self.is_valid() || !self.is_in_scale_range(scale) {
            return;
        }

        painter.save();
        painter.set_opacity(self.opacity() as f64 / 100.0);

        let features = self.features_in(extent);
        self.render_features(painter, &features);
        if self.labels.enabled {
            self.render_labels(painter, &features);
        }

        painter.restore();
    }

    fn clone_layer(&self) -> Box<dyn MapLayer> {
        let mut layer = VectorLayer::new(self.name());
        layer.properties.set_source(self.properties.source());
        layer.properties.set_crs(self.crs().clone());
        layer.properties.set_visible(self.is_visible());
        layer.properties.set_opacity(self.opacity() as i32);
        layer.symbol = self.symbol;
        layer.renderer_type = self.renderer_type;
        layer.labels = self.labels.clone();

        match &self.provider {
            Some(provider) => match provider.reopen() {
                Ok(provider) => layer.bind_provider(provider),
                Err(err) => log::warn!("Failed to reload data of layer {}: {err}", self.name()),
            },
            None if !self.properties.source().is_empty() => {
                // Errors are logged by the loader.
                let _ = layer.load_from_file(self.properties.source());
            }
            None => {}
        }

        Box::new(layer)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn is_valid(&self) -> bool {
        self.properties.is_valid() && self.provider.as_ref().is_some_and(|p| p.is_valid())
    }
}
