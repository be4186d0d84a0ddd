//! [Layers](MapLayer) bind a data source to the way its data is drawn on the map.
//!
//! Every layer carries a set of common [`LayerProperties`] (id, name, CRS, visibility, opacity,
//! scale range) and a [`Signal`] notifying about their changes. The only concrete layer type at
//! the moment is [`VectorLayer`].

use crate::render::Painter;
use crate::signal::Signal;
use hgis_types::{Crs, Rect};
use lazy_static::lazy_static;
use regex::Regex;
use std::any::Any;
use std::fmt::{Display, Formatter};

pub mod vector_layer;

pub use vector_layer::VectorLayer;

/// Kind of a layer.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub enum LayerType {
    /// Vector features.
    #[default]
    Vector,
    /// Raster image.
    Raster,
    /// Layer provided by a plugin.
    Plugin,
    /// Mesh data.
    Mesh,
    /// Vector tiles.
    VectorTile,
    /// Annotations.
    Annotation,
    /// Point cloud.
    PointCloud,
    /// Group of other layers.
    Group,
}

impl LayerType {
    /// Identifier of the layer type.
    pub fn as_str(&self) -> &'static str {
        match self {
            LayerType::Vector => "vector",
            LayerType::Raster => "raster",
            LayerType::Plugin => "plugin",
            LayerType::Mesh => "mesh",
            LayerType::VectorTile => "vector-tile",
            LayerType::Annotation => "annotation",
            LayerType::PointCloud => "point-cloud",
            LayerType::Group => "group",
        }
    }

    /// Name of the layer type as shown in the user interface.
    pub fn display_name(&self) -> &'static str {
        match self {
            LayerType::Vector => "벡터",
            LayerType::Raster => "래스터",
            LayerType::Plugin => "플러그인",
            LayerType::Mesh => "메시",
            LayerType::VectorTile => "벡터타일",
            LayerType::Annotation => "주석",
            LayerType::PointCloud => "포인트클라우드",
            LayerType::Group => "그룹",
        }
    }
}

impl Display for LayerType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Change notification emitted by a layer.
#[derive(Debug, Clone, PartialEq)]
pub enum LayerEvent {
    /// The name of the layer changed.
    NameChanged,
    /// The CRS of the layer changed.
    CrsChanged,
    /// The visibility of the layer changed.
    VisibilityChanged(bool),
    /// The opacity of the layer changed.
    OpacityChanged(u8),
    /// The extent of the layer data changed.
    ExtentChanged,
    /// The data of the layer was (re)loaded.
    DataChanged,
    /// The layer should be drawn again.
    RepaintRequested,
    /// The set of selected features changed. Contains the ids of selected features in ascending
    /// order.
    SelectionChanged(Vec<i64>),
    /// The symbol of the layer changed.
    SymbolChanged,
    /// The label configuration changed.
    LabelsChanged,
}

lazy_static! {
    static ref ID_FORBIDDEN_CHARS: Regex =
        Regex::new("[^a-zA-Z0-9_]").expect("Layer id pattern must be valid");
}

/// Generates a layer id from the layer name: every character other than ASCII letters, digits and
/// underscore is replaced by `_` and a random 8-digit hex suffix is appended.
pub fn generate_layer_id(name: &str) -> String {
    let base = if name.is_empty() { "layer" } else { name };
    let base = ID_FORBIDDEN_CHARS.replace_all(base, "_");
    let uuid = uuid::Uuid::new_v4().simple().to_string();
    format!("{base}_{}", &uuid[..8])
}

/// Properties shared by all layer types.
///
/// Setters emit the corresponding [`LayerEvent`] through [`LayerProperties::signal`] only when the
/// value actually changes.
#[derive(Debug)]
pub struct LayerProperties {
    id: String,
    name: String,
    source: String,
    layer_type: LayerType,
    crs: Crs,
    visible: bool,
    opacity: u8,
    minimum_scale: f64,
    maximum_scale: f64,
    abstract_text: String,
    attribution: String,
    signal: Signal<LayerEvent>,
}

impl LayerProperties {
    /// Creates properties of a new layer with a generated id.
    pub fn new(layer_type: LayerType, name: &str, source: &str) -> Self {
        let id = generate_layer_id(name);
        log::debug!("Created {layer_type} layer {name:?} with id {id}");

        Self {
            id,
            name: name.to_string(),
            source: source.to_string(),
            layer_type,
            crs: Crs::default(),
            visible: true,
            opacity: 100,
            minimum_scale: 0.0,
            maximum_scale: 0.0,
            abstract_text: String::new(),
            attribution: String::new(),
            signal: Signal::new(),
        }
    }

    #[cfg(test)]
    pub(crate) fn with_id(layer_type: LayerType, id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            ..Self::new(layer_type, name, "")
        }
    }

    /// Unique id of the layer.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Name of the layer.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Sets the name of the layer.
    pub fn set_name(&mut self, name: &str) {
        if self.name != name {
            self.name = name.to_string();
            self.signal.emit(&LayerEvent::NameChanged);
        }
    }

    /// Location of the layer data.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Sets the location of the layer data.
    pub fn set_source(&mut self, source: &str) {
        self.source = source.to_string();
    }

    /// Type of the layer.
    pub fn layer_type(&self) -> LayerType {
        self.layer_type
    }

    /// CRS of the layer data.
    pub fn crs(&self) -> &Crs {
        &self.crs
    }

    /// Sets the CRS of the layer data.
    pub fn set_crs(&mut self, crs: Crs) {
        if self.crs != crs {
            self.crs = crs;
            self.signal.emit(&LayerEvent::CrsChanged);
        }
    }

    /// Returns true if the layer is drawn.
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Shows or hides the layer.
    pub fn set_visible(&mut self, visible: bool) {
        if self.visible != visible {
            self.visible = visible;
            self.signal.emit(&LayerEvent::VisibilityChanged(visible));
            self.signal.emit(&LayerEvent::RepaintRequested);
        }
    }

    /// Opacity of the layer in percent.
    pub fn opacity(&self) -> u8 {
        self.opacity
    }

    /// Sets the opacity in percent. Values outside of `[0; 100]` are clamped.
    pub fn set_opacity(&mut self, opacity: i32) {
        let opacity = opacity.clamp(0, 100) as u8;
        if self.opacity != opacity {
            self.opacity = opacity;
            self.signal.emit(&LayerEvent::OpacityChanged(opacity));
            self.signal.emit(&LayerEvent::RepaintRequested);
        }
    }

    /// Minimum scale at which the layer is drawn. `0` means no limit.
    pub fn minimum_scale(&self) -> f64 {
        self.minimum_scale
    }

    /// Sets the minimum scale.
    pub fn set_minimum_scale(&mut self, scale: f64) {
        self.minimum_scale = scale;
    }

    /// Maximum scale at which the layer is drawn. `0` means no limit.
    pub fn maximum_scale(&self) -> f64 {
        self.maximum_scale
    }

    /// Sets the maximum scale.
    pub fn set_maximum_scale(&mut self, scale: f64) {
        self.maximum_scale = scale;
    }

    /// Returns false if a non-zero minimum scale is greater than `scale`, or a non-zero maximum
    /// scale is less than `scale`.
    pub fn is_in_scale_range(&self, scale: f64) -> bool {
        if self.minimum_scale > 0.0 && scale < self.minimum_scale {
            return false;
        }
        if self.maximum_scale > 0.0 && scale > self.maximum_scale {
            return false;
        }
        true
    }

    /// Description of the layer.
    pub fn abstract_text(&self) -> &str {
        &self.abstract_text
    }

    /// Sets the description of the layer.
    pub fn set_abstract_text(&mut self, text: &str) {
        self.abstract_text = text.to_string();
    }

    /// Attribution of the layer data.
    pub fn attribution(&self) -> &str {
        &self.attribution
    }

    /// Sets the attribution of the layer data.
    pub fn set_attribution(&mut self, attribution: &str) {
        self.attribution = attribution.to_string();
    }

    /// Returns true if the layer has an id and a name.
    pub fn is_valid(&self) -> bool {
        !self.id.is_empty() && !self.name.is_empty()
    }

    /// Signal notifying about changes of the layer.
    pub fn signal(&self) -> &Signal<LayerEvent> {
        &self.signal
    }

    /// Emits an event through the layer signal.
    pub fn emit(&self, event: LayerEvent) {
        self.signal.emit(&event);
    }
}

/// Layer of the map.
///
/// Layers are stored by the [`LayerManager`](crate::map::LayerManager) as trait objects. Use
/// [`MapLayer::as_any`] to get the concrete type back.
pub trait MapLayer: Send + Sync {
    /// Common properties of the layer.
    fn properties(&self) -> &LayerProperties;
    /// Common properties of the layer.
    fn properties_mut(&mut self) -> &mut LayerProperties;
    /// Bounding rectangle of the layer data in the layer CRS.
    fn extent(&self) -> Option<Rect>;
    /// Draws the part of the layer inside `extent`. `scale` is the scale denominator of the map
    /// view.
    fn render(&self, painter: &mut dyn Painter, extent: &Rect, scale: f64);
    /// Creates an independent copy of the layer with a new id.
    fn clone_layer(&self) -> Box<dyn MapLayer>;
    /// Converts the trait object into the concrete type.
    fn as_any(&self) -> &dyn Any;
    /// Converts the trait object into the concrete type.
    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Returns true if the layer can be drawn.
    fn is_valid(&self) -> bool {
        self.properties().is_valid()
    }

    /// Unique id of the layer.
    fn id(&self) -> &str {
        self.properties().id()
    }

    /// Name of the layer.
    fn name(&self) -> &str {
        self.properties().name()
    }

    /// Type of the layer.
    fn layer_type(&self) -> LayerType {
        self.properties().layer_type()
    }

    /// Name of the layer type as shown in the user interface.
    fn type_as_string(&self) -> &'static str {
        self.layer_type().display_name()
    }

    /// CRS of the layer data.
    fn crs(&self) -> &Crs {
        self.properties().crs()
    }

    /// Returns true if the layer is drawn.
    fn is_visible(&self) -> bool {
        self.properties().is_visible()
    }

    /// Shows or hides the layer.
    fn set_visible(&mut self, visible: bool) {
        self.properties_mut().set_visible(visible)
    }

    /// Opacity of the layer in percent.
    fn opacity(&self) -> u8 {
        self.properties().opacity()
    }

    /// Returns true if the layer is drawn at the given scale denominator.
    fn is_in_scale_range(&self, scale: f64) -> bool {
        self.properties().is_in_scale_range(scale)
    }

    /// Signal notifying about changes of the layer.
    fn signal(&self) -> &Signal<LayerEvent> {
        self.properties().signal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    fn record_events(properties: &LayerProperties) -> Arc<Mutex<Vec<LayerEvent>>> {
        let events = Arc::new(Mutex::new(vec![]));
        let sink = events.clone();
        properties
            .signal()
            .subscribe(move |event| sink.lock().push(event.clone()));
        events
    }

    #[test]
    fn layer_ids() {
        let id = generate_layer_id("문화재 sites-2024");
        let (base, suffix) = id.rsplit_once('_').unwrap();
        assert_eq!(base, "____sites_2024");
        assert_eq!(suffix.len(), 8);
        assert!(suffix.chars().all(|c| c.is_ascii_hexdigit()));

        assert!(generate_layer_id("").starts_with("layer_"));
        assert!(generate_layer_id("경복궁").starts_with("____"));
        assert_ne!(generate_layer_id("a"), generate_layer_id("a"));
    }

    #[test]
    fn opacity_is_clamped() {
        let mut properties = LayerProperties::new(LayerType::Vector, "sites", "");
        let events = record_events(&properties);

        properties.set_opacity(150);
        assert_eq!(properties.opacity(), 100);
        assert!(events.lock().is_empty());

        properties.set_opacity(-20);
        assert_eq!(properties.opacity(), 0);
        assert_eq!(
            *events.lock(),
            vec![LayerEvent::OpacityChanged(0), LayerEvent::RepaintRequested]
        );
    }

    #[test]
    fn events_only_on_change() {
        let mut properties = LayerProperties::new(LayerType::Vector, "sites", "");
        let events = record_events(&properties);

        properties.set_visible(true);
        properties.set_name("sites");
        properties.set_crs(Crs::default());
        assert!(events.lock().is_empty());

        properties.set_visible(false);
        properties.set_name("palaces");
        properties.set_crs(Crs::wgs84());
        assert_eq!(
            *events.lock(),
            vec![
                LayerEvent::VisibilityChanged(false),
                LayerEvent::RepaintRequested,
                LayerEvent::NameChanged,
                LayerEvent::CrsChanged,
            ]
        );
    }

    #[test]
    fn scale_range() {
        let mut properties = LayerProperties::new(LayerType::Vector, "sites", "");
        assert!(properties.is_in_scale_range(1.0));
        assert!(properties.is_in_scale_range(1e9));

        properties.set_minimum_scale(1000.0);
        properties.set_maximum_scale(50000.0);
        assert!(!properties.is_in_scale_range(999.0));
        assert!(properties.is_in_scale_range(1000.0));
        assert!(properties.is_in_scale_range(50000.0));
        assert!(!properties.is_in_scale_range(50001.0));
    }

    #[test]
    fn validity_and_type_names() {
        let properties = LayerProperties::new(LayerType::Raster, "", "");
        assert!(!properties.is_valid());
        assert_eq!(properties.layer_type().display_name(), "래스터");
        assert_eq!(LayerType::PointCloud.to_string(), "point-cloud");
    }
}
