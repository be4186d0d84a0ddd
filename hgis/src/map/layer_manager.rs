use crate::layer::{LayerEvent, LayerType, MapLayer, VectorLayer};
use crate::render::TransformCache;
use crate::signal::{Signal, SubscriptionId};
use hgis_types::{Crs, Rect};
use std::sync::Arc;

/// Change notification emitted by the [`LayerManager`].
#[derive(Debug, Clone, PartialEq)]
pub enum LayerManagerEvent {
    /// A layer with the given id was added.
    LayerAdded(String),
    /// The layer with the given id was removed.
    LayerRemoved(String),
    /// The set of layers or the data of a layer changed.
    LayersChanged,
    /// The order of layers changed.
    LayerOrderChanged,
    /// The map should be drawn again.
    RepaintRequested,
    /// The project CRS changed.
    ProjectCrsChanged,
}

struct LayerEntry {
    layer: Box<dyn MapLayer>,
    subscription: SubscriptionId,
}

/// Ordered collection of the layers of a project.
///
/// Layer at index `0` is the topmost one: it is drawn last and covers the layers below it. New
/// layers are added to the top. The manager owns its layers; removing a layer drops it.
///
/// The manager listens to the events of its layers and translates them into its own
/// [`LayerManagerEvent`]s: repaint and extent changes of any layer become
/// [`LayerManagerEvent::RepaintRequested`], data changes become
/// [`LayerManagerEvent::LayersChanged`].
///
/// ```
/// use hgis::layer::{MapLayer, VectorLayer};
/// use hgis::map::LayerManager;
///
/// let mut manager = LayerManager::new();
/// let bottom = VectorLayer::new("bottom");
/// let bottom_id = bottom.id().to_string();
/// manager.add_layer(Box::new(bottom));
/// manager.add_layer(Box::new(VectorLayer::new("top")));
///
/// assert_eq!(manager.layer_at(0).map(|l| l.name()), Some("top"));
/// assert_eq!(manager.layers_in_render_order()[0].id(), bottom_id);
/// ```
pub struct LayerManager {
    entries: Vec<LayerEntry>,
    project_crs: Crs,
    signal: Arc<Signal<LayerManagerEvent>>,
    transforms: TransformCache,
}

impl LayerManager {
    /// Creates an empty manager with WGS84 as project CRS.
    pub fn new() -> Self {
        log::debug!("Layer manager initialized");
        Self {
            entries: Vec::new(),
            project_crs: Crs::wgs84(),
            signal: Arc::new(Signal::new()),
            transforms: TransformCache::default(),
        }
    }

    /// Signal notifying about changes of the layer collection.
    pub fn signal(&self) -> &Signal<LayerManagerEvent> {
        &self.signal
    }

    fn emit(&self, event: LayerManagerEvent) {
        self.signal.emit(&event);
    }

    fn connect(&self, layer: &dyn MapLayer) -> SubscriptionId {
        let signal = self.signal.clone();
        layer.signal().subscribe(move |event| match event {
            LayerEvent::RepaintRequested | LayerEvent::ExtentChanged => {
                signal.emit(&LayerManagerEvent::RepaintRequested)
            }
            LayerEvent::DataChanged => signal.emit(&LayerManagerEvent::LayersChanged),
            _ => {}
        })
    }

    fn disconnect(entry: &LayerEntry) {
        entry.layer.signal().unsubscribe(entry.subscription);
    }

    /// Adds the layer to the top. Returns false if a layer with the same id is already in the
    /// manager.
    pub fn add_layer(&mut self, layer: Box<dyn MapLayer>) -> bool {
        self.insert_layer(layer, 0)
    }

    /// Inserts the layer at the given position, `0` being the top. The index is clamped to the
    /// number of layers. Returns false if a layer with the same id is already in the manager.
    pub fn insert_layer(&mut self, layer: Box<dyn MapLayer>, index: usize) -> bool {
        if self.layer_index(layer.id()).is_some() {
            log::warn!("Layer {} ({}) is already added", layer.name(), layer.id());
            return false;
        }

        let id = layer.id().to_string();
        log::info!(
            "Layer added: {} ({})",
            layer.name(),
            layer.type_as_string()
        );

        let subscription = self.connect(layer.as_ref());
        let index = index.min(self.entries.len());
        self.entries.insert(
            index,
            LayerEntry {
                layer,
                subscription,
            },
        );

        self.emit(LayerManagerEvent::LayerAdded(id));
        self.emit(LayerManagerEvent::LayersChanged);
        self.emit(LayerManagerEvent::RepaintRequested);
        true
    }

    /// Removes the layer and drops it. Returns false if there is no layer with this id.
    pub fn remove_layer(&mut self, id: &str) -> bool {
        self.take_layer(id).is_some()
    }

    /// Removes the layer and returns it to the caller.
    pub fn take_layer(&mut self, id: &str) -> Option<Box<dyn MapLayer>> {
        let index = self.layer_index(id)?;
        let entry = self.entries.remove(index);
        Self::disconnect(&entry);

        self.emit(LayerManagerEvent::LayerRemoved(id.to_string()));
        self.emit(LayerManagerEvent::LayersChanged);
        self.emit(LayerManagerEvent::RepaintRequested);
        Some(entry.layer)
    }

    /// Removes and drops all layers.
    pub fn remove_all_layers(&mut self) {
        for entry in self.entries.drain(..) {
            Self::disconnect(&entry);
        }

        self.emit(LayerManagerEvent::LayersChanged);
        self.emit(LayerManagerEvent::RepaintRequested);
    }

    /// Layer with the given id.
    pub fn layer(&self, id: &str) -> Option<&dyn MapLayer> {
        self.entries
            .iter()
            .find(|entry| entry.layer.id() == id)
            .map(|entry| entry.layer.as_ref())
    }

    /// Layer with the given id.
    pub fn layer_mut(&mut self, id: &str) -> Option<&mut dyn MapLayer> {
        let entry = self
            .entries
            .iter_mut()
            .find(|entry| entry.layer.id() == id)?;
        let layer: &mut dyn MapLayer = entry.layer.as_mut();
        Some(layer)
    }

    /// First layer with the given name.
    pub fn layer_by_name(&self, name: &str) -> Option<&dyn MapLayer> {
        self.entries
            .iter()
            .find(|entry| entry.layer.name() == name)
            .map(|entry| entry.layer.as_ref())
    }

    /// Layer at the given position.
    pub fn layer_at(&self, index: usize) -> Option<&dyn MapLayer> {
        self.entries.get(index).map(|entry| entry.layer.as_ref())
    }

    /// Vector layer with the given id. Returns `None` if the layer is of another type.
    pub fn vector_layer(&self, id: &str) -> Option<&VectorLayer> {
        let layer = self.layer(id)?;
        if layer.layer_type() != LayerType::Vector {
            return None;
        }
        layer.as_any().downcast_ref()
    }

    /// Vector layer with the given id. Returns `None` if the layer is of another type.
    pub fn vector_layer_mut(&mut self, id: &str) -> Option<&mut VectorLayer> {
        let entry = self
            .entries
            .iter_mut()
            .find(|entry| entry.layer.id() == id)?;
        if entry.layer.layer_type() != LayerType::Vector {
            return None;
        }
        entry.layer.as_any_mut().downcast_mut()
    }

    /// All vector layers, top to bottom.
    pub fn vector_layers(&self) -> Vec<&VectorLayer> {
        self.entries
            .iter()
            .filter(|entry| entry.layer.layer_type() == LayerType::Vector)
            .filter_map(|entry| entry.layer.as_any().downcast_ref())
            .collect()
    }

    /// All layers, top to bottom.
    pub fn layers(&self) -> Vec<&dyn MapLayer> {
        self.entries
            .iter()
            .map(|entry| entry.layer.as_ref())
            .collect()
    }

    /// All layers in drawing order: bottom to top.
    pub fn layers_in_render_order(&self) -> Vec<&dyn MapLayer> {
        self.entries
            .iter()
            .rev()
            .map(|entry| entry.layer.as_ref())
            .collect()
    }

    /// Number of layers.
    pub fn count(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no layers.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Position of the layer, `0` being the top.
    pub fn layer_index(&self, id: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|entry| entry.layer.id() == id)
    }

    /// Moves the layer to the given position. The index is clamped to the last position.
    /// Returns false if there is no layer with this id.
    pub fn move_layer(&mut self, id: &str, index: usize) -> bool {
        let Some(current) = self.layer_index(id) else {
            return false;
        };

        let index = index.min(self.entries.len() - 1);
        if current == index {
            return true;
        }

        let entry = self.entries.remove(current);
        self.entries.insert(index, entry);

        self.emit(LayerManagerEvent::LayerOrderChanged);
        self.emit(LayerManagerEvent::RepaintRequested);
        true
    }

    /// Moves the layer one position up. Returns false if the layer is already at the top or does
    /// not exist.
    pub fn move_layer_up(&mut self, id: &str) -> bool {
        match self.layer_index(id) {
            Some(index) if index > 0 => self.move_layer(id, index - 1),
            _ => false,
        }
    }

    /// Moves the layer one position down. Returns false if the layer is already at the bottom or
    /// does not exist.
    pub fn move_layer_down(&mut self, id: &str) -> bool {
        match self.layer_index(id) {
            Some(index) if index + 1 < self.entries.len() => self.move_layer(id, index + 1),
            _ => false,
        }
    }

    /// Moves the layer to the top.
    pub fn move_layer_to_top(&mut self, id: &str) -> bool {
        self.move_layer(id, 0)
    }

    /// Moves the layer to the bottom.
    pub fn move_layer_to_bottom(&mut self, id: &str) -> bool {
        let last = self.entries.len().saturating_sub(1);
        self.move_layer(id, last)
    }

    /// Shows or hides all layers.
    pub fn set_all_layers_visible(&mut self, visible: bool) {
        for entry in &mut self.entries {
            entry.layer.set_visible(visible);
        }
    }

    /// Visible layers, top to bottom.
    pub fn visible_layers(&self) -> Vec<&dyn MapLayer> {
        self.entries
            .iter()
            .filter(|entry| entry.layer.is_visible())
            .map(|entry| entry.layer.as_ref())
            .collect()
    }

    /// Union of the extents of all valid layers in the project CRS, or `None` if no layer has an
    /// extent.
    pub fn full_extent(&self) -> Option<Rect> {
        self.extent_of(|_| true)
    }

    /// Union of the extents of visible valid layers in the project CRS.
    pub fn visible_extent(&self) -> Option<Rect> {
        self.extent_of(|layer| layer.is_visible())
    }

    fn extent_of(&self, filter: impl Fn(&dyn MapLayer) -> bool) -> Option<Rect> {
        self.entries
            .iter()
            .map(|entry| entry.layer.as_ref())
            .filter(|layer| layer.is_valid() && filter(*layer))
            .filter_map(|layer| self.layer_extent_in_project_crs(layer))
            .reduce(|acc, extent| acc.merge(extent))
    }

    /// Extent of the layer converted into the project CRS.
    pub fn layer_extent_in_project_crs(&self, layer: &dyn MapLayer) -> Option<Rect> {
        let extent = layer.extent()?;
        let crs = layer.crs();
        if !crs.is_valid() || !self.project_crs.is_valid() || *crs == self.project_crs {
            return Some(extent);
        }

        Some(
            self.transforms
                .get(crs, &self.project_crs)
                .transform_bounding_box(&extent),
        )
    }

    /// CRS the map is displayed in.
    pub fn project_crs(&self) -> &Crs {
        &self.project_crs
    }

    /// Sets the CRS the map is displayed in.
    pub fn set_project_crs(&mut self, crs: Crs) {
        if self.project_crs == crs {
            return;
        }

        log::info!("Project CRS set to {crs}");
        self.project_crs = crs;
        self.emit(LayerManagerEvent::ProjectCrsChanged);
        self.emit(LayerManagerEvent::RepaintRequested);
    }

    /// Cache of transformations used to bring layers into the project CRS.
    pub fn transforms(&self) -> &TransformCache {
        &self.transforms
    }
}

impl Default for LayerManager {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for LayerManager {
    fn drop(&mut self) {
        for entry in &self.entries {
            Self::disconnect(entry);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layer::LayerProperties;
    use crate::render::Painter;
    use approx::assert_abs_diff_eq;
    use parking_lot::Mutex;
    use std::any::Any;

    struct TestLayer {
        properties: LayerProperties,
        extent: Option<Rect>,
    }

    impl TestLayer {
        fn new(name: &str, extent: Option<Rect>, crs: Crs) -> Box<dyn MapLayer> {
            let mut properties = LayerProperties::new(LayerType::Annotation, name, "");
            properties.set_crs(crs);
            Box::new(Self { properties, extent })
        }
    }

    impl MapLayer for TestLayer {
        fn properties(&self) -> &LayerProperties {
            &self.properties
        }

        fn properties_mut(&mut self) -> &mut LayerProperties {
            &mut self.properties
        }

        fn extent(&self) -> Option<Rect> {
            self.extent
        }

        fn render(&self, _painter: &mut dyn Painter, _extent: &Rect, _scale: f64) {}

        fn clone_layer(&self) -> Box<dyn MapLayer> {
            TestLayer::new(self.name(), self.extent, self.crs().clone())
        }

        fn as_any(&self) -> &dyn Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    fn layer(name: &str) -> Box<dyn MapLayer> {
        TestLayer::new(name, None, Crs::wgs84())
    }

    fn record(manager: &LayerManager) -> Arc<Mutex<Vec<LayerManagerEvent>>> {
        let events = Arc::new(Mutex::new(vec![]));
        let sink = events.clone();
        manager
            .signal()
            .subscribe(move |event| sink.lock().push(event.clone()));
        events
    }

    fn names(layers: Vec<&dyn MapLayer>) -> Vec<&str> {
        layers.into_iter().map(|l| l.name()).collect()
    }

    #[test]
    fn layer_order() {
        let mut manager = LayerManager::new();
        assert!(manager.is_empty());
        manager.add_layer(layer("L1"));
        manager.add_layer(layer("L2"));
        manager.add_layer(layer("L3"));

        assert_eq!(manager.count(), 3);
        assert_eq!(names(manager.layers()), vec!["L3", "L2", "L1"]);
        assert_eq!(
            names(manager.layers_in_render_order()),
            vec!["L1", "L2", "L3"]
        );
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let mut manager = LayerManager::new();
        let first = layer("L1");
        let id = first.id().to_string();
        assert!(manager.add_layer(first));

        let duplicate = Box::new(TestLayer {
            properties: LayerProperties::with_id(LayerType::Annotation, &id, "L1 copy"),
            extent: None,
        });
        assert!(!manager.add_layer(duplicate));
        assert_eq!(manager.count(), 1);
        assert_eq!(manager.layer(&id).unwrap().name(), "L1");
    }

    #[test]
    fn insert_clamps_index() {
        let mut manager = LayerManager::new();
        manager.add_layer(layer("A"));
        manager.insert_layer(layer("B"), 10);
        manager.insert_layer(layer("C"), 1);
        assert_eq!(names(manager.layers()), vec!["A", "C", "B"]);
    }

    #[test]
    fn remove_layers() {
        let mut manager = LayerManager::new();
        manager.add_layer(layer("A"));
        let b = layer("B");
        let b_id = b.id().to_string();
        manager.add_layer(b);
        let events = record(&manager);

        assert!(!manager.remove_layer("unknown"));
        assert!(events.lock().is_empty());

        assert!(manager.remove_layer(&b_id));
        assert!(manager.layer(&b_id).is_none());
        assert_eq!(
            *events.lock(),
            vec![
                LayerManagerEvent::LayerRemoved(b_id.clone()),
                LayerManagerEvent::LayersChanged,
                LayerManagerEvent::RepaintRequested,
            ]
        );

        manager.remove_all_layers();
        assert!(manager.is_empty());
    }

    #[test]
    fn removed_layer_is_disconnected() {
        let mut manager = LayerManager::new();
        let a = layer("A");
        let id = a.id().to_string();
        manager.add_layer(a);
        assert_eq!(manager.layer(&id).unwrap().signal().handler_count(), 1);

        let events = record(&manager);
        manager.layer_mut(&id).unwrap().set_visible(false);
        assert_eq!(*events.lock(), vec![LayerManagerEvent::RepaintRequested]);

        let mut taken = manager.take_layer(&id).unwrap();
        assert_eq!(taken.signal().handler_count(), 0);

        events.lock().clear();
        taken.set_visible(true);
        assert!(events.lock().is_empty());
    }

    #[test]
    fn lookups() {
        let mut manager = LayerManager::new();
        let vector = VectorLayer::new("sites");
        let vector_id = vector.id().to_string();
        manager.add_layer(Box::new(vector));
        let other = layer("notes");
        let other_id = other.id().to_string();
        manager.add_layer(other);

        assert_eq!(manager.layer_by_name("sites").unwrap().id(), vector_id);
        assert_eq!(manager.layer_at(0).unwrap().id(), other_id);
        assert!(manager.layer_at(2).is_none());
        assert_eq!(manager.layer_index(&vector_id), Some(1));

        assert!(manager.vector_layer(&vector_id).is_some());
        assert!(manager.vector_layer(&other_id).is_none());
        assert!(manager.vector_layer_mut(&vector_id).is_some());
        assert_eq!(manager.vector_layers().len(), 1);
    }

    #[test]
    fn moving_layers() {
        let mut manager = LayerManager::new();
        let ids: Vec<String> = ["A", "B", "C"]
            .iter()
            .map(|name| {
                let l = layer(name);
                let id = l.id().to_string();
                manager.insert_layer(l, usize::MAX);
                id
            })
            .collect();
        assert_eq!(names(manager.layers()), vec!["A", "B", "C"]);

        let events = record(&manager);
        assert!(manager.move_layer(&ids[0], 0));
        assert!(events.lock().is_empty());

        assert!(manager.move_layer(&ids[0], 100));
        assert_eq!(names(manager.layers()), vec!["B", "C", "A"]);
        assert_eq!(
            *events.lock(),
            vec![
                LayerManagerEvent::LayerOrderChanged,
                LayerManagerEvent::RepaintRequested
            ]
        );

        assert!(!manager.move_layer_up(&ids[1]));
        assert!(!manager.move_layer_down(&ids[0]));
        assert!(manager.move_layer_up(&ids[0]));
        assert_eq!(names(manager.layers()), vec!["B", "A", "C"]);
        assert!(manager.move_layer_down(&ids[1]));
        assert_eq!(names(manager.layers()), vec!["A", "B", "C"]);

        assert!(manager.move_layer_to_bottom(&ids[0]));
        assert!(manager.move_layer_to_top(&ids[2]));
        assert_eq!(names(manager.layers()), vec!["C", "B", "A"]);
        assert!(!manager.move_layer("unknown", 0));
    }

    #[test]
    fn visibility() {
        let mut manager = LayerManager::new();
        manager.add_layer(layer("A"));
        manager.add_layer(layer("B"));

        manager.set_all_layers_visible(false);
        assert!(manager.visible_layers().is_empty());
        manager.set_all_layers_visible(true);
        assert_eq!(manager.visible_layers().len(), 2);
    }

    #[test]
    fn extents() {
        let mut manager = LayerManager::new();
        assert!(manager.full_extent().is_none());

        manager.add_layer(TestLayer::new(
            "a",
            Some(Rect::new(126.0, 37.0, 127.0, 38.0)),
            Crs::wgs84(),
        ));
        let b = TestLayer::new(
            "b",
            Some(Rect::new(127.5, 36.0, 128.0, 37.5)),
            Crs::wgs84(),
        );
        let b_id = b.id().to_string();
        manager.add_layer(b);
        manager.add_layer(layer("no extent"));

        assert_eq!(
            manager.full_extent(),
            Some(Rect::new(126.0, 36.0, 128.0, 38.0))
        );

        manager.layer_mut(&b_id).unwrap().set_visible(false);
        assert_eq!(
            manager.visible_extent(),
            Some(Rect::new(126.0, 37.0, 127.0, 38.0))
        );
        assert_eq!(
            manager.full_extent(),
            Some(Rect::new(126.0, 36.0, 128.0, 38.0))
        );
    }

    #[test]
    fn extents_are_reprojected() {
        let mut manager = LayerManager::new();
        manager.set_project_crs(Crs::korea_2000_central_belt());
        manager.add_layer(TestLayer::new(
            "wgs84",
            Some(Rect::new(126.99, 37.99, 127.01, 38.01)),
            Crs::wgs84(),
        ));

        let extent = manager.full_extent().unwrap();
        assert!(extent.contains(&hgis_types::Point2d::new(200_000.0, 600_000.0)));
        assert_abs_diff_eq!(extent.center().x, 200_000.0, epsilon = 50.0);
        assert_abs_diff_eq!(extent.center().y, 600_000.0, epsilon = 50.0);
    }

    #[test]
    fn vector_layer_in_pre_2010_belt_is_reprojected() {
        use crate::layer::VectorLayer;
        use crate::provider::{Feature, MemoryProvider};
        use hgis_types::Point2d;

        let provider = MemoryProvider::new(
            "kakao_sites",
            "Point",
            5181,
            vec![
                Feature::new(1, "Point", vec![Point2d::new(199_000.0, 451_000.0)]),
                Feature::new(2, "Point", vec![Point2d::new(201_000.0, 453_000.0)]),
            ],
        );
        let layer = VectorLayer::with_provider("sites", Box::new(provider));
        assert!(layer.crs().is_valid());
        assert_eq!(layer.crs().epsg_code(), 5181);

        let mut manager = LayerManager::new();
        manager.set_project_crs(Crs::korea_2000_central_belt());
        manager.add_layer(Box::new(layer));

        let extent = manager.full_extent().unwrap();
        assert_abs_diff_eq!(extent.x_min(), 199_000.0, epsilon = 0.1);
        assert_abs_diff_eq!(extent.y_min(), 551_000.0, epsilon = 0.1);
        assert_abs_diff_eq!(extent.x_max(), 201_000.0, epsilon = 0.1);
        assert_abs_diff_eq!(extent.y_max(), 553_000.0, epsilon = 0.1);
    }

    #[test]
    fn project_crs() {
        let mut manager = LayerManager::new();
        assert_eq!(manager.project_crs(), &Crs::wgs84());

        let events = record(&manager);
        manager.set_project_crs(Crs::wgs84());
        assert!(events.lock().is_empty());

        manager.set_project_crs(Crs::korea_2000_unified());
        assert_eq!(manager.project_crs().epsg_code(), 5179);
        assert_eq!(
            *events.lock(),
            vec![
                LayerManagerEvent::ProjectCrsChanged,
                LayerManagerEvent::RepaintRequested
            ]
        );
    }

    #[test]
    fn add_emits_events() {
        let mut manager = LayerManager::new();
        let events = record(&manager);
        let a = layer("A");
        let id = a.id().to_string();
        manager.add_layer(a);

        assert_eq!(
            *events.lock(),
            vec![
                LayerManagerEvent::LayerAdded(id),
                LayerManagerEvent::LayersChanged,
                LayerManagerEvent::RepaintRequested,
            ]
        );
    }
}
