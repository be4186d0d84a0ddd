//! Map canvas view model: converts between device and map coordinates, handles navigation input
//! and draws the layers of a [`LayerManager`] with a [`Painter`].

use crate::color::Color;
use crate::map::LayerManager;
use crate::messenger::Messenger;
use crate::render::{Painter, ReprojectingPainter};
use crate::signal::Signal;
use hgis_types::{Crs, Point2d, Rect, Size};
use log::debug;
use nalgebra::Matrix3;

mod config;
mod event;
mod view;

pub use config::CanvasConfig;
pub use event::{CanvasEvent, InputEvent, InteractionState, Key, Modifiers, MouseButton};
pub use view::CanvasView;

/// Size of a screen pixel in meters at 96 DPI.
const METERS_PER_PIXEL: f64 = 0.0254 / 96.0;

/// Interactive map view.
///
/// The canvas keeps the current [`CanvasView`] (center, scale, rotation, viewport size), reacts to
/// user input given with [`MapCanvas::handle_input`] and draws layers with
/// [`MapCanvas::render`]. Changes are announced through [`MapCanvas::signal`] and redraws are
/// requested from the host through a [`Messenger`].
///
/// ```
/// use hgis::canvas::MapCanvas;
/// use hgis_types::{Point2d, Rect, Size};
///
/// let mut canvas = MapCanvas::default();
/// canvas.set_viewport_size(Size::new(400.0, 200.0));
/// assert!(canvas.set_extent(Rect::new(0.0, 0.0, 100.0, 100.0)));
///
/// assert_eq!(canvas.scale(), 0.5);
/// assert_eq!(canvas.to_map_coordinates(Point2d::new(200.0, 100.0)), Point2d::new(50.0, 50.0));
/// ```
pub struct MapCanvas {
    view: CanvasView,
    requested_extent: Rect,
    config: CanvasConfig,
    state: InteractionState,
    background: Color,
    signal: Signal<CanvasEvent>,
    messenger: Option<Box<dyn Messenger>>,
}

impl Default for MapCanvas {
    fn default() -> Self {
        Self::new(CanvasConfig::default())
    }
}

impl MapCanvas {
    /// Creates a canvas showing the default extent of the configuration.
    ///
    /// Until the viewport size is set the canvas has no area. The default extent is fitted into
    /// the viewport the first time it gets a non-zero size.
    pub fn new(config: CanvasConfig) -> Self {
        let extent = config.default_extent();
        Self {
            view: CanvasView::new(extent.center(), 1.0),
            requested_extent: extent,
            config,
            state: InteractionState::Idle,
            background: Color::WHITE,
            signal: Signal::new(),
            messenger: None,
        }
    }

    /// Sets the messenger used to request redraws from the host window.
    pub fn set_messenger(&mut self, messenger: Option<impl Messenger + 'static>) {
        self.messenger = messenger.map(|m| Box::new(m) as Box<dyn Messenger>);
    }

    /// Signal notifying about changes of the view and rendering.
    pub fn signal(&self) -> &Signal<CanvasEvent> {
        &self.signal
    }

    /// Navigation configuration.
    pub fn config(&self) -> &CanvasConfig {
        &self.config
    }

    /// Replaces the navigation configuration. The current scale is clamped to the new range.
    pub fn set_config(&mut self, config: CanvasConfig) {
        self.config = config;
        let scale = self.config.clamp_scale(self.view.scale());
        self.apply_view(self.view.with_scale(scale));
    }

    /// Current view.
    pub fn view(&self) -> &CanvasView {
        &self.view
    }

    /// Current pointer interaction state.
    pub fn interaction_state(&self) -> InteractionState {
        self.state
    }

    /// Map area visible in the viewport.
    pub fn extent(&self) -> Rect {
        if self.view.size().is_zero() {
            return self.requested_extent;
        }

        self.view.extent()
    }

    /// Map coordinates of the viewport center.
    pub fn center(&self) -> Point2d {
        self.view.center()
    }

    /// Map units per device pixel.
    pub fn scale(&self) -> f64 {
        self.view.scale()
    }

    /// Rotation in degrees.
    pub fn rotation(&self) -> f64 {
        self.view.rotation()
    }

    /// Size of the viewport in pixels.
    pub fn viewport_size(&self) -> Size {
        self.view.size()
    }

    /// Background color of the canvas.
    pub fn canvas_color(&self) -> Color {
        self.background
    }

    /// Sets the background color of the canvas and requests a redraw.
    pub fn set_canvas_color(&mut self, color: Color) {
        if self.background != color {
            self.background = color;
            self.request_redraw();
        }
    }

    /// Matrix converting map coordinates into device pixels.
    pub fn map_to_device(&self) -> Matrix3<f64> {
        self.view.map_to_device()
    }

    /// Matrix converting device pixels into map coordinates.
    pub fn device_to_map(&self) -> Matrix3<f64> {
        self.view.device_to_map()
    }

    /// Converts a device pixel position into map coordinates.
    pub fn to_map_coordinates(&self, device_point: Point2d) -> Point2d {
        self.view.to_map(device_point)
    }

    /// Converts map coordinates into a device pixel position.
    pub fn to_canvas_coordinates(&self, map_point: Point2d) -> Point2d {
        self.view.to_device(map_point)
    }

    /// Scale of the map as a ratio of map distance to screen distance (the `n` in `1:n`),
    /// assuming 96 DPI. `crs` is the CRS of the map coordinates.
    pub fn scale_denominator(&self, crs: &Crs) -> f64 {
        self.view.scale() * crs.meters_per_unit() / METERS_PER_PIXEL
    }

    /// Shows `extent` in the viewport.
    ///
    /// The extent is fitted keeping the viewport aspect ratio, so the visible area can be larger
    /// than requested in one direction. Returns false if the rectangle is empty.
    pub fn set_extent(&mut self, extent: Rect) -> bool {
        if extent.is_empty() || !extent.is_finite() {
            debug!("Ignoring empty extent {extent:?}");
            return false;
        }

        self.requested_extent = extent;
        let fitted = self.view.fit(&extent);
        let scale = self.config.clamp_scale(fitted.scale());
        self.apply_view(fitted.with_scale(scale));
        true
    }

    /// Shows the full extent of the layers of the manager, with the configured margin around it.
    /// Does nothing if no layer has an extent.
    pub fn zoom_to_full_extent(&mut self, manager: &LayerManager) {
        let Some(extent) = manager.full_extent() else {
            debug!("No layer extent to zoom to");
            return;
        };

        let margin = self.config.full_extent_margin();
        let mut expanded = extent.expand_by_fraction(margin);
        if expanded.is_empty() {
            // Single point layers have zero-sized extent.
            expanded = Rect::from_center_size(
                extent.center(),
                expanded.width().max(self.scale() * 100.0),
                expanded.height().max(self.scale() * 100.0),
            );
        }

        self.set_extent(expanded);
    }

    /// Divides the scale by the zoom factor keeping the center.
    pub fn zoom_in(&mut self) {
        let factor = 1.0 / self.config.zoom_factor();
        self.zoom_by(factor, self.viewport_center());
    }

    /// Multiplies the scale by the zoom factor keeping the center.
    pub fn zoom_out(&mut self) {
        let factor = self.config.zoom_factor();
        self.zoom_by(factor, self.viewport_center());
    }

    /// Multiplies the scale by `factor`, keeping the map point under `device_point` in place.
    ///
    /// The resulting scale is clamped to the configured range. The anchor point stays in place
    /// for clamped scales too.
    pub fn zoom_by(&mut self, factor: f64, device_point: Point2d) {
        if !factor.is_finite() || factor <= 0.0 {
            return;
        }

        let scale = self.config.clamp_scale(self.view.scale() * factor);
        self.apply_view(self.view.zoom_around(scale, device_point));
    }

    /// Centers the view at the map point keeping the scale.
    pub fn pan_to_center(&mut self, point: Point2d) {
        self.apply_view(self.view.with_center(point));
    }

    /// Sets the scale in map units per pixel keeping the center. The scale is clamped to the
    /// configured range.
    pub fn set_scale(&mut self, scale: f64) {
        if !scale.is_finite() || scale <= 0.0 {
            return;
        }

        let scale = self.config.clamp_scale(scale);
        self.apply_view(self.view.with_scale(scale));
    }

    /// Sets the rotation in degrees around the viewport center.
    pub fn set_rotation(&mut self, rotation: f64) {
        if !rotation.is_finite() {
            return;
        }

        self.apply_view(self.view.with_rotation(rotation));
    }

    /// Sets the viewport size in pixels. Center and scale are kept.
    ///
    /// When the canvas gets a non-zero size for the first time, the last requested extent is
    /// fitted into the viewport.
    pub fn set_viewport_size(&mut self, size: Size) {
        let had_size = !self.view.size().is_zero();
        let view = self.view.with_size(size);
        if !had_size && !size.is_zero() {
            let fitted = view.fit(&self.requested_extent);
            let scale = self.config.clamp_scale(fitted.scale());
            self.apply_view(fitted.with_scale(scale));
        } else {
            self.apply_view(view);
        }
    }

    /// Asks the host to redraw the canvas.
    pub fn refresh(&self) {
        self.signal.emit(&CanvasEvent::RenderStarting);
        self.request_redraw();
        self.signal.emit(&CanvasEvent::RenderComplete);
    }

    /// Draws all layers of the manager.
    ///
    /// The painter is cleared with the background color and gets the map to device matrix as its
    /// world transform, so layers draw in map coordinates. Layers are drawn bottom to top. Layers
    /// with a valid CRS different from the project CRS are drawn through a reprojecting painter.
    pub fn render(&self, manager: &LayerManager, painter: &mut dyn Painter) {
        painter.clear(self.background);
        painter.save();
        painter.set_world_transform(self.view.map_to_device());

        let project_crs = manager.project_crs();
        let extent = self.extent();
        let scale = self.scale_denominator(project_crs);

        for layer in manager.layers_in_render_order() {
            let crs = layer.crs();
            if crs.is_valid() && project_crs.is_valid() && crs != project_crs {
                let transform = manager.transforms().get(crs, project_crs);
                let layer_extent = transform.transform_bounding_box_reverse(&extent);
                let mut reprojecting = ReprojectingPainter::new(painter, &transform);
                layer.render(&mut reprojecting, &layer_extent, scale);
            } else {
                layer.render(painter, &extent, scale);
            }
        }

        painter.restore();
    }

    /// Processes user input. Returns true if the event changed the state of the canvas.
    ///
    /// `manager` is used by the keyboard shortcut zooming to the full extent.
    pub fn handle_input(&mut self, event: &InputEvent, manager: &LayerManager) -> bool {
        match event {
            InputEvent::ButtonPressed(MouseButton::Left | MouseButton::Middle, position) => {
                self.state = InteractionState::Panning {
                    last_position: *position,
                };
                true
            }
            InputEvent::ButtonReleased(MouseButton::Left | MouseButton::Middle, _) => {
                let was_panning = self.state != InteractionState::Idle;
                self.state = InteractionState::Idle;
                was_panning
            }
            InputEvent::PointerMoved(position) => {
                let moved = match self.state {
                    InteractionState::Panning { last_position } => {
                        self.apply_view(self.view.translate_by_pixels(last_position, *position));
                        self.state = InteractionState::Panning {
                            last_position: *position,
                        };
                        true
                    }
                    InteractionState::Idle => false,
                };

                self.signal.emit(&CanvasEvent::XyCoordinates(
                    self.to_map_coordinates(*position),
                ));
                moved
            }
            InputEvent::Scroll(delta, position) => {
                if *delta == 0.0 {
                    return false;
                }

                let factor = if *delta > 0.0 {
                    1.0 / self.config.wheel_zoom_factor()
                } else {
                    self.config.wheel_zoom_factor()
                };
                self.zoom_by(factor, *position);
                true
            }
            InputEvent::DoubleClick(MouseButton::Left, position) => {
                self.pan_to_center(self.to_map_coordinates(*position));
                self.zoom_in();
                true
            }
            InputEvent::KeyPressed(key, modifiers) => self.handle_key(*key, *modifiers, manager),
            _ => false,
        }
    }

    fn handle_key(&mut self, key: Key, modifiers: Modifiers, manager: &LayerManager) -> bool {
        match key {
            Key::Plus | Key::Equals => {
                self.zoom_in();
                true
            }
            Key::Minus => {
                self.zoom_out();
                true
            }
            Key::Space => {
                self.zoom_to_full_extent(manager);
                true
            }
            Key::Char('r' | 'R') if modifiers.ctrl => {
                self.set_rotation(0.0);
                true
            }
            _ => false,
        }
    }

    fn viewport_center(&self) -> Point2d {
        let size = self.view.size();
        Point2d::new(size.half_width(), size.half_height())
    }

    fn request_redraw(&self) {
        if let Some(messenger) = &self.messenger {
            messenger.request_redraw();
        }
    }

    fn apply_view(&mut self, view: CanvasView) {
        let old = self.view;
        if old == view {
            return;
        }

        self.view = view;
        if !view.size().is_zero() {
            self.requested_extent = view.extent();
        }

        if old.scale() != view.scale() {
            self.signal.emit(&CanvasEvent::ScaleChanged(view.scale()));
        }
        if old.rotation() != view.rotation() {
            self.signal
                .emit(&CanvasEvent::RotationChanged(view.rotation()));
        }
        self.signal.emit(&CanvasEvent::ExtentChanged(self.extent()));
        self.request_redraw();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layer::vector_layer::{Symbol, VectorLayer};
    use crate::provider::{Feature, MemoryProvider};
    use crate::render::{PaintCommand, RecordingPainter};
    use approx::assert_abs_diff_eq;
    use assert_matches::assert_matches;
    use parking_lot::RwLock;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn canvas() -> MapCanvas {
        let mut canvas = MapCanvas::default();
        canvas.set_viewport_size(Size::new(200.0, 100.0));
        assert!(canvas.set_extent(Rect::new(0.0, 0.0, 200.0, 100.0)));
        canvas
    }

    fn record_events(canvas: &MapCanvas) -> Arc<RwLock<Vec<CanvasEvent>>> {
        let events = Arc::new(RwLock::new(vec![]));
        let sink = events.clone();
        canvas
            .signal()
            .subscribe(move |event| sink.write().push(event.clone()));
        events
    }

    fn point_layer(name: &str, epsg: u32, points: &[(f64, f64)]) -> VectorLayer {
        let features = points
            .iter()
            .enumerate()
            .map(|(i, (x, y))| Feature::new(i as i64, "Point", vec![Point2d::new(*x, *y)]))
            .collect();
        let provider = MemoryProvider::new(name, "Point", epsg, features);
        VectorLayer::with_provider(name, Box::new(provider))
    }

    #[test]
    fn default_extent_is_applied_on_first_resize() {
        let mut canvas = MapCanvas::default();
        assert_eq!(canvas.extent(), Rect::new(-180.0, -90.0, 180.0, 90.0));

        canvas.set_viewport_size(Size::new(360.0, 180.0));
        assert_abs_diff_eq!(canvas.scale(), 1.0);
        assert_abs_diff_eq!(canvas.center(), Point2d::new(0.0, 0.0));
    }

    #[test]
    fn set_extent_rejects_empty_rect() {
        let mut canvas = canvas();
        let events = record_events(&canvas);
        assert!(!canvas.set_extent(Rect::new(10.0, 10.0, 10.0, 20.0)));
        assert!(!canvas.set_extent(Rect::new(10.0, 10.0, 0.0, 20.0)));
        assert_eq!(canvas.extent(), Rect::new(0.0, 0.0, 200.0, 100.0));
        assert!(events.read().is_empty());
    }

    #[test]
    fn set_extent_keeps_aspect_ratio() {
        let mut canvas = canvas();
        let events = record_events(&canvas);
        assert!(canvas.set_extent(Rect::new(0.0, 0.0, 10.0, 10.0)));

        assert_abs_diff_eq!(canvas.scale(), 0.1);
        let extent = canvas.extent();
        assert_abs_diff_eq!(extent.width(), 20.0, epsilon = 1e-9);
        assert_abs_diff_eq!(extent.height(), 10.0, epsilon = 1e-9);
        assert_abs_diff_eq!(canvas.center(), Point2d::new(5.0, 5.0), epsilon = 1e-9);

        let events = events.read();
        assert!(events.contains(&CanvasEvent::ScaleChanged(0.1)));
        assert_matches!(events.last(), Some(CanvasEvent::ExtentChanged(_)));
    }

    #[test]
    fn zoom_in_and_out() {
        let mut canvas = canvas();
        canvas.zoom_in();
        assert_abs_diff_eq!(canvas.scale(), 1.0 / 1.5);
        assert_abs_diff_eq!(canvas.center(), Point2d::new(100.0, 50.0), epsilon = 1e-9);

        canvas.zoom_out();
        canvas.zoom_out();
        assert_abs_diff_eq!(canvas.scale(), 1.5, epsilon = 1e-9);
    }

    #[test]
    fn wheel_zoom_is_anchored_at_pointer() {
        let mut canvas = canvas();
        let manager = LayerManager::new();
        let pointer = Point2d::new(30.0, 20.0);
        let before = canvas.to_map_coordinates(pointer);

        assert!(canvas.handle_input(&InputEvent::Scroll(1.0, pointer), &manager));
        assert_abs_diff_eq!(canvas.scale(), 1.0 / 1.2, epsilon = 1e-9);
        assert_abs_diff_eq!(canvas.to_map_coordinates(pointer), before, epsilon = 1e-9);

        assert!(canvas.handle_input(&InputEvent::Scroll(-1.0, pointer), &manager));
        assert_abs_diff_eq!(canvas.scale(), 1.0, epsilon = 1e-9);
        assert_abs_diff_eq!(canvas.to_map_coordinates(pointer), before, epsilon = 1e-9);
    }

    #[test]
    fn clamped_wheel_zoom_keeps_anchor() {
        let mut canvas = canvas();
        canvas.set_config(CanvasConfig::default().with_min_scale(0.9));
        let manager = LayerManager::new();
        let pointer = Point2d::new(170.0, 90.0);
        let before = canvas.to_map_coordinates(pointer);

        canvas.handle_input(&InputEvent::Scroll(3.0, pointer), &manager);
        canvas.handle_input(&InputEvent::Scroll(3.0, pointer), &manager);
        assert_abs_diff_eq!(canvas.scale(), 0.9);
        assert_abs_diff_eq!(canvas.to_map_coordinates(pointer), before, epsilon = 1e-9);
    }

    #[test]
    fn drag_pans_without_scale_change() {
        let mut canvas = canvas();
        let manager = LayerManager::new();
        let scale = canvas.scale();

        canvas.handle_input(
            &InputEvent::ButtonPressed(MouseButton::Left, Point2d::new(100.0, 50.0)),
            &manager,
        );
        assert_matches!(
            canvas.interaction_state(),
            InteractionState::Panning { .. }
        );

        let grabbed = canvas.to_map_coordinates(Point2d::new(100.0, 50.0));
        canvas.handle_input(&InputEvent::PointerMoved(Point2d::new(120.0, 40.0)), &manager);
        canvas.handle_input(&InputEvent::PointerMoved(Point2d::new(130.0, 30.0)), &manager);
        canvas.handle_input(
            &InputEvent::ButtonReleased(MouseButton::Left, Point2d::new(130.0, 30.0)),
            &manager,
        );

        assert_eq!(canvas.interaction_state(), InteractionState::Idle);
        assert_eq!(canvas.scale(), scale);
        assert_abs_diff_eq!(
            canvas.to_map_coordinates(Point2d::new(130.0, 30.0)),
            grabbed,
            epsilon = 1e-9
        );
        assert_abs_diff_eq!(canvas.center(), Point2d::new(70.0, 30.0), epsilon = 1e-9);
    }

    #[test]
    fn pointer_move_reports_coordinates() {
        let mut canvas = canvas();
        let events = record_events(&canvas);
        let manager = LayerManager::new();

        assert!(!canvas.handle_input(&InputEvent::PointerMoved(Point2d::new(10.0, 10.0)), &manager));
        assert_eq!(
            *events.read(),
            vec![CanvasEvent::XyCoordinates(Point2d::new(10.0, 90.0))]
        );
    }

    #[test]
    fn right_button_does_not_pan() {
        let mut canvas = canvas();
        let manager = LayerManager::new();
        assert!(!canvas.handle_input(
            &InputEvent::ButtonPressed(MouseButton::Right, Point2d::new(0.0, 0.0)),
            &manager
        ));
        assert_eq!(canvas.interaction_state(), InteractionState::Idle);
    }

    #[test]
    fn double_click_centers_and_zooms() {
        let mut canvas = canvas();
        let manager = LayerManager::new();
        canvas.handle_input(
            &InputEvent::DoubleClick(MouseButton::Left, Point2d::new(50.0, 25.0)),
            &manager,
        );
        assert_abs_diff_eq!(canvas.center(), Point2d::new(50.0, 75.0), epsilon = 1e-9);
        assert_abs_diff_eq!(canvas.scale(), 1.0 / 1.5);
    }

    #[test]
    fn keyboard_shortcuts() {
        let mut canvas = canvas();
        let mut manager = LayerManager::new();
        manager.add_layer(Box::new(point_layer(
            "points",
            4326,
            &[(0.0, 0.0), (10.0, 10.0)],
        )));

        assert!(canvas.handle_input(
            &InputEvent::KeyPressed(Key::Plus, Modifiers::default()),
            &manager
        ));
        assert_abs_diff_eq!(canvas.scale(), 1.0 / 1.5);
        canvas.handle_input(
            &InputEvent::KeyPressed(Key::Minus, Modifiers::default()),
            &manager,
        );
        assert_abs_diff_eq!(canvas.scale(), 1.0, epsilon = 1e-9);

        canvas.set_rotation(30.0);
        assert!(!canvas.handle_input(
            &InputEvent::KeyPressed(Key::Char('r'), Modifiers::default()),
            &manager
        ));
        assert!(canvas.handle_input(
            &InputEvent::KeyPressed(Key::Char('r'), Modifiers::CTRL),
            &manager
        ));
        assert_eq!(canvas.rotation(), 0.0);

        canvas.handle_input(
            &InputEvent::KeyPressed(Key::Space, Modifiers::default()),
            &manager,
        );
        assert_abs_diff_eq!(canvas.center(), Point2d::new(5.0, 5.0), epsilon = 1e-9);
        assert_abs_diff_eq!(canvas.scale(), 0.12, epsilon = 1e-9);
    }

    #[test]
    fn zoom_to_full_extent_without_layers() {
        let mut canvas = canvas();
        let events = record_events(&canvas);
        canvas.zoom_to_full_extent(&LayerManager::new());
        assert_eq!(canvas.extent(), Rect::new(0.0, 0.0, 200.0, 100.0));
        assert!(events.read().is_empty());
    }

    #[test]
    fn resize_keeps_center_and_scale() {
        let mut canvas = canvas();
        canvas.set_viewport_size(Size::new(400.0, 400.0));
        assert_eq!(canvas.scale(), 1.0);
        assert_abs_diff_eq!(canvas.center(), Point2d::new(100.0, 50.0));
        let extent = canvas.extent();
        assert_abs_diff_eq!(extent.x_min, -100.0, epsilon = 1e-9);
        assert_abs_diff_eq!(extent.y_min, -150.0, epsilon = 1e-9);
        assert_abs_diff_eq!(extent.x_max, 300.0, epsilon = 1e-9);
        assert_abs_diff_eq!(extent.y_max, 250.0, epsilon = 1e-9);
    }

    #[test]
    fn rotation_events() {
        let mut canvas = canvas();
        let events = record_events(&canvas);
        canvas.set_rotation(45.0);
        canvas.set_rotation(45.0);

        let events = events.read();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0], CanvasEvent::RotationChanged(45.0));
        assert_matches!(events[1], CanvasEvent::ExtentChanged(_));
    }

    #[test]
    fn redraw_is_requested() {
        let mut canvas = canvas();
        let count = Arc::new(AtomicUsize::new(0));
        let counter = count.clone();
        canvas.set_messenger(Some(move || {
            counter.fetch_add(1, Ordering::Relaxed);
        }));

        canvas.zoom_in();
        canvas.set_canvas_color(Color::BLACK);
        canvas.set_canvas_color(Color::BLACK);
        assert_eq!(count.load(Ordering::Relaxed), 2);

        let events = record_events(&canvas);
        canvas.refresh();
        assert_eq!(count.load(Ordering::Relaxed), 3);
        assert_eq!(
            *events.read(),
            vec![CanvasEvent::RenderStarting, CanvasEvent::RenderComplete]
        );
    }

    #[test]
    fn scale_denominator() {
        let canvas = canvas();
        assert_abs_diff_eq!(
            canvas.scale_denominator(&Crs::korea_2000_central_belt()),
            96.0 / 0.0254,
            epsilon = 1e-6
        );
        assert!(canvas.scale_denominator(&Crs::wgs84()) > 4e8);
    }

    #[test]
    fn render_draws_layers_bottom_to_top() {
        let mut canvas = canvas();
        canvas.set_canvas_color(Color::GRAY);
        let mut manager = LayerManager::new();
        manager.add_layer(Box::new(point_layer("bottom", 4326, &[(10.0, 10.0)])));
        manager.add_layer(Box::new(point_layer("top", 4326, &[(20.0, 20.0)])));

        let mut painter = RecordingPainter::new();
        canvas.render(&manager, &mut painter);
        let commands = painter.commands();

        assert_eq!(commands.first(), Some(&PaintCommand::Clear(Color::GRAY)));
        assert_eq!(
            commands.get(2),
            Some(&PaintCommand::WorldTransform(canvas.map_to_device()))
        );
        let centers: Vec<Point2d> = commands
            .iter()
            .filter_map(|command| match command {
                PaintCommand::Marker { center, .. } => Some(*center),
                _ => None,
            })
            .collect();
        assert_eq!(
            centers,
            vec![Point2d::new(10.0, 10.0), Point2d::new(20.0, 20.0)]
        );
        assert_eq!(commands.last(), Some(&PaintCommand::Restore));
    }

    #[test]
    fn render_reprojects_layers() {
        let mut canvas = canvas();
        let mut manager = LayerManager::new();
        manager.set_project_crs(Crs::korea_2000_central_belt());
        let mut layer = point_layer("wgs84", 4326, &[(127.0, 38.0)]);
        layer.set_symbol(Symbol {
            point_size: 6.0,
            ..Symbol::default()
        });
        manager.add_layer(Box::new(layer));
        assert!(canvas.set_extent(Rect::new(150_000.0, 550_000.0, 250_000.0, 650_000.0)));

        let mut painter = RecordingPainter::new();
        canvas.render(&manager, &mut painter);

        let marker = painter
            .commands()
            .iter()
            .find_map(|command| match command {
                PaintCommand::Marker { center, size, .. } => Some((*center, *size)),
                _ => None,
            });
        assert_matches!(marker, Some((center, size)) => {
            assert_abs_diff_eq!(center, Point2d::new(200_000.0, 600_000.0), epsilon = 0.01);
            assert_eq!(size, 6.0);
        });
    }
}
