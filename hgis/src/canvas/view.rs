use hgis_types::{Point2d, Rect, Size};
use nalgebra::{Matrix3, Rotation2, Vector2};

/// Position, scale and rotation of the map shown in a viewport.
///
/// The view keeps the map to device affine matrix and its inverse. Both are recomputed every time
/// a new view is created with one of the `with_*` methods, so they always describe the current
/// state.
///
/// Device coordinates are pixels from the top-left corner of the viewport with Y axis pointing
/// down. Map coordinates have Y axis pointing up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasView {
    center: Point2d,
    scale: f64,
    rotation: f64,
    size: Size,
    map_to_device: Matrix3<f64>,
    device_to_map: Matrix3<f64>,
}

impl Default for CanvasView {
    fn default() -> Self {
        Self::new(Point2d::origin(), 1.0)
    }
}

impl CanvasView {
    /// Creates a view with no size, centered at `center`.
    pub fn new(center: Point2d, scale: f64) -> Self {
        Self::build(center, scale, 0.0, Size::default())
    }

    fn build(center: Point2d, scale: f64, rotation: f64, size: Size) -> Self {
        let mut view = Self {
            center,
            scale,
            rotation,
            size,
            map_to_device: Matrix3::identity(),
            device_to_map: Matrix3::identity(),
        };
        view.map_to_device = view.compute_map_to_device();
        view.device_to_map = view.compute_device_to_map();
        view
    }

    fn compute_map_to_device(&self) -> Matrix3<f64> {
        let to_center = Matrix3::new_translation(&Vector2::new(-self.center.x, -self.center.y));
        let scale = Matrix3::new_nonuniform_scaling(&Vector2::new(1.0 / self.scale, -1.0 / self.scale));
        let rotation = Rotation2::new(self.rotation.to_radians()).to_homogeneous();
        let to_viewport = Matrix3::new_translation(&Vector2::new(
            self.size.half_width(),
            self.size.half_height(),
        ));

        to_viewport * rotation * scale * to_center
    }

    fn compute_device_to_map(&self) -> Matrix3<f64> {
        let from_viewport = Matrix3::new_translation(&Vector2::new(
            -self.size.half_width(),
            -self.size.half_height(),
        ));
        let rotation = Rotation2::new(-self.rotation.to_radians()).to_homogeneous();
        let scale = Matrix3::new_nonuniform_scaling(&Vector2::new(self.scale, -self.scale));
        let from_center = Matrix3::new_translation(&Vector2::new(self.center.x, self.center.y));

        from_center * scale * rotation * from_viewport
    }

    /// Map coordinates of the viewport center.
    pub fn center(&self) -> Point2d {
        self.center
    }

    /// Returns a copy of the view centered at `center`.
    pub fn with_center(&self, center: Point2d) -> Self {
        Self::build(center, self.scale, self.rotation, self.size)
    }

    /// Map units per device pixel.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Returns a copy of the view with the given scale.
    pub fn with_scale(&self, scale: f64) -> Self {
        Self::build(self.center, scale, self.rotation, self.size)
    }

    /// Rotation of the map in degrees. Positive values rotate the map clockwise on the screen.
    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    /// Returns a copy of the view with the given rotation in degrees.
    pub fn with_rotation(&self, rotation: f64) -> Self {
        Self::build(self.center, self.scale, rotation, self.size)
    }

    /// Size of the viewport in pixels.
    pub fn size(&self) -> Size {
        self.size
    }

    /// Returns a copy of the view with the given viewport size. Center and scale stay the same.
    pub fn with_size(&self, size: Size) -> Self {
        Self::build(self.center, self.scale, self.rotation, size)
    }

    /// Matrix converting map coordinates into device pixels.
    pub fn map_to_device(&self) -> Matrix3<f64> {
        self.map_to_device
    }

    /// Matrix converting device pixels into map coordinates.
    pub fn device_to_map(&self) -> Matrix3<f64> {
        self.device_to_map
    }

    /// Converts a device pixel position into map coordinates.
    pub fn to_map(&self, device_point: Point2d) -> Point2d {
        self.device_to_map.transform_point(&device_point)
    }

    /// Converts map coordinates into a device pixel position.
    pub fn to_device(&self, map_point: Point2d) -> Point2d {
        self.map_to_device.transform_point(&map_point)
    }

    /// Map area covered by the viewport. With non-zero rotation this is the bounding box of the
    /// rotated viewport.
    pub fn extent(&self) -> Rect {
        let width = self.size.width();
        let height = self.size.height();
        let corners = [
            self.to_map(Point2d::new(0.0, 0.0)),
            self.to_map(Point2d::new(width, 0.0)),
            self.to_map(Point2d::new(width, height)),
            self.to_map(Point2d::new(0.0, height)),
        ];

        Rect::from_points(corners.iter())
            .unwrap_or_else(|| Rect::from_center_size(self.center, 0.0, 0.0))
    }

    /// Returns a copy of the view showing the whole `extent` in the viewport. The scale is chosen
    /// so that the extent fits in both directions, so one of the dimensions shows more than the
    /// requested area.
    pub fn fit(&self, extent: &Rect) -> Self {
        let scale = if self.size.is_zero() {
            self.scale
        } else {
            (extent.width() / self.size.width()).max(extent.height() / self.size.height())
        };

        Self::build(extent.center(), scale, self.rotation, self.size)
    }

    /// Returns a copy of the view moved so that the map point under the device position `from`
    /// appears under `to`.
    pub fn translate_by_pixels(&self, from: Point2d, to: Point2d) -> Self {
        let delta = self.to_map(from) - self.to_map(to);
        self.with_center(self.center + delta)
    }

    /// Returns a copy of the view with scale set to `scale`, keeping the map point under the device
    /// position `anchor` in place.
    pub fn zoom_around(&self, scale: f64, anchor: Point2d) -> Self {
        let anchor_map = self.to_map(anchor);
        let k = scale / self.scale;
        let center = anchor_map + (self.center - anchor_map) * k;
        Self::build(center, scale, self.rotation, self.size)
    }
}
