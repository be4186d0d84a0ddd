use super::{Brush, Font, Painter, Pen, PointShape};
use crate::color::Color;
use hgis_types::{CoordinateTransform, Point2d, Rect};
use nalgebra::Matrix3;

/// Painter adapter converting the coordinates of drawn shapes with a coordinate transform before
/// passing them to the wrapped painter.
///
/// Used by the map canvas to draw layers whose CRS differs from the project CRS. Ellipse radii are
/// map lengths and are scaled by the ratio of the units of the two CRS. Marker sizes are device
/// pixels and are passed unchanged. Rectangles are drawn as their transformed bounding boxes.
pub struct ReprojectingPainter<'a> {
    inner: &'a mut dyn Painter,
    transform: &'a CoordinateTransform,
    unit_ratio: f64,
}

impl<'a> ReprojectingPainter<'a> {
    /// Wraps the painter.
    pub fn new(inner: &'a mut dyn Painter, transform: &'a CoordinateTransform) -> Self {
        let unit_ratio = transform.source_crs().meters_per_unit()
            / transform.destination_crs().meters_per_unit();
        Self {
            inner,
            transform,
            unit_ratio,
        }
    }

    fn project(&self, point: Point2d) -> Point2d {
        self.transform.transform(point)
    }
}

impl Painter for ReprojectingPainter<'_> {
    fn save(&mut self) {
        self.inner.save();
    }

    fn restore(&mut self) {
        self.inner.restore();
    }

    fn set_opacity(&mut self, opacity: f64) {
        self.inner.set_opacity(opacity);
    }

    fn set_pen(&mut self, pen: Pen) {
        self.inner.set_pen(pen);
    }

    fn set_brush(&mut self, brush: Brush) {
        self.inner.set_brush(brush);
    }

    fn set_font(&mut self, font: &Font) {
        self.inner.set_font(font);
    }

    fn set_world_transform(&mut self, transform: Matrix3<f64>) {
        self.inner.set_world_transform(transform);
    }

    fn clear(&mut self, color: Color) {
        self.inner.clear(color);
    }

    fn draw_ellipse(&mut self, center: Point2d, radius_x: f64, radius_y: f64) {
        let center = self.project(center);
        self.inner.draw_ellipse(
            center,
            radius_x * self.unit_ratio,
            radius_y * self.unit_ratio,
        );
    }

    fn draw_marker(&mut self, center: Point2d, shape: PointShape, size: f64) {
        let center = self.project(center);
        self.inner.draw_marker(center, shape, size);
    }

    fn draw_rect(&mut self, rect: &Rect) {
        let rect = self.transform.transform_bounding_box(rect);
        self.inner.draw_rect(&rect);
    }

    fn draw_line(&mut self, from: Point2d, to: Point2d) {
        let from = self.project(from);
        let to = self.project(to);
        self.inner.draw_line(from, to);
    }

    fn draw_path(&mut self, points: &[Point2d]) {
        let points = self.transform.transform_polyline(points);
        self.inner.draw_path(&points);
    }

    fn draw_polygon(&mut self, points: &[Point2d]) {
        let points = self.transform.transform_polyline(points);
        self.inner.draw_polygon(&points);
    }

    fn draw_text(&mut self, position: Point2d, text: &str) {
        let position = self.project(position);
        self.inner.draw_text(position, text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{PaintCommand, RecordingPainter};
    use approx::assert_abs_diff_eq;
    use hgis_types::Crs;

    #[test]
    fn shapes_are_reprojected() {
        let transform = CoordinateTransform::new(Crs::wgs84(), Crs::korea_2000_central_belt());
        let mut recording = RecordingPainter::new();
        {
            let mut painter = ReprojectingPainter::new(&mut recording, &transform);
            painter.set_pen(Pen::new(Color::BLACK, 1.0));
            painter.draw_ellipse(Point2d::new(127.0, 38.0), 0.001, 0.001);
            painter.draw_path(&[Point2d::new(127.0, 38.0), Point2d::new(127.01, 38.0)]);
            painter.draw_text(Point2d::new(127.0, 38.0), "origin");
        }

        let commands = recording.commands();
        assert_eq!(commands[0], PaintCommand::Pen(Pen::new(Color::BLACK, 1.0)));

        let PaintCommand::Ellipse {
            center, radius_x, ..
        } = &commands[1]
        else {
            panic!("expected ellipse, got {:?}", commands[1]);
        };
        assert_abs_diff_eq!(center.x, 200_000.0, epsilon = 0.01);
        assert_abs_diff_eq!(center.y, 600_000.0, epsilon = 0.01);
        assert_abs_diff_eq!(*radius_x, 111.319, epsilon = 0.001);

        let PaintCommand::Path(points) = &commands[2] else {
            panic!("expected path, got {:?}", commands[2]);
        };
        assert_eq!(points.len(), 2);
        assert!(points[1].x > 200_000.0);
    }

    #[test]
    fn marker_keeps_pixel_size() {
        let transform = CoordinateTransform::new(Crs::wgs84(), Crs::korea_2000_central_belt());
        let mut recording = RecordingPainter::new();
        {
            let mut painter = ReprojectingPainter::new(&mut recording, &transform);
            painter.draw_marker(Point2d::new(127.0, 38.0), PointShape::Star, 6.0);
        }

        let PaintCommand::Marker {
            center,
            shape,
            size,
        } = &recording.commands()[0]
        else {
            panic!("expected marker, got {:?}", recording.commands()[0]);
        };
        assert_abs_diff_eq!(center.x, 200_000.0, epsilon = 0.01);
        assert_abs_diff_eq!(center.y, 600_000.0, epsilon = 0.01);
        assert_eq!(*shape, PointShape::Star);
        assert_eq!(*size, 6.0);
    }

    #[test]
    fn identity_passes_through() {
        let transform = CoordinateTransform::new(Crs::wgs84(), Crs::wgs84());
        let mut recording = RecordingPainter::new();
        {
            let mut painter = ReprojectingPainter::new(&mut recording, &transform);
            painter.draw_rect(&Rect::new(126.0, 37.0, 127.0, 38.0));
        }

        assert_eq!(
            recording.commands(),
            &[PaintCommand::Rect(Rect::new(126.0, 37.0, 127.0, 38.0))]
        );
    }
}
