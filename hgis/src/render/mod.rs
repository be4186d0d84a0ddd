//! Drawing abstraction used by layers and the map canvas.
//!
//! Layers never talk to a graphics backend directly. They draw through the [`Painter`] trait,
//! which the host application implements for its toolkit. Coordinates passed to a painter are in
//! the coordinate system set by [`Painter::set_world_transform`]; the map canvas sets it to the
//! map-to-device transformation before asking layers to render.

use crate::color::Color;
use hgis_types::{Point2d, Rect};
use nalgebra::Matrix3;
use serde::{Deserialize, Serialize};

mod reproject;
mod transform_cache;

pub use reproject::ReprojectingPainter;
pub use transform_cache::TransformCache;

/// Style of stroked lines.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PenStyle {
    /// Lines are not drawn.
    NoPen,
    /// Continuous line.
    #[default]
    Solid,
    /// Dashes.
    Dash,
    /// Dots.
    Dot,
    /// Alternating dashes and dots.
    DashDot,
}

/// Pattern of filled areas.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BrushStyle {
    /// Areas are not filled.
    NoBrush,
    /// Uniform fill.
    #[default]
    Solid,
    /// Horizontal hatching.
    Horizontal,
    /// Vertical hatching.
    Vertical,
    /// Horizontal and vertical hatching.
    Cross,
    /// Diagonal hatching.
    Diagonal,
}

/// Marker drawn for point features.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PointShape {
    /// Circle with radius of the marker size.
    #[default]
    Circle,
    /// Square with half side of the marker size.
    Square,
    /// Triangle pointing up.
    Triangle,
    /// Two crossing lines.
    Cross,
    /// Five-pointed star.
    Star,
}

/// Parameters of stroked lines and outlines.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pen {
    /// Line color.
    pub color: Color,
    /// Line width.
    pub width: f64,
    /// Line style.
    pub style: PenStyle,
}

impl Pen {
    /// Creates a solid pen.
    pub fn new(color: Color, width: f64) -> Self {
        Self {
            color,
            width,
            style: PenStyle::Solid,
        }
    }

    /// Sets the line style.
    pub fn with_style(self, style: PenStyle) -> Self {
        Self { style, ..self }
    }
}

/// Parameters of filled areas.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Brush {
    /// Fill color.
    pub color: Color,
    /// Fill pattern.
    pub style: BrushStyle,
}

impl Brush {
    /// Creates a brush.
    pub fn new(color: Color, style: BrushStyle) -> Self {
        Self { color, style }
    }
}

/// Font used for labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Font {
    /// Font family name.
    pub family: String,
    /// Font size in points.
    pub size: f64,
    /// Bold font.
    pub bold: bool,
}

impl Font {
    /// Creates a regular font.
    pub fn new(family: impl Into<String>, size: f64) -> Self {
        Self {
            family: family.into(),
            size,
            bold: false,
        }
    }
}

impl Default for Font {
    fn default() -> Self {
        Self::new("Malgun Gothic", 9.0)
    }
}

/// Drawing surface implemented by the host application.
///
/// The painter keeps a current pen, brush, font, opacity and world transform. `save` pushes
/// this state onto a stack and `restore` pops it.
pub trait Painter {
    /// Saves the current state.
    fn save(&mut self);
    /// Restores the last saved state.
    fn restore(&mut self);
    /// Sets the opacity in the range `[0; 1]`.
    fn set_opacity(&mut self, opacity: f64);
    /// Sets the pen used for lines and outlines.
    fn set_pen(&mut self, pen: Pen);
    /// Sets the brush used to fill areas.
    fn set_brush(&mut self, brush: Brush);
    /// Sets the font used for text.
    fn set_font(&mut self, font: &Font);
    /// Sets the transformation applied to all coordinates given to the painter.
    fn set_world_transform(&mut self, transform: Matrix3<f64>);
    /// Fills the whole surface with the color.
    fn clear(&mut self, color: Color);
    /// Draws an ellipse with the given center and radii.
    fn draw_ellipse(&mut self, center: Point2d, radius_x: f64, radius_y: f64);
    /// Draws a point marker. Only `center` goes through the world transform: `size` is the
    /// marker radius in device pixels, so markers keep their size at any scale.
    fn draw_marker(&mut self, center: Point2d, shape: PointShape, size: f64);
    /// Draws a rectangle.
    fn draw_rect(&mut self, rect: &Rect);
    /// Draws a straight line segment.
    fn draw_line(&mut self, from: Point2d, to: Point2d);
    /// Draws an open path through the points.
    fn draw_path(&mut self, points: &[Point2d]);
    /// Draws a closed filled polygon.
    fn draw_polygon(&mut self, points: &[Point2d]);
    /// Draws text with its baseline starting at the position.
    fn draw_text(&mut self, position: Point2d, text: &str);
}

/// Single call made to a [`RecordingPainter`].
#[derive(Debug, Clone, PartialEq)]
pub enum PaintCommand {
    /// `save` call.
    Save,
    /// `restore` call.
    Restore,
    /// `set_opacity` call.
    Opacity(f64),
    /// `set_pen` call.
    Pen(Pen),
    /// `set_brush` call.
    Brush(Brush),
    /// `set_font` call.
    Font(Font),
    /// `set_world_transform` call.
    WorldTransform(Matrix3<f64>),
    /// `clear` call.
    Clear(Color),
    /// `draw_ellipse` call.
    Ellipse {
        /// Center of the ellipse.
        center: Point2d,
        /// Horizontal radius.
        radius_x: f64,
        /// Vertical radius.
        radius_y: f64,
    },
    /// `draw_marker` call.
    Marker {
        /// Center of the marker.
        center: Point2d,
        /// Marker shape.
        shape: PointShape,
        /// Marker radius in device pixels.
        size: f64,
    },
    /// `draw_rect` call.
    Rect(Rect),
    /// `draw_line` call.
    Line(Point2d, Point2d),
    /// `draw_path` call.
    Path(Vec<Point2d>),
    /// `draw_polygon` call.
    Polygon(Vec<Point2d>),
    /// `draw_text` call.
    Text(Point2d, String),
}

impl PaintCommand {
    /// Returns true for commands that produce output on the surface.
    pub fn is_drawing(&self) -> bool {
        matches!(
            self,
            PaintCommand::Clear(_)
                | PaintCommand::Ellipse { .. }
                | PaintCommand::Marker { .. }
                | PaintCommand::Rect(_)
                | PaintCommand::Line(..)
                | PaintCommand::Path(_)
                | PaintCommand::Polygon(_)
                | PaintCommand::Text(..)
        )
    }
}

/// Painter that stores the calls made to it instead of drawing.
///
/// Useful for tests and for hosts that replay the drawing on another thread.
#[derive(Debug, Default, Clone)]
pub struct RecordingPainter {
    commands: Vec<PaintCommand>,
}

impl RecordingPainter {
    /// Creates an empty painter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded commands in call order.
    pub fn commands(&self) -> &[PaintCommand] {
        &self.commands
    }

    /// Returns the recorded commands, leaving the painter empty.
    pub fn take(&mut self) -> Vec<PaintCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Number of recorded drawing commands.
    pub fn drawing_count(&self) -> usize {
        self.commands.iter().filter(|c| c.is_drawing()).count()
    }
}

impl Painter for RecordingPainter {
    fn save(&mut self) {
        self.commands.push(PaintCommand::Save);
    }

    fn restore(&mut self) {
        self.commands.push(PaintCommand::Restore);
    }

    fn set_opacity(&mut self, opacity: f64) {
        self.commands.push(PaintCommand::Opacity(opacity));
    }

    fn set_pen(&mut self, pen: Pen) {
        self.commands.push(PaintCommand::Pen(pen));
    }

    fn set_brush(&mut self, brush: Brush) {
        self.commands.push(PaintCommand::Brush(brush));
    }

    fn set_font(&mut self, font: &Font) {
        self.commands.push(PaintCommand::Font(font.clone()));
    }

    fn set_world_transform(&mut self, transform: Matrix3<f64>) {
        self.commands.push(PaintCommand::WorldTransform(transform));
    }

    fn clear(&mut self, color: Color) {
        self.commands.push(PaintCommand::Clear(color));
    }

    fn draw_ellipse(&mut self, center: Point2d, radius_x: f64, radius_y: f64) {
        self.commands.push(PaintCommand::Ellipse {
            center,
            radius_x,
            radius_y,
        });
    }

    fn draw_marker(&mut self, center: Point2d, shape: PointShape, size: f64) {
        self.commands.push(PaintCommand::Marker {
            center,
            shape,
            size,
        });
    }

    fn draw_rect(&mut self, rect: &Rect) {
        self.commands.push(PaintCommand::Rect(*rect));
    }

    fn draw_line(&mut self, from: Point2d, to: Point2d) {
        self.commands.push(PaintCommand::Line(from, to));
    }

    fn draw_path(&mut self, points: &[Point2d]) {
        self.commands.push(PaintCommand::Path(points.to_vec()));
    }

    fn draw_polygon(&mut self, points: &[Point2d]) {
        self.commands.push(PaintCommand::Polygon(points.to_vec()));
    }

    fn draw_text(&mut self, position: Point2d, text: &str) {
        self.commands.push(PaintCommand::Text(position, text.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_painter() {
        let mut painter = RecordingPainter::new();
        painter.save();
        painter.set_pen(Pen::new(Color::BLACK, 1.0).with_style(PenStyle::Dash));
        painter.draw_line(Point2d::new(0.0, 0.0), Point2d::new(1.0, 1.0));
        painter.draw_text(Point2d::new(0.0, 0.0), "불국사");
        painter.restore();

        assert_eq!(painter.commands().len(), 5);
        assert_eq!(painter.drawing_count(), 2);
        assert_eq!(
            painter.commands()[1],
            PaintCommand::Pen(Pen {
                color: Color::BLACK,
                width: 1.0,
                style: PenStyle::Dash
            })
        );

        let taken = painter.take();
        assert_eq!(taken.len(), 5);
        assert!(painter.commands().is_empty());
    }
}
