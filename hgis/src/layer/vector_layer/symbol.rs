use crate::color::Color;
use crate::render::{Brush, BrushStyle, Font, Pen, PenStyle, PointShape};
use serde::{Deserialize, Serialize};

/// Geometry type of the features of a vector layer.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GeometryType {
    /// Unknown or mixed geometry types.
    #[default]
    Unknown,
    /// Single points.
    Point,
    /// Lines.
    LineString,
    /// Polygons.
    Polygon,
    /// Sets of points.
    MultiPoint,
    /// Sets of lines.
    MultiLineString,
    /// Sets of polygons.
    MultiPolygon,
}

impl GeometryType {
    /// Parses a geometry type name as reported by feature providers. Unknown names give
    /// [`GeometryType::Unknown`].
    pub fn from_provider_name(name: &str) -> Self {
        match name {
            "Point" => GeometryType::Point,
            "LineString" => GeometryType::LineString,
            "Polygon" => GeometryType::Polygon,
            "MultiPoint" => GeometryType::MultiPoint,
            "MultiLineString" => GeometryType::MultiLineString,
            "MultiPolygon" => GeometryType::MultiPolygon,
            _ => GeometryType::Unknown,
        }
    }

    /// Name of the geometry type as shown in the user interface.
    pub fn display_name(&self) -> &'static str {
        match self {
            GeometryType::Unknown => "알 수 없음",
            GeometryType::Point => "포인트",
            GeometryType::LineString => "라인",
            GeometryType::Polygon => "폴리곤",
            GeometryType::MultiPoint => "멀티포인트",
            GeometryType::MultiLineString => "멀티라인",
            GeometryType::MultiPolygon => "멀티폴리곤",
        }
    }

    /// Returns true for point and multipoint.
    pub fn is_point(&self) -> bool {
        matches!(self, GeometryType::Point | GeometryType::MultiPoint)
    }
}

/// Way features of a vector layer are classified for drawing.
///
/// Only [`RendererType::SingleSymbol`] is implemented. Other types are stored with the layer
/// but drawn as single symbol.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RendererType {
    /// All features use the same symbol.
    #[default]
    SingleSymbol,
    /// Symbol by category of an attribute.
    Categorized,
    /// Symbol by ranges of a numeric attribute.
    Graduated,
    /// Symbol by rules.
    RuleBased,
}

/// Drawing style of the features of a vector layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Symbol {
    /// Fill color of polygons and point markers.
    pub fill_color: Color,
    /// Color of lines and outlines.
    pub stroke_color: Color,
    /// Width of lines and outlines.
    pub stroke_width: f64,
    /// Style of lines and outlines.
    pub pen_style: PenStyle,
    /// Fill pattern.
    pub brush_style: BrushStyle,
    /// Radius of point markers in device pixels.
    pub point_size: f64,
    /// Shape of point markers.
    pub point_shape: PointShape,
}

impl Default for Symbol {
    fn default() -> Self {
        Self {
            fill_color: Color::rgba(100, 150, 200, 100),
            stroke_color: Color::DARK_BLUE,
            stroke_width: 1.5,
            pen_style: PenStyle::Solid,
            brush_style: BrushStyle::Solid,
            point_size: 3.0,
            point_shape: PointShape::Circle,
        }
    }
}

impl Symbol {
    /// The symbol with colors and width used for selected features.
    pub fn highlighted(&self) -> Self {
        Self {
            fill_color: Color::rgba(255, 255, 0, 150),
            stroke_color: Color::YELLOW,
            stroke_width: 2.0,
            ..*self
        }
    }

    /// Pen for lines and outlines.
    pub fn pen(&self) -> Pen {
        Pen::new(self.stroke_color, self.stroke_width).with_style(self.pen_style)
    }

    /// Brush for areas.
    pub fn brush(&self) -> Brush {
        Brush::new(self.fill_color, self.brush_style)
    }
}

/// Label configuration of a vector layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelSettings {
    /// Labels are drawn.
    pub enabled: bool,
    /// Attribute used as label text.
    pub field: String,
    /// Label font.
    pub font: Font,
    /// Label color.
    pub color: Color,
}

impl Default for LabelSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            field: String::new(),
            font: Font::default(),
            color: Color::BLACK,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn geometry_type_names() {
        assert_eq!(
            GeometryType::from_provider_name("MultiPolygon"),
            GeometryType::MultiPolygon
        );
        assert_eq!(
            GeometryType::from_provider_name("GeometryCollection"),
            GeometryType::Unknown
        );
        assert_eq!(GeometryType::LineString.display_name(), "라인");
    }

    #[test]
    fn highlight_keeps_shape() {
        let symbol = Symbol {
            point_shape: PointShape::Star,
            point_size: 5.0,
            ..Default::default()
        };
        let highlighted = symbol.highlighted();
        assert_eq!(highlighted.point_shape, PointShape::Star);
        assert_eq!(highlighted.point_size, 5.0);
        assert_eq!(highlighted.stroke_color, Color::YELLOW);
        assert_eq!(highlighted.stroke_width, 2.0);
    }
}
