use hgis_types::{Point2d, Rect};
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

/// Identifier of a feature within its data source.
pub type FeatureId = i64;

/// Value of a feature attribute.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    /// Missing value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Integer(i64),
    /// Floating point value.
    Real(f64),
    /// Text value.
    Text(String),
}

impl AttributeValue {
    /// Numeric value of the attribute. Text is parsed if it contains a number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttributeValue::Integer(v) => Some(*v as f64),
            AttributeValue::Real(v) => Some(*v),
            AttributeValue::Text(v) => v.trim().parse().ok(),
            AttributeValue::Null | AttributeValue::Bool(_) => None,
        }
    }

    /// Returns true for [`AttributeValue::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, AttributeValue::Null)
    }
}

impl Display for AttributeValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            AttributeValue::Null => Ok(()),
            AttributeValue::Bool(v) => write!(f, "{v}"),
            AttributeValue::Integer(v) => write!(f, "{v}"),
            AttributeValue::Real(v) => write!(f, "{v}"),
            AttributeValue::Text(v) => f.write_str(v),
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for AttributeValue {
    fn from(value: f64) -> Self {
        Self::Real(value)
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&serde_json::Value> for AttributeValue {
    fn from(value: &serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Null => Self::Null,
            Value::Bool(v) => Self::Bool(*v),
            Value::Number(n) => match n.as_i64() {
                Some(v) => Self::Integer(v),
                None => n.as_f64().map(Self::Real).unwrap_or(Self::Null),
            },
            Value::String(v) => Self::Text(v.clone()),
            other => Self::Text(other.to_string()),
        }
    }
}

/// Feature as read from a data source.
///
/// Geometry is kept as a single sequence of vertices: the point(s) of point features, the
/// vertices of a line, or the outer ring of a polygon.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    /// Feature id.
    pub id: FeatureId,
    /// Attribute values by field name.
    pub attributes: BTreeMap<String, AttributeValue>,
    /// Vertices of the geometry.
    pub geometry: Vec<Point2d>,
    /// Geometry type name as reported by the data source, e.g. `Point` or `MultiPolygon`.
    pub geometry_type: String,
}

impl Feature {
    /// Creates a feature without attributes.
    pub fn new(id: FeatureId, geometry_type: impl Into<String>, geometry: Vec<Point2d>) -> Self {
        Self {
            id,
            attributes: BTreeMap::new(),
            geometry,
            geometry_type: geometry_type.into(),
        }
    }

    /// Adds an attribute value.
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Value of the attribute, if the feature has it.
    pub fn attribute(&self, name: &str) -> Option<&AttributeValue> {
        self.attributes.get(name)
    }

    /// Bounding rectangle of the geometry, or `None` for an empty geometry.
    pub fn bounding_rect(&self) -> Option<Rect> {
        Rect::from_points(self.geometry.iter())
    }
}
