//! Types and functions on geometries in cartesian coordinates.

mod rect;
mod size;

pub use nalgebra::{Point2, Vector2};
pub use rect::Rect;
pub use size::Size;

/// 2d point with `f64` coordinates.
pub type Point2d = Point2<f64>;
/// 2d vector with `f64` coordinates.
pub type Vector2d = Vector2<f64>;
