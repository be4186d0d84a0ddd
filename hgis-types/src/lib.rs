//! Geometry primitives, coordinate reference systems and coordinate transformations used by the
//! HGIS map engine.
//!
//! * [`cartesian`] – points, rectangles and sizes in cartesian coordinates.
//! * [`crs`] – coordinate reference systems created from EPSG codes, WKT or PROJ strings, with a
//!   built-in registry of the Korean national systems.
//! * [`transform`] – conversion of coordinates between two coordinate reference systems.

pub mod cartesian;
pub mod crs;
pub mod error;
pub mod transform;

pub use cartesian::{Point2d, Rect, Size};
pub use crs::{CoordinateReferenceSystem, Crs};
pub use transform::CoordinateTransform;
