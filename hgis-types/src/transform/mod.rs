//! Conversion of coordinates between coordinate reference systems.
//!
//! Geographic coordinates are always given as `x = longitude`, `y = latitude` in degrees.

mod pipeline;

use crate::cartesian::{Point2d, Rect};
use crate::crs::Crs;
use crate::error::TransformError;
use pipeline::GeodesyPipeline;

/// Transformation of coordinates from a source CRS into a destination CRS.
///
/// The transform owns its engine pipeline, which is rebuilt every time one of the CRS changes.
/// When the two CRS are equal, points are returned unchanged without invoking the engine.
///
/// Transformation methods never fail: an invalid transform, or a point the engine cannot convert,
/// yields the input coordinates.
#[derive(Debug)]
pub struct CoordinateTransform {
    source: Crs,
    destination: Crs,
    pipeline: Option<GeodesyPipeline>,
    last_error: Option<TransformError>,
}

impl CoordinateTransform {
    /// Creates a transform. If the pipeline cannot be built, the transform is invalid and
    /// [`CoordinateTransform::last_error`] contains the reason.
    pub fn new(source: Crs, destination: Crs) -> Self {
        let mut transform = Self {
            source,
            destination,
            pipeline: None,
            last_error: None,
        };
        let _ = transform.rebuild();
        transform
    }

    /// Creates a transform, returning an error if the pipeline cannot be built.
    pub fn try_new(source: Crs, destination: Crs) -> Result<Self, TransformError> {
        let mut transform = Self {
            source,
            destination,
            pipeline: None,
            last_error: None,
        };
        transform.rebuild()?;
        Ok(transform)
    }

    /// Source CRS.
    pub fn source_crs(&self) -> &Crs {
        &self.source
    }

    /// Destination CRS.
    pub fn destination_crs(&self) -> &Crs {
        &self.destination
    }

    /// Changes the source CRS and rebuilds the pipeline.
    pub fn set_source_crs(&mut self, crs: Crs) -> Result<(), TransformError> {
        self.source = crs;
        self.rebuild()
    }

    /// Changes the destination CRS and rebuilds the pipeline.
    pub fn set_destination_crs(&mut self, crs: Crs) -> Result<(), TransformError> {
        self.destination = crs;
        self.rebuild()
    }

    /// Returns true if both CRS are valid and the pipeline is built.
    pub fn is_valid(&self) -> bool {
        self.pipeline.is_some()
    }

    /// Returns true if the source and destination CRS are equal, in which case coordinates are
    /// passed through unchanged.
    pub fn is_short_circuited(&self) -> bool {
        self.is_valid() && self.source == self.destination
    }

    /// Error of the last pipeline build, if it failed.
    pub fn last_error(&self) -> Option<&TransformError> {
        self.last_error.as_ref()
    }

    /// Engine definition of the pipeline.
    pub fn pipeline_definition(&self) -> Option<&str> {
        self.pipeline.as_ref().map(|p| p.definition())
    }

    fn rebuild(&mut self) -> Result<(), TransformError> {
        self.pipeline = None;
        self.last_error = None;

        let result = self
            .source
            .params()
            .ok_or(TransformError::InvalidSourceCrs)
            .and_then(|source| {
                let destination = self
                    .destination
                    .params()
                    .ok_or(TransformError::InvalidDestinationCrs)?;
                GeodesyPipeline::new(source, destination)
            });

        match result {
            Ok(pipeline) => {
                log::debug!(
                    "Built transformation {} -> {}: {}",
                    self.source.auth_id(),
                    self.destination.auth_id(),
                    pipeline.definition()
                );
                self.pipeline = Some(pipeline);
                Ok(())
            }
            Err(err) => {
                log::warn!("Failed to create coordinate transformation: {err}");
                self.last_error = Some(err.clone());
                Err(err)
            }
        }
    }

    fn try_forward(&self, point: Point2d) -> Option<Point2d> {
        if self.source == self.destination {
            return Some(point);
        }
        self.pipeline.as_ref()?.forward(point)
    }

    fn try_inverse(&self, point: Point2d) -> Option<Point2d> {
        if self.source == self.destination {
            return Some(point);
        }
        self.pipeline.as_ref()?.inverse(point)
    }

    /// Transforms a point from the source into the destination CRS.
    pub fn transform(&self, point: Point2d) -> Point2d {
        if !self.is_valid() {
            return point;
        }

        self.try_forward(point).unwrap_or_else(|| {
            log::warn!(
                "Failed to transform point ({}, {}) from {} to {}",
                point.x,
                point.y,
                self.source,
                self.destination
            );
            point
        })
    }

    /// Transforms a point given by its coordinates.
    pub fn transform_xy(&self, x: f64, y: f64) -> Point2d {
        self.transform(Point2d::new(x, y))
    }

    /// Transforms every point of a polyline, preserving order.
    pub fn transform_polyline(&self, points: &[Point2d]) -> Vec<Point2d> {
        points.iter().map(|p| self.transform(*p)).collect()
    }

    /// Transforms a rectangle by sampling its corners, edge midpoints and center and returning
    /// the bounding box of the transformed samples.
    ///
    /// Samples the engine cannot convert are left out. If none can be converted, the input is
    /// returned.
    pub fn transform_bounding_box(&self, rect: &Rect) -> Rect {
        self.transform_rect_with(rect, |p| self.try_forward(p))
    }

    /// Transforms a point from the destination back into the source CRS.
    pub fn transform_reverse(&self, point: Point2d) -> Point2d {
        if !self.is_valid() {
            return point;
        }

        self.try_inverse(point).unwrap_or_else(|| {
            log::warn!(
                "Failed to transform point ({}, {}) from {} to {}",
                point.x,
                point.y,
                self.destination,
                self.source
            );
            point
        })
    }

    /// Transforms a point given by its coordinates from the destination back into the source CRS.
    pub fn transform_reverse_xy(&self, x: f64, y: f64) -> Point2d {
        self.transform_reverse(Point2d::new(x, y))
    }

    /// Transforms a rectangle from the destination back into the source CRS. See
    /// [`CoordinateTransform::transform_bounding_box`].
    pub fn transform_bounding_box_reverse(&self, rect: &Rect) -> Rect {
        self.transform_rect_with(rect, |p| self.try_inverse(p))
    }

    fn transform_rect_with(&self, rect: &Rect, f: impl Fn(Point2d) -> Option<Point2d>) -> Rect {
        if !self.is_valid() || self.source == self.destination {
            return *rect;
        }

        let points: Vec<Point2d> = rect.sample_points().into_iter().filter_map(f).collect();
        Rect::from_points(points.iter()).unwrap_or_else(|| {
            log::warn!("Failed to transform bounding box {rect:?}");
            *rect
        })
    }

    /// Converts WGS 84 coordinates into Korea 2000 / Central Belt 2010 (EPSG:5186).
    pub fn wgs84_to_korea_2000_central(point: Point2d) -> Point2d {
        Self::new(Crs::wgs84(), Crs::korea_2000_central_belt()).transform(point)
    }

    /// Converts Korea 2000 / Central Belt 2010 (EPSG:5186) coordinates into WGS 84.
    pub fn korea_2000_central_to_wgs84(point: Point2d) -> Point2d {
        Self::new(Crs::korea_2000_central_belt(), Crs::wgs84()).transform(point)
    }

    /// Converts WGS 84 coordinates into Korean 1985 / Modified Central Belt (EPSG:5174).
    pub fn wgs84_to_korean_1985_central(point: Point2d) -> Point2d {
        Self::new(Crs::wgs84(), Crs::korean_1985_modified_central_belt()).transform(point)
    }

    /// Converts Korean 1985 / Modified Central Belt (EPSG:5174) coordinates into WGS 84.
    pub fn korean_1985_central_to_wgs84(point: Point2d) -> Point2d {
        Self::new(Crs::korean_1985_modified_central_belt(), Crs::wgs84()).transform(point)
    }
}

impl Clone for CoordinateTransform {
    fn clone(&self) -> Self {
        Self::new(self.source.clone(), self.destination.clone())
    }
}
