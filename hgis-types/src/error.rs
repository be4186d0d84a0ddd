//! Error types used by the crate.

use thiserror::Error;

/// Error creating a coordinate reference system from one of its definitions.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CrsError {
    /// The code is not present in the EPSG registry.
    #[error("unknown EPSG code: {0}")]
    UnknownEpsg(u32),
    /// WKT text could not be parsed.
    #[error("invalid WKT definition: {0}")]
    InvalidWkt(String),
    /// PROJ string could not be parsed.
    #[error("invalid PROJ definition: {0}")]
    InvalidProj(String),
    /// Definition is well-formed but uses a projection method the engine does not support.
    #[error("unsupported projection method: {0}")]
    UnsupportedProjection(String),
    /// Ellipsoid name or parameters are not recognized.
    #[error("unknown ellipsoid: {0}")]
    UnknownEllipsoid(String),
}

/// Error building a coordinate transformation pipeline.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransformError {
    /// Source CRS of the transform is not valid.
    #[error("source coordinate system is not valid")]
    InvalidSourceCrs,
    /// Destination CRS of the transform is not valid.
    #[error("destination coordinate system is not valid")]
    InvalidDestinationCrs,
    /// Projection engine rejected the pipeline definition.
    #[error("failed to build transformation pipeline `{definition}`: {reason}")]
    Pipeline {
        /// Pipeline definition given to the engine.
        definition: String,
        /// Message reported by the engine.
        reason: String,
    },
}
