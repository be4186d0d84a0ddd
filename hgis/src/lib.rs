//! HGIS is the map engine of a desktop GIS for cultural heritage survey data. It keeps an ordered
//! set of map layers, reads vector data sources, converts coordinates between the Korean national
//! coordinate reference systems and draws the layers into a map canvas.
//!
//! # Main components
//!
//! * [`LayerManager`] holds the [`layers`](layer) of a project in drawing order together with the
//!   project CRS. It re-broadcasts change notifications of its layers.
//! * [`VectorLayer`] reads features through a [`FeatureProvider`](provider::FeatureProvider)
//!   and draws them with a [`Symbol`](layer::vector_layer::Symbol).
//! * [`MapCanvas`] keeps the visible extent, scale and rotation, converts between device and map
//!   coordinates, handles navigation input and draws the layers with a [`Painter`](render::Painter).
//!   Layers in a CRS different from the project CRS are reprojected on the fly with
//!   [`CoordinateTransform`](hgis_types::CoordinateTransform).
//! * [`AppSettings`](settings::AppSettings) are the persisted application settings.
//!
//! ```no_run
//! use hgis::{LayerManager, MapCanvas, VectorLayer};
//! use hgis::hgis_types::{Crs, Size};
//!
//! # fn main() -> Result<(), hgis::error::ProviderError> {
//! let mut manager = LayerManager::new();
//! manager.set_project_crs(Crs::korea_2000_central_belt());
//! manager.add_layer(Box::new(VectorLayer::from_file("data/sites.geojson")?));
//!
//! let mut canvas = MapCanvas::default();
//! canvas.set_viewport_size(Size::new(800.0, 600.0));
//! canvas.zoom_to_full_extent(&manager);
//! # Ok(())
//! # }
//! ```

#![warn(clippy::unwrap_used)]
#![warn(missing_docs)]

pub mod canvas;
mod color;
pub mod error;
pub mod layer;
pub mod map;
mod messenger;
pub mod provider;
pub mod render;
pub mod settings;
pub mod signal;

pub use canvas::MapCanvas;
pub use color::Color;
pub use layer::{MapLayer, VectorLayer};
pub use map::LayerManager;
pub use messenger::Messenger;

// Reexport hgis_types
pub use hgis_types;
