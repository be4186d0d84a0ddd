//! Ordered collection of the map layers and the project CRS.

mod layer_manager;

pub use layer_manager::{LayerManager, LayerManagerEvent};
