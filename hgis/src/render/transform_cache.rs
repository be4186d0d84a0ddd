use hgis_types::crs::CrsKey;
use hgis_types::{CoordinateTransform, Crs};
use quick_cache::sync::Cache;
use std::sync::Arc;

/// Number of transformations kept by default.
const DEFAULT_CAPACITY: usize = 64;

/// Cache of coordinate transformations between pairs of CRS.
///
/// Building a transformation pipeline is much more expensive than running it, so the layer
/// manager and the map canvas keep the transformations they use here instead of creating them
/// for every extent or render pass.
pub struct TransformCache {
    capacity: usize,
    transforms: Cache<(CrsKey, CrsKey), Arc<CoordinateTransform>>,
}

impl TransformCache {
    /// Creates a cache holding up to `capacity` transformations.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            transforms: Cache::new(capacity),
        }
    }

    /// Returns the transformation from `source` to `destination`, creating it if it is not cached.
    pub fn get(&self, source: &Crs, destination: &Crs) -> Arc<CoordinateTransform> {
        let key = (source.key(), destination.key());
        if let Some(transform) = self.transforms.get(&key) {
            return transform;
        }

        let transform = Arc::new(CoordinateTransform::new(
            source.clone(),
            destination.clone(),
        ));
        self.transforms.insert(key, transform.clone());
        transform
    }

    /// Number of cached transformations.
    pub fn len(&self) -> usize {
        self.transforms.len()
    }

    /// Returns true if no transformations are cached.
    pub fn is_empty(&self) -> bool {
        self.transforms.len() == 0
    }

    /// Drops all cached transformations.
    pub fn clear(&mut self) {
        self.transforms = Cache::new(self.capacity);
    }
}

impl Default for TransformCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl std::fmt::Debug for TransformCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransformCache")
            .field("len", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transforms_are_reused() {
        let mut cache = TransformCache::default();
        assert!(cache.is_empty());

        let first = cache.get(&Crs::wgs84(), &Crs::korea_2000_central_belt());
        let second = cache.get(&Crs::wgs84(), &Crs::korea_2000_central_belt());
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);

        let reverse = cache.get(&Crs::korea_2000_central_belt(), &Crs::wgs84());
        assert!(!Arc::ptr_eq(&first, &reverse));
        assert_eq!(cache.len(), 2);

        cache.clear();
        assert!(cache.is_empty());
    }
}
