use super::{Feature, FeatureProvider};
use crate::error::ProviderError;
use hgis_types::{Crs, Rect};

/// Provider keeping its features in memory.
///
/// Used for layers built by the application itself (e.g. search results) and in tests. The
/// provider is open from creation until [`FeatureProvider::close`] is called.
#[derive(Debug, Clone)]
pub struct MemoryProvider {
    uri: String,
    name: String,
    geometry_type: String,
    epsg: u32,
    features: Vec<Feature>,
    open: bool,
}

impl MemoryProvider {
    /// Creates an open provider with the given features.
    pub fn new(
        name: &str,
        geometry_type: &str,
        epsg: u32,
        features: Vec<Feature>,
    ) -> Self {
        Self {
            uri: format!("memory:{name}"),
            name: name.to_string(),
            geometry_type: geometry_type.to_string(),
            epsg,
            features,
            open: true,
        }
    }

    /// Appends a feature.
    pub fn push(&mut self, feature: Feature) {
        self.features.push(feature);
    }
}

impl FeatureProvider for MemoryProvider {
    fn uri(&self) -> &str {
        &self.uri
    }

    fn open(&mut self) -> Result<(), ProviderError> {
        self.open = true;
        Ok(())
    }

    fn close(&mut self) {
        self.open = false;
    }

    fn is_valid(&self) -> bool {
        self.open
    }

    fn layer_name(&self) -> &str {
        &self.name
    }

    fn feature_count(&self) -> usize {
        if self.open {
            self.features.len()
        } else {
            0
        }
    }

    fn fields(&self) -> Vec<String> {
        let mut fields: Vec<String> = vec![];
        for feature in &self.features {
            for name in feature.attributes.keys() {
                if !fields.contains(name) {
                    fields.push(name.clone());
                }
            }
        }
        fields
    }

    fn geometry_type(&self) -> &str {
        &self.geometry_type
    }

    fn extent(&self) -> Option<Rect> {
        if !self.open {
            return None;
        }

        self.features
            .iter()
            .filter_map(|feature| feature.bounding_rect())
            .reduce(|acc, rect| acc.merge(rect))
    }

    fn crs_wkt(&self) -> Option<String> {
        let crs = Crs::from_epsg(self.epsg).ok()?;
        Some(crs.to_wkt().to_string())
    }

    fn epsg_code(&self) -> u32 {
        self.epsg
    }

    fn read_features(&self) -> Vec<Feature> {
        if self.open {
            self.features.clone()
        } else {
            vec![]
        }
    }

    fn error_message(&self) -> &str {
        if self.open {
            ""
        } else {
            "data source is not open"
        }
    }

    fn reopen(&self) -> Result<Box<dyn FeatureProvider>, ProviderError> {
        let mut provider = self.clone();
        provider.open()?;
        Ok(Box::new(provider))
    }
}
