use hgis_types::Rect;
use serde::{Deserialize, Serialize};

/// Configuration of the [`MapCanvas`](super::MapCanvas) navigation.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    zoom_factor: f64,
    wheel_zoom_factor: f64,
    min_scale: f64,
    max_scale: f64,
    full_extent_margin: f64,
    default_extent: Rect,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            zoom_factor: 1.5,
            wheel_zoom_factor: 1.2,
            min_scale: 1e-6,
            max_scale: 1e7,
            full_extent_margin: 0.1,
            default_extent: Rect::new(-180.0, -90.0, 180.0, 90.0),
        }
    }
}

impl CanvasConfig {
    /// Factor the scale is divided by on zoom in and multiplied by on zoom out.
    pub fn zoom_factor(&self) -> f64 {
        self.zoom_factor
    }

    /// Sets the zoom factor. Values not greater than 1 are ignored.
    pub fn with_zoom_factor(mut self, factor: f64) -> Self {
        self.set_zoom_factor(factor);
        self
    }

    /// Sets the zoom factor. Values not greater than 1 are ignored.
    pub fn set_zoom_factor(&mut self, factor: f64) {
        if factor > 1.0 {
            self.zoom_factor = factor;
        }
    }

    /// Zoom factor of a single mouse wheel step.
    pub fn wheel_zoom_factor(&self) -> f64 {
        self.wheel_zoom_factor
    }

    /// Sets the zoom factor of a mouse wheel step. Values not greater than 1 are ignored.
    pub fn with_wheel_zoom_factor(mut self, factor: f64) -> Self {
        self.set_wheel_zoom_factor(factor);
        self
    }

    /// Sets the zoom factor of a mouse wheel step. Values not greater than 1 are ignored.
    pub fn set_wheel_zoom_factor(&mut self, factor: f64) {
        if factor > 1.0 {
            self.wheel_zoom_factor = factor;
        }
    }

    /// Minimum allowed scale in map units per pixel (the most zoomed in state).
    pub fn min_scale(&self) -> f64 {
        self.min_scale
    }

    /// Sets minimum allowed scale in map units per pixel.
    pub fn with_min_scale(mut self, scale: f64) -> Self {
        self.min_scale = scale;
        self
    }

    /// Sets minimum allowed scale in map units per pixel.
    pub fn set_min_scale(&mut self, scale: f64) {
        self.min_scale = scale;
    }

    /// Maximum allowed scale in map units per pixel (the most zoomed out state).
    pub fn max_scale(&self) -> f64 {
        self.max_scale
    }

    /// Sets maximum allowed scale in map units per pixel.
    pub fn with_max_scale(mut self, scale: f64) -> Self {
        self.max_scale = scale;
        self
    }

    /// Sets maximum allowed scale in map units per pixel.
    pub fn set_max_scale(&mut self, scale: f64) {
        self.max_scale = scale;
    }

    /// Fraction of the full extent size added on each side when zooming to the full extent.
    pub fn full_extent_margin(&self) -> f64 {
        self.full_extent_margin
    }

    /// Sets the full extent margin. Negative values are treated as `0.0`.
    pub fn with_full_extent_margin(mut self, margin: f64) -> Self {
        self.set_full_extent_margin(margin);
        self
    }

    /// Sets the full extent margin. Negative values are treated as `0.0`.
    pub fn set_full_extent_margin(&mut self, margin: f64) {
        self.full_extent_margin = margin.max(0.0);
    }

    /// Extent shown by a new canvas.
    pub fn default_extent(&self) -> Rect {
        self.default_extent
    }

    /// Sets the extent shown by a new canvas.
    pub fn with_default_extent(mut self, extent: Rect) -> Self {
        self.default_extent = extent;
        self
    }

    /// Sets the extent shown by a new canvas.
    pub fn set_default_extent(&mut self, extent: Rect) {
        self.default_extent = extent;
    }

    /// Limits the scale to the configured range.
    pub fn clamp_scale(&self, scale: f64) -> f64 {
        if scale < self.min_scale {
            self.min_scale
        } else if scale > self.max_scale {
            self.max_scale
        } else {
            scale
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = CanvasConfig::default();
        assert_eq!(config.zoom_factor(), 1.5);
        assert_eq!(config.wheel_zoom_factor(), 1.2);
        assert_eq!(config.full_extent_margin(), 0.1);
        assert_eq!(
            config.default_extent(),
            Rect::new(-180.0, -90.0, 180.0, 90.0)
        );
    }

    #[test]
    fn invalid_factors_are_ignored() {
        let config = CanvasConfig::default()
            .with_zoom_factor(0.5)
            .with_wheel_zoom_factor(2.0)
            .with_full_extent_margin(-1.0);
        assert_eq!(config.zoom_factor(), 1.5);
        assert_eq!(config.wheel_zoom_factor(), 2.0);
        assert_eq!(config.full_extent_margin(), 0.0);
    }

    #[test]
    fn scale_is_clamped() {
        let config = CanvasConfig::default()
            .with_min_scale(1.0)
            .with_max_scale(100.0);
        assert_eq!(config.clamp_scale(0.5), 1.0);
        assert_eq!(config.clamp_scale(50.0), 50.0);
        assert_eq!(config.clamp_scale(1000.0), 100.0);
    }

    #[test]
    fn partial_json_uses_defaults() {
        let config: CanvasConfig = serde_json::from_str(r#"{"zoom_factor": 2.0}"#).unwrap();
        assert_eq!(config.zoom_factor(), 2.0);
        assert_eq!(config.max_scale(), 1e7);
    }
}
