use serde::Deserialize;

use crate::error::Gpx2SceneError;

/// Options for projecting a track into scene space.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizeOptions {
    /// How elevation maps to the vertical axis (default: flat)
    #[serde(default)]
    pub elevation_mode: ElevationMode,

    /// Metres per scene unit in elevationScaled mode (default: 5000)
    #[serde(default = "default_elevation_divisor")]
    pub elevation_divisor: f64,

    /// Uniform zoom applied to every axis (default: 100)
    #[serde(default = "default_scale_factor")]
    pub scale_factor: f64,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            elevation_mode: ElevationMode::default(),
            elevation_divisor: default_elevation_divisor(),
            scale_factor: default_scale_factor(),
        }
    }
}

impl NormalizeOptions {
    pub fn validate(&self) -> Result<(), Gpx2SceneError> {
        if !self.elevation_divisor.is_finite() || self.elevation_divisor <= 0.0 {
            return Err(Gpx2SceneError::InvalidOption {
                option: "elevationDivisor",
                value: self.elevation_divisor,
            });
        }
        if !self.scale_factor.is_finite() {
            return Err(Gpx2SceneError::InvalidOption {
                option: "scaleFactor",
                value: self.scale_factor,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ElevationMode {
    /// Every point sits at y = 0.
    #[default]
    Flat,
    /// y = (ele - minEle) / elevationDivisor
    ElevationScaled,
}

fn default_elevation_divisor() -> f64 {
    5000.0
}

fn default_scale_factor() -> f64 {
    100.0
}
