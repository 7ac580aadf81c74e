use std::path::Path;

use serde_derive::{Deserialize, Serialize};

use crate::error::CloudError;

pub const DEFAULT_WINDOW_TITLE: &str = "3D Point Cloud";

/// How points are colored by the viewer.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointColorMode {
    /// Same RGB color, components in [0, 1], for all points.
    Fixed([f32; 3]),
    /// Color ramp over the Z coordinate of the scene bounds.
    ZGradient,
    /// The point cloud's own colors. Falls back to `ZGradient` when it has none.
    PerPoint,
}

/// Viewer configuration. Every field has a default, so JSON files may set only a few of them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerSettings {
    pub window_title: String,
    /// Initial window size in pixels: width, height.
    pub window_size: [u32; 2],
    /// Point splat side in pixels.
    pub point_size: f32,
    /// Clear color, RGB in [0, 1].
    pub background: [f32; 3],
    pub color_mode: PointColorMode,
}

impl Default for ViewerSettings {
    fn default() -> Self {
        Self {
            window_title: DEFAULT_WINDOW_TITLE.to_string(),
            window_size: [1024, 768],
            point_size: 3.0,
            background: [1.0, 1.0, 1.0],
            color_mode: PointColorMode::PerPoint,
        }
    }
}

impl ViewerSettings {
    pub fn from_json_str(json: &str) -> Result<Self, CloudError> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_json_file<P>(filepath: P) -> Result<Self, CloudError>
    where
        P: AsRef<Path>,
    {
        let contents = std::fs::read_to_string(filepath.as_ref())?;
        log::debug!("Loading viewer settings from {}", filepath.as_ref().display());
        Self::from_json_str(&contents)
    }

    pub fn validate(&self) -> Result<(), CloudError> {
        if !(self.point_size.is_finite() && self.point_size > 0.0) {
            return Err(CloudError::invalid_parameter(format!(
                "point_size must be positive, got {}",
                self.point_size
            )));
        }
        if self.window_size.iter().any(|s| *s == 0) {
            return Err(CloudError::invalid_parameter(format!(
                "window_size must be non-zero, got {:?}",
                self.window_size
            )));
        }
        Ok(())
    }
}
