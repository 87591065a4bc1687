use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Map projections a preset can select.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectionKind {
    Miller,
    Robinson,
    Equirectangular,
}

impl std::fmt::Display for ProjectionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProjectionKind::Miller => write!(f, "miller"),
            ProjectionKind::Robinson => write!(f, "robinson"),
            ProjectionKind::Equirectangular => write!(f, "equirectangular"),
        }
    }
}

/// A map image together with the calibration that lines it up with its projection.
///
/// `origin_*_percent` locate 0°/0° on the image relative to its size;
/// `scale_*` stretch projection output onto the image and are tuned by hand
/// for each image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapPreset {
    pub name: String,
    pub projection: ProjectionKind,
    pub width: u32,
    pub height: u32,
    pub origin_x_percent: f64,
    pub origin_y_percent: f64,
    pub scale_x: f64,
    pub scale_y: f64,
}

#[derive(Debug, Deserialize)]
pub struct MapsFile {
    pub maps: Vec<MapPreset>,
}

/// The two world maps shipped with the application.
#[must_use]
pub fn builtin_presets() -> Vec<MapPreset> {
    vec![
        MapPreset {
            name: "miller".to_string(),
            projection: ProjectionKind::Miller,
            width: 1000,
            height: 1000,
            origin_x_percent: 0.5,
            origin_y_percent: 0.500_954_198_473_282_5,
            scale_x: 158.5,
            scale_y: 213.0,
        },
        MapPreset {
            name: "robinson".to_string(),
            projection: ProjectionKind::Robinson,
            width: 1920,
            height: 974,
            origin_x_percent: 0.474_479_166_666_666_7,
            origin_y_percent: 0.5,
            scale_x: 186.0,
            scale_y: 360.0,
        },
    ]
}

/// Load and validate additional map presets from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_map_presets(path: &Path) -> Result<MapsFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::MapsFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let maps_file: MapsFile = serde_yaml::from_str(&content)?;

    validate_presets(&maps_file)?;

    Ok(maps_file)
}

fn validate_presets(maps_file: &MapsFile) -> Result<(), ConfigError> {
    let mut seen_names = HashSet::new();

    for preset in &maps_file.maps {
        if preset.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "map name must be non-empty".to_string(),
            ));
        }

        if !seen_names.insert(preset.name.to_lowercase()) {
            return Err(ConfigError::Validation(format!(
                "duplicate map name: '{}'",
                preset.name
            )));
        }

        if preset.width == 0 || preset.height == 0 {
            return Err(ConfigError::Validation(format!(
                "map '{}' must have a non-zero width and height",
                preset.name
            )));
        }

        for (label, value) in [
            ("origin_x_percent", preset.origin_x_percent),
            ("origin_y_percent", preset.origin_y_percent),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Validation(format!(
                    "map '{}' has {label} {value}; must be within 0..=1",
                    preset.name
                )));
            }
        }

        if !(preset.scale_x > 0.0 && preset.scale_y > 0.0) {
            return Err(ConfigError::Validation(format!(
                "map '{}' must have positive scale factors",
                preset.name
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "maps_test.rs"]
mod tests;
