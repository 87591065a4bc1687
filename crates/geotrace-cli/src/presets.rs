//! Resolving a map preset name to a calibrated [`MapImage`].

use anyhow::Context;
use geotrace_core::{builtin_presets, load_map_presets, AppConfig, MapPreset};
use geotrace_map::MapImage;

/// Built-in presets followed by those from `GEOTRACE_MAPS_PATH`. A file preset
/// replaces a built-in one of the same name.
pub(crate) fn available_presets(config: &AppConfig) -> anyhow::Result<Vec<MapPreset>> {
    let mut presets = builtin_presets();
    if let Some(path) = &config.maps_path {
        let file = load_map_presets(path)
            .with_context(|| format!("loading map presets from {}", path.display()))?;
        for preset in file.maps {
            presets.retain(|p| !p.name.eq_ignore_ascii_case(&preset.name));
            presets.push(preset);
        }
    }
    Ok(presets)
}

/// Finds `name` (case-insensitive) among `presets`.
pub(crate) fn find_preset<'a>(presets: &'a [MapPreset], name: &str) -> anyhow::Result<&'a MapPreset> {
    presets
        .iter()
        .find(|p| p.name.eq_ignore_ascii_case(name))
        .ok_or_else(|| {
            let known: Vec<&str> = presets.iter().map(|p| p.name.as_str()).collect();
            anyhow::anyhow!("unknown map '{name}' (available: {})", known.join(", "))
        })
}

/// The map named `requested`, or the configured default map.
pub(crate) fn load_map(config: &AppConfig, requested: Option<&str>) -> anyhow::Result<MapImage> {
    let presets = available_presets(config)?;
    let name = requested.unwrap_or(&config.map_name);
    let preset = find_preset(&presets, name)?;
    let image = MapImage::from_preset(preset)
        .with_context(|| format!("map preset '{}' is not usable", preset.name))?;
    tracing::debug!(map = image.name(), width = image.width(), height = image.height(), "map selected");
    Ok(image)
}
