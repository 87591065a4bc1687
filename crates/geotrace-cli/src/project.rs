//! `geotrace project`: show where a coordinate lands on a map and viewport.

use geotrace_core::{AppConfig, Coordinate};
use geotrace_map::{ImageProjection, MapImage, PixelPoint, Region, ScreenPoint, ViewProjection};

use crate::presets::load_map;

#[derive(Debug, Clone, Copy)]
pub(crate) struct Projected {
    pub region: Region,
    pub image_pixel: PixelPoint,
    pub viewport: ScreenPoint,
    pub on_map: bool,
    /// The viewport pixel mapped back to a coordinate, when the projection can invert.
    pub inverse: Option<Coordinate>,
}

/// Projects `coordinate` onto the whole of `image` shown in a `width` x `height` viewport.
pub(crate) fn project_coordinate(
    image: &MapImage,
    coordinate: Coordinate,
    width: i32,
    height: i32,
) -> anyhow::Result<Projected> {
    anyhow::ensure!(
        width > 0 && height > 0,
        "viewport must be at least 1x1 pixels, got {width}x{height}"
    );
    let region = image.full_region();
    let projection = ImageProjection::new(image, region, width, height);
    let image_pixel = image.to_image_pixel(&coordinate);
    let viewport = projection.project(&coordinate);
    Ok(Projected {
        region,
        image_pixel,
        viewport,
        on_map: region.contains(image_pixel),
        inverse: projection.unproject(viewport),
    })
}

pub(crate) fn run_project(
    config: &AppConfig,
    lat: f64,
    long: f64,
    width: i32,
    height: i32,
    map: Option<&str>,
) -> anyhow::Result<()> {
    let image = load_map(config, map)?;
    let coordinate = Coordinate::new(lat, long);
    let projected = project_coordinate(&image, coordinate, width, height)?;

    println!(
        "map:         {} ({}, {}x{})",
        image.name(),
        image.projection().name(),
        image.width(),
        image.height()
    );
    println!("coordinate:  {coordinate}");
    println!(
        "image pixel: {:.2}, {:.2}{}",
        projected.image_pixel.x,
        projected.image_pixel.y,
        if projected.on_map { "" } else { " (outside the image)" }
    );
    println!(
        "viewport:    {}, {} ({width}x{height}, region {})",
        projected.viewport.x, projected.viewport.y, projected.region
    );
    match projected.inverse {
        Some(back) => println!("inverse:     {back}"),
        None => println!("inverse:     not supported by {}", image.projection().name()),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use geotrace_core::builtin_presets;

    use super::*;

    fn preset_image(name: &str) -> MapImage {
        let presets = builtin_presets();
        let preset = presets.iter().find(|p| p.name == name).unwrap();
        MapImage::from_preset(preset).unwrap()
    }

    #[test]
    fn miller_preset_places_mountain_view() {
        let image = preset_image("miller");
        let projected = project_coordinate(&image, Coordinate::new(37.4, -122.1), 800, 600).unwrap();

        assert!((projected.viewport.x - 130).abs() <= 1, "{:?}", projected.viewport);
        assert!((projected.viewport.y - 213).abs() <= 1, "{:?}", projected.viewport);
        assert!(projected.on_map);
        assert_eq!(projected.region, Region::new(0, 0, 1000, 1000));

        let back = projected.inverse.unwrap();
        assert!((back.latitude_deg - 37.4).abs() < 1.0, "{back}");
        assert!((back.longitude_deg + 122.1).abs() < 1.0, "{back}");
    }

    #[test]
    fn robinson_has_no_inverse() {
        let image = preset_image("robinson");
        let projected = project_coordinate(&image, Coordinate::new(48.85, 2.35), 800, 600).unwrap();
        assert!(projected.inverse.is_none());
        assert!(projected.on_map);
    }

    #[test]
    fn empty_viewport_is_rejected() {
        let image = preset_image("miller");
        assert!(project_coordinate(&image, Coordinate::ZERO, 0, 600).is_err());
    }
}
