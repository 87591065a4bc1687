//! `geotrace render`: locate addresses (or traced hops) and draw them as SVG.

use std::path::PathBuf;

use anyhow::Context;
use geotrace_core::AppConfig;
use geotrace_map::{MapElement, MapImage, MapLine, MapPoint, MapRenderer, PointFlags, Rgb};

use crate::locate::{locate_addresses, parse_subjects, Location};
use crate::presets::load_map;
use crate::svg::SvgCanvas;
use crate::trace::{routable_subjects, trace_route};

#[derive(Debug)]
pub(crate) struct RenderOptions {
    pub output: PathBuf,
    pub width: i32,
    pub height: i32,
    pub map: Option<String>,
    pub curved: bool,
}

/// Map elements for `locations`, skipping those without coordinates.
///
/// Unrelated addresses become labelled points. A path becomes one line per
/// consecutive pair of hops with only its two ends labelled.
pub(crate) fn build_elements(locations: &[Location], path: bool, curved: bool) -> Vec<MapElement> {
    let mut points: Vec<MapPoint> = locations
        .iter()
        .filter_map(|location| MapPoint::from_location(location, Rgb::RED))
        .collect();

    if !path || points.len() < 2 {
        return points
            .into_iter()
            .map(|p| {
                MapElement::Point(p.with_flags(PointFlags {
                    show_label: true,
                    endpoint: path,
                }))
            })
            .collect();
    }

    let last = points.len() - 1;
    for index in [0, last] {
        points[index].color = Rgb::GREEN;
        points[index].flags = PointFlags {
            show_label: true,
            endpoint: true,
        };
    }

    points
        .windows(2)
        .map(|pair| {
            let line = MapLine::new(pair[0].clone(), pair[1].clone(), Rgb::BLUE);
            if curved {
                MapElement::CurvedLine(line)
            } else {
                MapElement::Line(line)
            }
        })
        .collect()
}

/// Draws `elements` over the whole of `image`; returns the document and how many elements were visible.
pub(crate) fn render_svg(
    image: MapImage,
    elements: Vec<MapElement>,
    width: i32,
    height: i32,
) -> anyhow::Result<(String, usize)> {
    anyhow::ensure!(
        width > 0 && height > 0,
        "output must be at least 1x1 pixels, got {width}x{height}"
    );
    let region = image.full_region();
    let mut renderer = MapRenderer::new(image);
    renderer.extend(elements);

    let mut canvas = SvgCanvas::new(width, height);
    let drawn = renderer.render(&mut canvas, region, width, height);
    Ok((canvas.finish(), drawn))
}

pub(crate) async fn run_render(
    config: &AppConfig,
    addresses: &[String],
    trace: Option<&str>,
    options: &RenderOptions,
) -> anyhow::Result<()> {
    // Fail on a bad map name before spending time on lookups.
    let image = load_map(config, options.map.as_deref())?;

    let (subjects, path) = match trace {
        Some(target) => (routable_subjects(&trace_route(target).await?)?, true),
        None => {
            anyhow::ensure!(!addresses.is_empty(), "give at least one address or --trace <host>");
            (parse_subjects(addresses)?, false)
        }
    };

    let located = locate_addresses(config, &subjects, true).await?;
    let unknown = located.iter().filter(|l| !l.has_valid_coordinates()).count();
    if unknown > 0 {
        tracing::warn!(unknown, total = located.len(), "some addresses could not be located");
    }

    let elements = build_elements(&located, path, options.curved);
    let (svg, drawn) = render_svg(image, elements, options.width, options.height)?;
    std::fs::write(&options.output, svg)
        .with_context(|| format!("writing {}", options.output.display()))?;

    println!(
        "wrote {} ({} of {} located, {drawn} elements drawn)",
        options.output.display(),
        located.len() - unknown,
        located.len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use geotrace_core::{builtin_presets, StringSubject};

    use super::*;

    fn location(ip: &str, lat: f64, long: f64) -> Location {
        Location::new(StringSubject::new(ip).unwrap(), lat, long)
    }

    fn hops() -> Vec<Location> {
        vec![
            location("62.40.98.1", 52.37, 4.89),
            Location::invalid(StringSubject::new("62.40.98.2").unwrap()),
            location("4.69.143.1", 40.71, -74.0),
            location("8.8.8.8", 37.4, -122.1),
        ]
    }

    fn miller() -> MapImage {
        let presets = builtin_presets();
        MapImage::from_preset(&presets[0]).unwrap()
    }

    #[test]
    fn separate_addresses_become_labelled_points() {
        let elements = build_elements(&hops(), false, false);
        assert_eq!(elements.len(), 3);
        for element in &elements {
            let MapElement::Point(point) = element else {
                panic!("expected a point, got {element:?}");
            };
            assert!(point.flags.show_label);
            assert!(!point.flags.endpoint);
        }
    }

    #[test]
    fn path_joins_consecutive_located_hops() {
        let elements = build_elements(&hops(), true, false);
        assert_eq!(elements.len(), 2);

        let MapElement::Line(first) = &elements[0] else {
            panic!("expected a line");
        };
        assert_eq!(first.start.label(), "62.40.98.1");
        assert!(first.start.flags.endpoint);
        assert_eq!(first.start.color, Rgb::GREEN);
        assert_eq!(first.end.label(), "4.69.143.1");
        assert!(!first.end.flags.show_label);

        let MapElement::Line(second) = &elements[1] else {
            panic!("expected a line");
        };
        assert_eq!(second.end.label(), "8.8.8.8");
        assert!(second.end.flags.endpoint);
    }

    #[test]
    fn curved_flag_selects_curved_lines() {
        let elements = build_elements(&hops(), true, true);
        assert!(elements.iter().all(|e| matches!(e, MapElement::CurvedLine(_))));
    }

    #[test]
    fn single_hop_path_is_a_point() {
        let elements = build_elements(&hops()[3..], true, false);
        assert!(matches!(&elements[..], [MapElement::Point(p)] if p.flags.endpoint));
    }

    #[test]
    fn renders_points_and_lines_into_svg() {
        let located = [location("62.40.98.1", 52.37, 4.89), location("8.8.8.8", 37.4, -122.1)];

        let (svg, drawn) = render_svg(miller(), build_elements(&located, false, false), 800, 600).unwrap();
        assert_eq!(drawn, 2);
        assert_eq!(svg.matches("<circle").count(), 2);
        assert_eq!(svg.matches("<text").count(), 2);
        assert_eq!(svg.matches("<line").count(), 0);
        assert!(svg.contains("<title>miller (1000x1000+0+0)</title>"));

        let (svg, drawn) = render_svg(miller(), build_elements(&located, true, false), 800, 600).unwrap();
        assert_eq!(drawn, 1);
        assert_eq!(svg.matches("<line").count(), 1);
        assert_eq!(svg.matches("<circle").count(), 2);

        let (svg, _) = render_svg(miller(), build_elements(&located, true, true), 800, 600).unwrap();
        assert!(svg.matches("<line").count() > 1);
    }

    #[test]
    fn zero_sized_output_is_rejected() {
        assert!(render_svg(miller(), Vec::new(), 0, 10).is_err());
    }
}
