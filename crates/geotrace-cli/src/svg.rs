//! A [`Canvas`] that records drawing calls as an SVG document.

use std::fmt::Write as _;

use geotrace_core::Coordinate;
use geotrace_map::{Canvas, ImageProjection, MapImage, Region, Rgb, ScreenPoint, ViewProjection};

const BACKGROUND: &str = "#dbe9f4";
const GRID: &str = "#b7cbdc";
const GRID_STEP_DEG: usize = 30;
const GRID_SAMPLE_DEG: usize = 10;

#[derive(Debug)]
pub(crate) struct SvgCanvas {
    width: i32,
    height: i32,
    body: String,
}

impl SvgCanvas {
    pub(crate) fn new(width: i32, height: i32) -> Self {
        Self {
            width,
            height,
            body: String::new(),
        }
    }

    /// The finished document.
    pub(crate) fn finish(self) -> String {
        let (w, h) = (self.width, self.height);
        format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
             <svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\">\n\
             {}</svg>\n",
            self.body
        )
    }
}

fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

impl Canvas for SvgCanvas {
    fn draw_line(&mut self, from: ScreenPoint, to: ScreenPoint, color: Rgb) {
        let _ = writeln!(
            self.body,
            "  <line x1=\"{}\" y1=\"{}\" x2=\"{}\" y2=\"{}\" stroke=\"{}\" stroke-width=\"1.5\"/>",
            from.x,
            from.y,
            to.x,
            to.y,
            color.to_hex()
        );
    }

    fn fill_circle(&mut self, center: ScreenPoint, radius: i32, color: Rgb) {
        let _ = writeln!(
            self.body,
            "  <circle cx=\"{}\" cy=\"{}\" r=\"{radius}\" fill=\"{}\"/>",
            center.x,
            center.y,
            color.to_hex()
        );
    }

    fn draw_text(&mut self, at: ScreenPoint, text: &str, color: Rgb) {
        let _ = writeln!(
            self.body,
            "  <text x=\"{}\" y=\"{}\" font-family=\"sans-serif\" font-size=\"11\" fill=\"{}\">{}</text>",
            at.x,
            at.y,
            color.to_hex(),
            escape_xml(text)
        );
    }

    /// No raster here: a plain background with a lat/long graticule drawn through the image projection.
    fn draw_map(&mut self, image: &MapImage, region: Region, width: i32, height: i32) {
        let _ = writeln!(
            self.body,
            "  <title>{} ({region})</title>\n  <rect width=\"{width}\" height=\"{height}\" fill=\"{BACKGROUND}\"/>",
            escape_xml(image.name())
        );

        let projection = ImageProjection::new(image, region, width, height);
        let mut graticule = String::new();
        let mut polyline = |points: Vec<ScreenPoint>| {
            let coords: Vec<String> = points.iter().map(|p| format!("{},{}", p.x, p.y)).collect();
            let _ = writeln!(graticule, "    <polyline points=\"{}\"/>", coords.join(" "));
        };
        for lat in (-90..=90).step_by(GRID_STEP_DEG) {
            polyline(
                (-180..=180)
                    .step_by(GRID_SAMPLE_DEG)
                    .map(|long| graticule_point(&projection, lat, long))
                    .collect(),
            );
        }
        for long in (-180..=180).step_by(GRID_STEP_DEG) {
            polyline(
                (-90..=90)
                    .step_by(GRID_SAMPLE_DEG)
                    .map(|lat| graticule_point(&projection, lat, long))
                    .collect(),
            );
        }
        let _ = write!(
            self.body,
            "  <g fill=\"none\" stroke=\"{GRID}\" stroke-width=\"0.5\">\n{graticule}  </g>\n"
        );
    }
}

fn graticule_point(projection: &ImageProjection<'_>, lat: i32, long: i32) -> ScreenPoint {
    projection.project(&Coordinate::new(f64::from(lat), f64::from(long)))
}
