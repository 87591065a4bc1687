//! Drawing map elements onto an abstract canvas.

use crate::element::{ElementKind, MapElement, MapLine, MapPoint, Rgb};
use crate::geometry::{PixelPoint, ScreenPoint};
use crate::image_projection::{ImageProjection, ViewProjection};
use crate::map_image::MapImage;
use crate::region::Region;

const POINT_RADIUS: i32 = 3;
const LABEL_OFFSET: i32 = 5;

// Below these distances a curve looks worse than a straight line.
const CURVE_MIN_LENGTH: f64 = 40.0;
const CURVE_MIN_AXIS_DELTA: f64 = 20.0;
const CURVE_BULGE: f64 = -10.0;
const CURVE_STEPS: u32 = 10;

/// A drawing surface. Coordinates are viewport pixels.
pub trait Canvas {
    fn draw_line(&mut self, from: ScreenPoint, to: ScreenPoint, color: Rgb);
    fn fill_circle(&mut self, center: ScreenPoint, radius: i32, color: Rgb);
    fn draw_text(&mut self, at: ScreenPoint, text: &str, color: Rgb);

    /// Draws the visible part of the map image. Canvases without raster support may skip it.
    fn draw_map(&mut self, _image: &MapImage, _region: Region, _width: i32, _height: i32) {}
}

pub trait ElementRenderer: Sync {
    fn render(&self, element: &MapElement, projection: &dyn ViewProjection, canvas: &mut dyn Canvas);
}

#[must_use]
pub fn renderer_for(kind: ElementKind) -> &'static dyn ElementRenderer {
    match kind {
        ElementKind::Point => &PointRenderer,
        ElementKind::Line => &LineRenderer,
        ElementKind::CurvedLine => &CurvedLineRenderer,
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PointRenderer;

impl PointRenderer {
    fn draw(point: &MapPoint, canvas: &mut dyn Canvas) {
        let at = point.screen_point();
        canvas.fill_circle(at, POINT_RADIUS, point.color);
        if point.flags.show_label {
            let label_at = ScreenPoint::new(at.x + LABEL_OFFSET, at.y - LABEL_OFFSET);
            canvas.draw_text(label_at, point.label(), point.color);
        }
    }
}

impl ElementRenderer for PointRenderer {
    fn render(&self, element: &MapElement, projection: &dyn ViewProjection, canvas: &mut dyn Canvas) {
        if let MapElement::Point(point) = element {
            element.ensure_coordinates(projection);
            Self::draw(point, canvas);
        }
    }
}

fn line_of(element: &MapElement) -> Option<&MapLine> {
    match element {
        MapElement::Line(line) | MapElement::CurvedLine(line) => Some(line),
        MapElement::Point(_) => None,
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LineRenderer;

impl ElementRenderer for LineRenderer {
    fn render(&self, element: &MapElement, projection: &dyn ViewProjection, canvas: &mut dyn Canvas) {
        let Some(line) = line_of(element) else {
            return;
        };
        element.ensure_coordinates(projection);
        PointRenderer::draw(&line.start, canvas);
        PointRenderer::draw(&line.end, canvas);
        canvas.draw_line(line.start.screen_point(), line.end.screen_point(), line.color);
    }
}

/// Draws a gentle arc between two points by interpolating a quadratic
/// through both endpoints and a control point just off the midpoint.
#[derive(Debug, Clone, Copy, Default)]
pub struct CurvedLineRenderer;

impl CurvedLineRenderer {
    fn draw_curve(from: ScreenPoint, to: ScreenPoint, color: Rgb, canvas: &mut dyn Canvas) {
        let p0 = PixelPoint::new(f64::from(from.x), f64::from(from.y));
        let p1 = PixelPoint::new(f64::from(to.x), f64::from(to.y));
        let vx = p1.x - p0.x;
        let vy = p1.y - p0.y;

        if vx.hypot(vy) <= CURVE_MIN_LENGTH
            || vx.abs() <= CURVE_MIN_AXIS_DELTA
            || vy.abs() <= CURVE_MIN_AXIS_DELTA
        {
            canvas.draw_line(from, to, color);
            return;
        }

        let length = vy.hypot(vx);
        let control = PixelPoint::new(
            (p0.x + p1.x) / 2.0 + vy / length * CURVE_BULGE,
            (p0.y + p1.y) / 2.0 - vx / length * CURVE_BULGE,
        );

        let mut nodes = [p0, control, p1];
        nodes.sort_by(|a, b| a.x.total_cmp(&b.x));
        if nodes.windows(2).any(|w| w[0].x.total_cmp(&w[1].x).is_eq()) {
            canvas.draw_line(from, to, color);
            return;
        }

        let x_min = nodes[0].x;
        let step = (nodes[2].x - x_min) / f64::from(CURVE_STEPS);
        let mut previous = PixelPoint::new(x_min, neville(&nodes, x_min));
        for i in 1..=CURVE_STEPS {
            let x = x_min + f64::from(i) * step;
            let current = PixelPoint::new(x, neville(&nodes, x));
            canvas.draw_line(previous.round(), current.round(), color);
            previous = current;
        }
    }
}

impl ElementRenderer for CurvedLineRenderer {
    fn render(&self, element: &MapElement, projection: &dyn ViewProjection, canvas: &mut dyn Canvas) {
        let Some(line) = line_of(element) else {
            return;
        };
        element.ensure_coordinates(projection);
        PointRenderer::draw(&line.start, canvas);
        PointRenderer::draw(&line.end, canvas);
        Self::draw_curve(line.start.screen_point(), line.end.screen_point(), line.color, canvas);
    }
}

/// Evaluates the interpolating polynomial through `nodes` at `x` (Neville's scheme).
fn neville(nodes: &[PixelPoint; 3], x: f64) -> f64 {
    let mut p = [nodes[0].y, nodes[1].y, nodes[2].y];
    for level in 1..nodes.len() {
        for i in 0..nodes.len() - level {
            let xi = nodes[i].x;
            let xj = nodes[i + level].x;
            p[i] = ((x - xj) * p[i] + (xi - x) * p[i + 1]) / (xi - xj);
        }
    }
    p[0]
}

/// Owns the map image and its elements, and draws them for a given viewport.
#[derive(Debug)]
pub struct MapRenderer {
    image: MapImage,
    elements: Vec<MapElement>,
    last_view: Option<(i32, i32, Region)>,
}

impl MapRenderer {
    #[must_use]
    pub fn new(image: MapImage) -> Self {
        Self {
            image,
            elements: Vec::new(),
            last_view: None,
        }
    }

    #[must_use]
    pub fn image(&self) -> &MapImage {
        &self.image
    }

    pub fn image_mut(&mut self) -> &mut MapImage {
        &mut self.image
    }

    pub fn set_image(&mut self, image: MapImage) {
        self.image = image;
        self.invalidate_all();
    }

    #[must_use]
    pub fn elements(&self) -> &[MapElement] {
        &self.elements
    }

    pub fn add(&mut self, element: MapElement) {
        self.elements.push(element);
    }

    pub fn extend(&mut self, elements: impl IntoIterator<Item = MapElement>) {
        self.elements.extend(elements);
    }

    pub fn remove_all(&mut self) {
        self.elements.clear();
    }

    pub fn invalidate_all(&self) {
        for element in &self.elements {
            element.invalidate();
        }
    }

    /// Draws the map and every visible element; returns how many elements were drawn.
    pub fn render(&mut self, canvas: &mut dyn Canvas, region: Region, width: i32, height: i32) -> usize {
        let view = (width, height, region);
        let image_changed = self.image.take_changed();
        if image_changed || self.last_view != Some(view) {
            tracing::debug!(width, height, %region, image_changed, "invalidating map elements");
            self.invalidate_all();
            self.last_view = Some(view);
        }

        canvas.draw_map(&self.image, region, width, height);

        let projection = ImageProjection::new(&self.image, region, width, height);
        let mut drawn = 0;
        for element in &self.elements {
            element.ensure_coordinates(&projection);
            if !element.is_visible(&projection) {
                continue;
            }
            renderer_for(element.kind()).render(element, &projection, canvas);
            drawn += 1;
        }
        drawn
    }

    /// The point nearest to `(x, y)` within `max_distance_squared`, across all elements.
    #[must_use]
    pub fn closest_element(&self, x: i32, y: i32, max_distance_squared: f64) -> Option<&MapPoint> {
        self.elements
            .iter()
            .filter(|e| e.is_valid())
            .filter_map(|e| e.closest_element(x, y, max_distance_squared))
            .min_by(|a, b| {
                a.distance_squared(x, y)
                    .total_cmp(&b.distance_squared(x, y))
            })
    }
}

#[cfg(test)]
#[path = "render_test.rs"]
mod tests;
