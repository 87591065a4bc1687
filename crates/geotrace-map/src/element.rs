//! Things drawn on top of the map, each caching its viewport position.

use std::sync::atomic::{AtomicU64, Ordering};

use geotrace_core::{Coordinate, GeoLocation, Subject};

use crate::geometry::ScreenPoint;
use crate::image_projection::ViewProjection;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0, 0, 0);
    pub const RED: Rgb = Rgb(220, 30, 30);
    pub const BLUE: Rgb = Rgb(30, 60, 220);
    pub const GREEN: Rgb = Rgb(20, 160, 60);

    #[must_use]
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PointFlags {
    pub show_label: bool,
    /// First or last hop of a traced path.
    pub endpoint: bool,
}

/// Cached viewport position guarded by a generation counter.
///
/// `invalidate` bumps `generation`; a computation records the generation it
/// started from, so an invalidation racing with it leaves the cache invalid
/// and the next render recomputes.
#[derive(Debug)]
struct ScreenCache {
    generation: AtomicU64,
    computed_for: AtomicU64,
    packed: AtomicU64,
}

impl ScreenCache {
    fn new() -> Self {
        Self {
            generation: AtomicU64::new(1),
            computed_for: AtomicU64::new(0),
            packed: AtomicU64::new(0),
        }
    }

    fn invalidate(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
    }

    fn is_valid(&self) -> bool {
        self.computed_for.load(Ordering::Acquire) == self.generation.load(Ordering::Acquire)
    }

    fn store(&self, point: ScreenPoint, generation: u64) {
        self.packed.store(pack(point), Ordering::Release);
        self.computed_for.store(generation, Ordering::Release);
    }

    fn begin(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    fn point(&self) -> ScreenPoint {
        unpack(self.packed.load(Ordering::Acquire))
    }
}

#[allow(clippy::cast_sign_loss)]
fn pack(point: ScreenPoint) -> u64 {
    (u64::from(point.x as u32) << 32) | u64::from(point.y as u32)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
fn unpack(packed: u64) -> ScreenPoint {
    ScreenPoint::new((packed >> 32) as u32 as i32, packed as u32 as i32)
}

#[derive(Debug)]
pub struct MapPoint {
    label: String,
    coordinate: Coordinate,
    pub color: Rgb,
    pub flags: PointFlags,
    cache: ScreenCache,
}

impl MapPoint {
    #[must_use]
    pub fn new(label: impl Into<String>, coordinate: Coordinate, color: Rgb) -> Self {
        Self {
            label: label.into(),
            coordinate,
            color,
            flags: PointFlags::default(),
            cache: ScreenCache::new(),
        }
    }

    /// A point for `location`, or `None` when the location has no usable coordinates.
    #[must_use]
    pub fn from_location<S: Subject>(location: &GeoLocation<S>, color: Rgb) -> Option<Self> {
        if !location.has_valid_coordinates() {
            return None;
        }
        let label = match location.place_label() {
            Some(place) => format!("{} ({place})", location.subject()),
            None => location.subject().to_string(),
        };
        Some(Self::new(label, location.coordinate(), color))
    }

    #[must_use]
    pub fn with_flags(mut self, flags: PointFlags) -> Self {
        self.flags = flags;
        self
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[must_use]
    pub fn coordinate(&self) -> Coordinate {
        self.coordinate
    }

    /// Last computed viewport position; meaningful once [`Self::is_valid`] holds.
    #[must_use]
    pub fn screen_point(&self) -> ScreenPoint {
        self.cache.point()
    }

    pub fn invalidate(&self) {
        self.cache.invalidate();
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.cache.is_valid()
    }

    pub fn calculate_coordinates(&self, projection: &dyn ViewProjection) {
        let generation = self.cache.begin();
        let point = projection.project(&self.coordinate);
        self.cache.store(point, generation);
    }

    #[must_use]
    pub fn is_visible(&self, projection: &dyn ViewProjection) -> bool {
        let p = self.screen_point();
        p.x >= 0
            && p.y >= 0
            && p.x < projection.width_in_pixels()
            && p.y < projection.height_in_pixels()
    }

    #[must_use]
    pub fn distance_squared(&self, x: i32, y: i32) -> f64 {
        self.screen_point().distance_squared(x, y)
    }

    #[must_use]
    pub fn closest(&self, x: i32, y: i32, max_distance_squared: f64) -> Option<&MapPoint> {
        (self.distance_squared(x, y) <= max_distance_squared).then_some(self)
    }
}

impl Clone for MapPoint {
    fn clone(&self) -> Self {
        Self {
            label: self.label.clone(),
            coordinate: self.coordinate,
            color: self.color,
            flags: self.flags,
            cache: ScreenCache::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MapLine {
    pub start: MapPoint,
    pub end: MapPoint,
    pub color: Rgb,
}

impl MapLine {
    #[must_use]
    pub fn new(start: MapPoint, end: MapPoint, color: Rgb) -> Self {
        Self { start, end, color }
    }

    pub fn invalidate(&self) {
        self.start.invalidate();
        self.end.invalidate();
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.start.is_valid() && self.end.is_valid()
    }

    pub fn calculate_coordinates(&self, projection: &dyn ViewProjection) {
        self.start.calculate_coordinates(projection);
        self.end.calculate_coordinates(projection);
    }

    /// Visible when the bounding box of both endpoints overlaps the viewport.
    #[must_use]
    pub fn is_visible(&self, projection: &dyn ViewProjection) -> bool {
        let a = self.start.screen_point();
        let b = self.end.screen_point();
        a.x.max(b.x) >= 0
            && a.y.max(b.y) >= 0
            && a.x.min(b.x) < projection.width_in_pixels()
            && a.y.min(b.y) < projection.height_in_pixels()
    }

    #[must_use]
    pub fn distance_squared(&self, x: i32, y: i32) -> f64 {
        self.start
            .distance_squared(x, y)
            .min(self.end.distance_squared(x, y))
    }

    /// The nearer endpoint, if it lies within `max_distance_squared`.
    #[must_use]
    pub fn closest(&self, x: i32, y: i32, max_distance_squared: f64) -> Option<&MapPoint> {
        let d_start = self.start.distance_squared(x, y);
        let d_end = self.end.distance_squared(x, y);
        let (nearest, distance) = if d_start < d_end {
            (&self.start, d_start)
        } else {
            (&self.end, d_end)
        };
        (distance <= max_distance_squared).then_some(nearest)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Point,
    Line,
    CurvedLine,
}

#[derive(Debug, Clone)]
pub enum MapElement {
    Point(MapPoint),
    Line(MapLine),
    CurvedLine(MapLine),
}

impl MapElement {
    #[must_use]
    pub fn kind(&self) -> ElementKind {
        match self {
            MapElement::Point(_) => ElementKind::Point,
            MapElement::Line(_) => ElementKind::Line,
            MapElement::CurvedLine(_) => ElementKind::CurvedLine,
        }
    }

    pub fn invalidate(&self) {
        match self {
            MapElement::Point(p) => p.invalidate(),
            MapElement::Line(l) | MapElement::CurvedLine(l) => l.invalidate(),
        }
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        match self {
            MapElement::Point(p) => p.is_valid(),
            MapElement::Line(l) | MapElement::CurvedLine(l) => l.is_valid(),
        }
    }

    pub fn calculate_coordinates(&self, projection: &dyn ViewProjection) {
        match self {
            MapElement::Point(p) => p.calculate_coordinates(projection),
            MapElement::Line(l) | MapElement::CurvedLine(l) => l.calculate_coordinates(projection),
        }
    }

    /// Recomputes cached coordinates unless they are current.
    pub fn ensure_coordinates(&self, projection: &dyn ViewProjection) {
        if !self.is_valid() {
            self.calculate_coordinates(projection);
        }
    }

    #[must_use]
    pub fn is_visible(&self, projection: &dyn ViewProjection) -> bool {
        match self {
            MapElement::Point(p) => p.is_visible(projection),
            MapElement::Line(l) | MapElement::CurvedLine(l) => l.is_visible(projection),
        }
    }

    #[must_use]
    pub fn distance_squared(&self, x: i32, y: i32) -> f64 {
        match self {
            MapElement::Point(p) => p.distance_squared(x, y),
            MapElement::Line(l) | MapElement::CurvedLine(l) => l.distance_squared(x, y),
        }
    }

    #[must_use]
    pub fn closest_element(&self, x: i32, y: i32, max_distance_squared: f64) -> Option<&MapPoint> {
        match self {
            MapElement::Point(p) => p.closest(x, y, max_distance_squared),
            MapElement::Line(l) | MapElement::CurvedLine(l) => {
                l.closest(x, y, max_distance_squared)
            }
        }
    }
}

#[cfg(test)]
#[path = "element_test.rs"]
mod tests;
