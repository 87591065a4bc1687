//! Viewport navigation: zoom to a dragged rectangle, zoom out, pan.
//!
//! Every result passes through [`MapImage::limit`], so a region that would
//! leave the image snaps back to the full map.

use crate::geometry::{round_to_i32, ScreenPoint};
use crate::map_image::MapImage;
use crate::region::Region;

/// Zoomed regions narrower or shorter than this (in source pixels) are rejected.
pub const MIN_REGION_EXTENT: i32 = 10;

/// Zooms to the viewport rectangle spanned by `corner_a` and `corner_b`.
///
/// The new region keeps the dragged width and takes its height from the
/// viewport aspect ratio. Returns `None` when the result would be degenerate;
/// callers keep their current region in that case.
#[must_use]
pub fn zoom_in(
    image: &MapImage,
    current: Region,
    view_width: i32,
    view_height: i32,
    corner_a: ScreenPoint,
    corner_b: ScreenPoint,
) -> Option<Region> {
    if view_width <= 0 || view_height <= 0 {
        return None;
    }
    let top_left = ScreenPoint::new(corner_a.x.min(corner_b.x), corner_a.y.min(corner_b.y));
    let bottom_right = ScreenPoint::new(corner_a.x.max(corner_b.x), corner_a.y.max(corner_b.y));

    let p0 = current.unproject(view_width, view_height, top_left);
    let p1 = current.unproject(view_width, view_height, bottom_right);

    let width = p1.x - p0.x;
    let height = Region::height_for_aspect(width, view_width, view_height);
    if width < MIN_REGION_EXTENT || height < MIN_REGION_EXTENT {
        tracing::debug!(width, height, "zoom-in rectangle too small; ignored");
        return None;
    }

    let region = image.limit(Region::new(p0.x, p0.y, width, height));
    tracing::debug!(from = %current, to = %region, "zoomed in");
    Some(region)
}

/// Doubles the region's width around its center.
#[must_use]
pub fn zoom_out(image: &MapImage, current: Region, view_width: i32, view_height: i32) -> Region {
    if view_width <= 0 || view_height <= 0 {
        return image.full_region();
    }
    let center = current.center();
    let width = current.width.saturating_mul(2);
    let height = Region::height_for_aspect(width, view_width, view_height);
    let candidate = Region::new(
        center.x - width / 2,
        center.y - height / 2,
        width,
        height,
    );
    let region = image.limit(candidate);
    tracing::debug!(from = %current, to = %region, "zoomed out");
    region
}

/// Shifts the region so the map follows a drag of `(dx, dy)` viewport pixels.
///
/// The shift stops at the image edges instead of resetting the view.
#[must_use]
pub fn pan(
    image: &MapImage,
    current: Region,
    view_width: i32,
    view_height: i32,
    dx: i32,
    dy: i32,
) -> Region {
    if view_width <= 0 || view_height <= 0 {
        return current;
    }
    let src_dx = round_to_i32(f64::from(dx) * f64::from(current.width) / f64::from(view_width));
    let src_dy = round_to_i32(f64::from(dy) * f64::from(current.height) / f64::from(view_height));

    let max_x = (image.width() - current.width).max(0);
    let max_y = (image.height() - current.height).max(0);
    let candidate = Region::new(
        current.x_origin.saturating_sub(src_dx).clamp(0, max_x),
        current.y_origin.saturating_sub(src_dy).clamp(0, max_y),
        current.width,
        current.height,
    );
    image.limit(candidate)
}
