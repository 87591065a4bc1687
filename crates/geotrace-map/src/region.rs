use crate::geometry::{round_to_i32, PixelPoint, ScreenPoint};

/// An axis-aligned rectangle of source-image pixels shown in the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Region {
    pub x_origin: i32,
    pub y_origin: i32,
    pub width: i32,
    pub height: i32,
}

impl Region {
    #[must_use]
    pub const fn new(x_origin: i32, y_origin: i32, width: i32, height: i32) -> Self {
        Self {
            x_origin,
            y_origin,
            width,
            height,
        }
    }

    #[must_use]
    pub fn contains(&self, point: PixelPoint) -> bool {
        let x0 = f64::from(self.x_origin);
        let y0 = f64::from(self.y_origin);
        point.x >= x0
            && point.y >= y0
            && point.x < x0 + f64::from(self.width)
            && point.y < y0 + f64::from(self.height)
    }

    /// Source-image pixel to destination pixel: `(p - origin) / size * dst`.
    #[must_use]
    pub fn project(&self, dst_width: i32, dst_height: i32, point: PixelPoint) -> PixelPoint {
        PixelPoint::new(
            (point.x - f64::from(self.x_origin)) / f64::from(self.width) * f64::from(dst_width),
            (point.y - f64::from(self.y_origin)) / f64::from(self.height) * f64::from(dst_height),
        )
    }

    /// Destination pixel back to source-image pixel, without rounding.
    #[must_use]
    pub fn unproject_precise(&self, dst_width: i32, dst_height: i32, point: ScreenPoint) -> PixelPoint {
        PixelPoint::new(
            f64::from(self.x_origin)
                + f64::from(point.x) / f64::from(dst_width) * f64::from(self.width),
            f64::from(self.y_origin)
                + f64::from(point.y) / f64::from(dst_height) * f64::from(self.height),
        )
    }

    /// Destination pixel back to source-image pixel: `round(origin + p / dst * size)`.
    #[must_use]
    pub fn unproject(&self, dst_width: i32, dst_height: i32, point: ScreenPoint) -> ScreenPoint {
        self.unproject_precise(dst_width, dst_height, point).round()
    }

    #[must_use]
    pub fn center(&self) -> ScreenPoint {
        ScreenPoint::new(
            self.x_origin + self.width / 2,
            self.y_origin + self.height / 2,
        )
    }

    /// Height that keeps this width at the viewport's aspect ratio.
    pub(crate) fn height_for_aspect(width: i32, view_width: i32, view_height: i32) -> i32 {
        round_to_i32(f64::from(width) * f64::from(view_height) / f64::from(view_width))
    }
}

impl std::fmt::Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}x{}+{}+{}",
            self.width, self.height, self.x_origin, self.y_origin
        )
    }
}
