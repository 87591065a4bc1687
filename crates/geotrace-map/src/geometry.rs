/// A sub-pixel position, used between pipeline stages.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PixelPoint {
    pub x: f64,
    pub y: f64,
}

impl PixelPoint {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub fn round(self) -> ScreenPoint {
        ScreenPoint::new(round_to_i32(self.x), round_to_i32(self.y))
    }
}

/// An integer pixel position on a viewport or source image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ScreenPoint {
    pub x: i32,
    pub y: i32,
}

impl ScreenPoint {
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub fn distance_squared(self, x: i32, y: i32) -> f64 {
        let dx = f64::from(x) - f64::from(self.x);
        let dy = f64::from(y) - f64::from(self.y);
        dx * dx + dy * dy
    }
}

/// Rounds half away from zero and saturates at the `i32` range.
#[allow(clippy::cast_possible_truncation)]
#[must_use]
pub fn round_to_i32(v: f64) -> i32 {
    // `as` saturates for out-of-range floats and maps NaN to 0.
    v.round() as i32
}
