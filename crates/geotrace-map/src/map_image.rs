use std::sync::atomic::{AtomicBool, Ordering};

use geotrace_core::{Coordinate, MapPreset};

use crate::error::MapError;
use crate::geometry::PixelPoint;
use crate::projection::{projection_for, GlobePoint, Projection};
use crate::region::Region;

/// Lines projection output up with a concrete image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Calibration {
    pub origin_x_percent: f64,
    pub origin_y_percent: f64,
    pub scale_x: f64,
    pub scale_y: f64,
}

impl Calibration {
    fn validate(&self) -> Result<(), MapError> {
        check_origin('x', self.origin_x_percent)?;
        check_origin('y', self.origin_y_percent)?;
        check_scale(self.scale_x, self.scale_y)
    }
}

fn check_origin(axis: char, value: f64) -> Result<(), MapError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(MapError::InvalidOrigin { axis, value })
    }
}

fn check_scale(scale_x: f64, scale_y: f64) -> Result<(), MapError> {
    let ok = |s: f64| s.is_finite() && s > 0.0;
    if ok(scale_x) && ok(scale_y) {
        Ok(())
    } else {
        Err(MapError::InvalidScale { scale_x, scale_y })
    }
}

/// A world map bitmap's geometry and the projection it was drawn with.
///
/// Only dimensions are held; pixel data belongs to whatever canvas draws the
/// background. Calibration changes raise a "changed" flag so renderers know
/// their cached element positions are stale.
#[derive(Debug)]
pub struct MapImage {
    name: String,
    width: i32,
    height: i32,
    projection: Box<dyn Projection>,
    calibration: Calibration,
    changed: AtomicBool,
}

impl MapImage {
    /// # Errors
    ///
    /// Returns [`MapError`] if the size is not positive or the calibration is out of range.
    pub fn new(
        name: impl Into<String>,
        width: i32,
        height: i32,
        projection: Box<dyn Projection>,
        calibration: Calibration,
    ) -> Result<Self, MapError> {
        if width <= 0 || height <= 0 {
            return Err(MapError::InvalidSize {
                width: i64::from(width),
                height: i64::from(height),
            });
        }
        calibration.validate()?;
        Ok(Self {
            name: name.into(),
            width,
            height,
            projection,
            calibration,
            changed: AtomicBool::new(false),
        })
    }

    /// # Errors
    ///
    /// Returns [`MapError`] if the preset's size overflows `i32` or its calibration is invalid.
    pub fn from_preset(preset: &MapPreset) -> Result<Self, MapError> {
        let size_err = || MapError::InvalidSize {
            width: i64::from(preset.width),
            height: i64::from(preset.height),
        };
        let width = i32::try_from(preset.width).map_err(|_| size_err())?;
        let height = i32::try_from(preset.height).map_err(|_| size_err())?;
        Self::new(
            preset.name.clone(),
            width,
            height,
            projection_for(preset.projection)?,
            Calibration {
                origin_x_percent: preset.origin_x_percent,
                origin_y_percent: preset.origin_y_percent,
                scale_x: preset.scale_x,
                scale_y: preset.scale_y,
            },
        )
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn width(&self) -> i32 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> i32 {
        self.height
    }

    #[must_use]
    pub fn projection(&self) -> &dyn Projection {
        self.projection.as_ref()
    }

    #[must_use]
    pub fn calibration(&self) -> Calibration {
        self.calibration
    }

    /// # Errors
    ///
    /// Returns [`MapError::InvalidScale`] unless both factors are positive and finite.
    pub fn set_scale(&mut self, scale_x: f64, scale_y: f64) -> Result<(), MapError> {
        check_scale(scale_x, scale_y)?;
        self.calibration.scale_x = scale_x;
        self.calibration.scale_y = scale_y;
        self.mark_changed();
        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`MapError::InvalidOrigin`] if either percentage is outside `0..=1`.
    pub fn set_origin_percentages(&mut self, x: f64, y: f64) -> Result<(), MapError> {
        check_origin('x', x)?;
        check_origin('y', y)?;
        self.calibration.origin_x_percent = x;
        self.calibration.origin_y_percent = y;
        self.mark_changed();
        Ok(())
    }

    pub fn mark_changed(&self) {
        self.changed.store(true, Ordering::Release);
    }

    /// Returns whether the image changed since the last call, clearing the flag.
    pub fn take_changed(&self) -> bool {
        self.changed.swap(false, Ordering::AcqRel)
    }

    /// The whole image as a region.
    #[must_use]
    pub fn full_region(&self) -> Region {
        Region::new(0, 0, self.width, self.height)
    }

    /// Returns `region` unchanged when it fits inside the image, otherwise the full image.
    ///
    /// There is no partial clamping: an origin outside the image, a far corner
    /// past the image edge, or a non-positive extent all reset to the full map.
    #[must_use]
    pub fn limit(&self, region: Region) -> Region {
        let in_bounds = region.width > 0
            && region.height > 0
            && region.x_origin >= 0
            && region.y_origin >= 0
            && region.x_origin < self.width
            && region.y_origin < self.height
            // `<=`: a far corner exactly on the image edge is still inside.
            && i64::from(region.x_origin) + i64::from(region.width) <= i64::from(self.width)
            && i64::from(region.y_origin) + i64::from(region.height) <= i64::from(self.height);
        if in_bounds {
            region
        } else {
            self.full_region()
        }
    }

    /// Places a coordinate on the source image, in fractional pixels.
    #[must_use]
    pub fn to_image_pixel(&self, coordinate: &Coordinate) -> PixelPoint {
        let globe = self
            .projection
            .project(coordinate.longitude_rad(), coordinate.latitude_rad());
        let w = f64::from(self.width);
        let h = f64::from(self.height);
        let c = &self.calibration;
        PixelPoint::new(
            c.origin_x_percent * w + globe.x * c.scale_x * (w / 1000.0),
            c.origin_y_percent * h - globe.y * c.scale_y * (h / 1000.0),
        )
    }

    /// Inverse of [`Self::to_image_pixel`], where the projection supports it.
    #[must_use]
    pub fn from_image_pixel(&self, point: PixelPoint) -> Option<Coordinate> {
        let w = f64::from(self.width);
        let h = f64::from(self.height);
        let c = &self.calibration;
        let globe = GlobePoint {
            x: (point.x - c.origin_x_percent * w) / (c.scale_x * (w / 1000.0)),
            y: (c.origin_y_percent * h - point.y) / (c.scale_y * (h / 1000.0)),
        };
        let (lambda, phi) = self.projection.inverse(globe)?;
        Some(Coordinate::new(phi.to_degrees(), lambda.to_degrees()))
    }
}
