use geotrace_core::Coordinate;

use crate::geometry::{PixelPoint, ScreenPoint};
use crate::map_image::MapImage;
use crate::region::Region;

/// What map elements need from a viewport: a way to place coordinates and its size.
pub trait ViewProjection {
    fn project(&self, coordinate: &Coordinate) -> ScreenPoint;
    fn width_in_pixels(&self) -> i32;
    fn height_in_pixels(&self) -> i32;
}

/// Full pipeline from coordinates to viewport pixels for one region of one image.
#[derive(Debug, Clone, Copy)]
pub struct ImageProjection<'a> {
    image: &'a MapImage,
    region: Region,
    width: i32,
    height: i32,
}

impl<'a> ImageProjection<'a> {
    #[must_use]
    pub fn new(image: &'a MapImage, region: Region, width: i32, height: i32) -> Self {
        Self {
            image,
            region,
            width,
            height,
        }
    }

    #[must_use]
    pub fn region(&self) -> Region {
        self.region
    }

    #[must_use]
    pub fn image(&self) -> &'a MapImage {
        self.image
    }

    #[must_use]
    pub fn project_precise(&self, coordinate: &Coordinate) -> PixelPoint {
        let source = self.image.to_image_pixel(coordinate);
        self.region.project(self.width, self.height, source)
    }

    /// Viewport pixel back to a coordinate. `None` for projections without an inverse.
    #[must_use]
    pub fn unproject(&self, point: ScreenPoint) -> Option<Coordinate> {
        let source = self.region.unproject_precise(self.width, self.height, point);
        self.image.from_image_pixel(source)
    }
}

impl ViewProjection for ImageProjection<'_> {
    fn project(&self, coordinate: &Coordinate) -> ScreenPoint {
        self.project_precise(coordinate).round()
    }

    fn width_in_pixels(&self) -> i32 {
        self.width
    }

    fn height_in_pixels(&self) -> i32 {
        self.height
    }
}
