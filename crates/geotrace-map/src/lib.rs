//! Cartographic projection pipeline: geographic coordinates to map image
//! pixels to viewport pixels, plus the map elements drawn on top.

pub mod element;
pub mod error;
pub mod geometry;
pub mod image_projection;
pub mod map_image;
pub mod projection;
pub mod region;
pub mod render;
pub mod zoom;

pub use element::{ElementKind, MapElement, MapLine, MapPoint, PointFlags, Rgb};
pub use error::MapError;
pub use geometry::{PixelPoint, ScreenPoint};
pub use image_projection::{ImageProjection, ViewProjection};
pub use map_image::{Calibration, MapImage};
pub use projection::{projection_for, Equirectangular, GlobePoint, MillerCylindrical, Projection, Robinson};
pub use region::Region;
pub use render::{renderer_for, Canvas, ElementRenderer, MapRenderer};
pub use zoom::{pan, zoom_in, zoom_out, MIN_REGION_EXTENT};
