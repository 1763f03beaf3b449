//! Ground projection of pixel clicks.
//!
//! - [`CameraGeometry`]: altitude, optics and heading for one photo
//! - [`GroundProjector`]: pixel coordinate to latitude/longitude

mod geometry;
mod ground;

pub use geometry::{heading_from_bearing, CameraGeometry, ImageDims, PixelClick};
pub use ground::{GroundProjector, Projection};
