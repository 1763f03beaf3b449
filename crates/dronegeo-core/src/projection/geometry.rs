//! Camera and image geometry inputs to the ground projector.

use serde::{Deserialize, Serialize};

use crate::config::CameraConfig;
use crate::error::{GeoError, Result};

/// Camera state for one photo.
///
/// `heading_deg` is the direction the top of the image points, measured
/// counter-clockwise from true north.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraGeometry {
    /// Height above ground in meters.
    pub altitude_m: f64,
    pub focal_length_mm: f64,
    pub sensor_width_mm: f64,
    pub sensor_height_mm: f64,
    pub heading_deg: f64,
}

impl CameraGeometry {
    pub fn from_camera(camera: &CameraConfig, altitude_m: f64, heading_deg: f64) -> Self {
        Self {
            altitude_m,
            focal_length_mm: camera.focal_length_mm,
            sensor_width_mm: camera.sensor_width_mm,
            sensor_height_mm: camera.sensor_height_mm,
            heading_deg,
        }
    }

    /// Ground width and height in meters covered by the full frame.
    ///
    /// Similar triangles: `sensor / focal_length = ground / altitude`.
    pub fn footprint(&self) -> (f64, f64) {
        (
            self.sensor_width_mm / self.focal_length_mm * self.altitude_m,
            self.sensor_height_mm / self.focal_length_mm * self.altitude_m,
        )
    }

    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("altitude", self.altitude_m),
            ("focal length", self.focal_length_mm),
            ("sensor width", self.sensor_width_mm),
            ("sensor height", self.sensor_height_mm),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(GeoError::InvalidGeometry(format!(
                    "{name} must be positive, got {value}"
                )));
            }
        }
        if !self.heading_deg.is_finite() {
            return Err(GeoError::InvalidGeometry("heading must be finite".into()));
        }
        Ok(())
    }
}

/// Convert an EXIF image-direction bearing (clockwise from north) into a
/// counter-clockwise heading in `[0, 360)`.
pub fn heading_from_bearing(bearing_deg: f64) -> f64 {
    (360.0 - bearing_deg).rem_euclid(360.0)
}

/// Pixel size of a photo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageDims {
    pub width: u32,
    pub height: u32,
}

impl ImageDims {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Image center in pixel coordinates.
    pub fn center(&self) -> PixelClick {
        PixelClick::new(f64::from(self.width) / 2.0, f64::from(self.height) / 2.0)
    }

    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(GeoError::InvalidGeometry(format!(
                "image dimensions must be non-zero, got {}x{}",
                self.width, self.height
            )));
        }
        Ok(())
    }
}

/// A point picked in an image, origin top-left, Y increasing downward.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PixelClick {
    pub x: f64,
    pub y: f64,
}

impl PixelClick {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Squared distance to another click.
    #[inline]
    pub fn distance_sq(&self, other: &PixelClick) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }
}

impl From<(f64, f64)> for PixelClick {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}
