//! Pixel-to-ground projection on a local tangent plane.
//!
//! # Algorithm
//!
//! ```text
//! x' = x_px - width / 2            y' = height / 2 - y_px
//! x_m = footprint_w / width * x'   y_m = footprint_h / height * y'
//! x_t = x_m cos(h) - y_m sin(h)    y_t = x_m sin(h) + y_m cos(h)
//! d_lon = x_t * 180 / (pi * R_eq * cos(lat))
//! d_lat = y_t * 180 / (pi * R_pole)
//! ```
//!
//! The earth is treated as flat around the camera position, which holds for
//! the tens to low hundreds of meters a single drone photo covers.

use serde::{Deserialize, Serialize};

use super::{CameraGeometry, ImageDims, PixelClick};
use crate::angle::{to_dms, DmsAngle};
use crate::config::{EarthRadii, GeoConfig};
use crate::error::{GeoError, Result};
use crate::geotag::GpsFix;

/// Every intermediate value of one projection, plus the result.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Projection {
    /// Raw click position (pixels, origin top-left).
    pub xdata: f64,
    pub ydata: f64,
    /// Click relative to image center, Y up (pixels).
    pub xdata_trans: f64,
    pub ydata_trans: f64,
    /// Offset in meters in the image frame.
    pub x_meter: f64,
    pub y_meter: f64,
    /// Offset in meters east (x) and north (y) after heading correction.
    pub x_target: f64,
    pub y_target: f64,
    /// Longitude (x) and latitude (y) deltas in degrees.
    pub x_deg: f64,
    pub y_deg: f64,
    pub lat_deg: f64,
    pub lon_deg: f64,
    pub lat_dms: DmsAngle,
    pub lon_dms: DmsAngle,
}

/// Projects pixel clicks onto ground coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GroundProjector {
    earth: EarthRadii,
}

impl GroundProjector {
    pub fn new(earth: EarthRadii) -> Self {
        Self { earth }
    }

    pub fn from_config(config: &GeoConfig) -> Self {
        Self::new(config.earth)
    }

    pub fn earth(&self) -> &EarthRadii {
        &self.earth
    }

    /// Project `click` in a photo taken from `fix` with `geometry`.
    ///
    /// # Errors
    ///
    /// - `GeoError::Domain` at the poles or for a non-finite fix
    /// - `GeoError::InvalidGeometry` for non-positive camera values or empty images
    pub fn project(
        &self,
        fix: &GpsFix,
        geometry: &CameraGeometry,
        click: PixelClick,
        dims: ImageDims,
    ) -> Result<Projection> {
        if !fix.is_valid() {
            return Err(GeoError::Domain(format!(
                "camera position out of range: ({}, {})",
                fix.lat, fix.lon
            )));
        }
        geometry.validate()?;
        dims.validate()?;

        let width = f64::from(dims.width);
        let height = f64::from(dims.height);

        // Re-center on the image and flip Y so "up" is positive
        let xdata_trans = click.x - width / 2.0;
        let ydata_trans = -click.y + height / 2.0;

        // Pixels to meters
        let (footprint_w, footprint_h) = geometry.footprint();
        let x_meter = footprint_w / width * xdata_trans;
        let y_meter = footprint_h / height * ydata_trans;

        // Image frame to east/north
        let (x_target, y_target) = rotate(x_meter, y_meter, geometry.heading_deg);

        let x_deg = self.earth.meters_to_lon_delta(x_target, fix.lat)?;
        let y_deg = self.earth.meters_to_lat_delta(y_target);

        let lat_deg = fix.lat + y_deg;
        let lon_deg = fix.lon + x_deg;
        if !(lat_deg.is_finite() && lon_deg.is_finite()) {
            return Err(GeoError::Domain("projection produced a non-finite coordinate".into()));
        }

        Ok(Projection {
            xdata: click.x,
            ydata: click.y,
            xdata_trans,
            ydata_trans,
            x_meter,
            y_meter,
            x_target,
            y_target,
            x_deg,
            y_deg,
            lat_deg,
            lon_deg,
            lat_dms: to_dms(lat_deg),
            lon_dms: to_dms(lon_deg),
        })
    }
}

/// Rotate `(x, y)` counter-clockwise by `angle_degrees`.
#[inline]
fn rotate(x: f64, y: f64, angle_degrees: f64) -> (f64, f64) {
    let angle_rad = angle_degrees.to_radians();
    let cos = angle_rad.cos();
    let sin = angle_rad.sin();
    (x * cos - y * sin, x * sin + y * cos)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CameraConfig;

    const DIMS: ImageDims = ImageDims {
        width: 4000,
        height: 3000,
    };

    fn fix() -> GpsFix {
        GpsFix::new(35.699354, 139.235465, 300.0)
    }

    fn geometry(heading: f64) -> CameraGeometry {
        CameraGeometry::from_camera(&CameraConfig::default(), 100.0, heading)
    }

    #[test]
    fn test_center_click_returns_camera_fix() {
        let projector = GroundProjector::default();
        for heading in [0.0, 37.5, 90.0, 180.0, -45.0] {
            let p = projector
                .project(&fix(), &geometry(heading), DIMS.center(), DIMS)
                .unwrap();
            assert_eq!(p.lat_deg, fix().lat);
            assert_eq!(p.lon_deg, fix().lon);
            assert_eq!(p.x_meter, 0.0);
            assert_eq!(p.y_meter, 0.0);
        }
    }

    #[test]
    fn test_pixel_to_meter_scaling() {
        let projector = GroundProjector::default();
        // 1000 px right of center, footprint 69.2 m over 4000 px
        let p = projector
            .project(&fix(), &geometry(0.0), PixelClick::new(3000.0, 1500.0), DIMS)
            .unwrap();
        assert_eq!(p.xdata_trans, 1000.0);
        assert_eq!(p.ydata_trans, 0.0);
        assert!((p.x_meter - 17.3).abs() < 1e-9);
        assert!((p.x_target - 17.3).abs() < 1e-9);
        assert!(p.y_target.abs() < 1e-9);
        assert!(p.lon_deg > fix().lon);
        assert_eq!(p.lat_deg, fix().lat);
    }

    #[test]
    fn test_y_axis_is_flipped() {
        let projector = GroundProjector::default();
        // Top edge of the image is north with heading 0
        let p = projector
            .project(&fix(), &geometry(0.0), PixelClick::new(2000.0, 0.0), DIMS)
            .unwrap();
        assert_eq!(p.ydata_trans, 1500.0);
        assert!((p.y_meter - 26.0).abs() < 1e-9);
        assert!(p.lat_deg > fix().lat);
        assert!(p.x_deg.abs() < 1e-15);
    }

    #[test]
    fn test_degree_deltas_invert_to_meters() {
        let projector = GroundProjector::default();
        let f = fix();
        let p = projector
            .project(&f, &geometry(0.0), PixelClick::new(3500.0, 200.0), DIMS)
            .unwrap();
        let earth = projector.earth();
        assert!((earth.lon_delta_to_meters(p.x_deg, f.lat) - p.x_target).abs() < 1e-6);
        assert!((earth.lat_delta_to_meters(p.y_deg) - p.y_target).abs() < 1e-6);
    }

    #[test]
    fn test_heading_rotates_counter_clockwise() {
        let projector = GroundProjector::default();
        // Image top points west, so image right points north
        let p = projector
            .project(&fix(), &geometry(90.0), PixelClick::new(3000.0, 1500.0), DIMS)
            .unwrap();
        assert!(p.x_target.abs() < 1e-9);
        assert!((p.y_target - 17.3).abs() < 1e-9);
        assert!(p.lat_deg > fix().lat);
    }

    #[test]
    fn test_heading_from_east_bearing() {
        use crate::projection::heading_from_bearing;

        let projector = GroundProjector::default();
        // Image top points east (bearing 90), so image right points south
        let heading = heading_from_bearing(90.0);
        let p = projector
            .project(&fix(), &geometry(heading), PixelClick::new(3000.0, 1500.0), DIMS)
            .unwrap();
        assert!(p.x_target.abs() < 1e-9);
        assert!((p.y_target + 17.3).abs() < 1e-9);
    }

    #[test]
    fn test_longitude_delta_grows_with_latitude() {
        let projector = GroundProjector::default();
        let click = PixelClick::new(3000.0, 1500.0);
        let at_equator = projector
            .project(&GpsFix::new(0.0, 0.0, 0.0), &geometry(0.0), click, DIMS)
            .unwrap();
        let at_60 = projector
            .project(&GpsFix::new(60.0, 0.0, 0.0), &geometry(0.0), click, DIMS)
            .unwrap();
        assert!((at_60.x_deg / at_equator.x_deg - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_pole_is_domain_error() {
        let projector = GroundProjector::default();
        for lat in [90.0, -90.0] {
            let result = projector.project(
                &GpsFix::new(lat, 10.0, 100.0),
                &geometry(0.0),
                DIMS.center(),
                DIMS,
            );
            assert!(matches!(result, Err(GeoError::Domain(_))), "{result:?}");
        }
    }

    #[test]
    fn test_invalid_inputs() {
        let projector = GroundProjector::default();
        let mut g = geometry(0.0);
        g.altitude_m = -5.0;
        assert!(matches!(
            projector.project(&fix(), &g, DIMS.center(), DIMS),
            Err(GeoError::InvalidGeometry(_))
        ));
        assert!(matches!(
            projector.project(&fix(), &geometry(0.0), DIMS.center(), ImageDims::new(0, 0)),
            Err(GeoError::InvalidGeometry(_))
        ));
        assert!(matches!(
            projector.project(
                &GpsFix::new(f64::NAN, 0.0, 0.0),
                &geometry(0.0),
                DIMS.center(),
                DIMS
            ),
            Err(GeoError::Domain(_))
        ));
    }

    #[test]
    fn test_dms_outputs_match_decimal() {
        let projector = GroundProjector::default();
        let p = projector
            .project(&fix(), &geometry(0.0), PixelClick::new(100.0, 2900.0), DIMS)
            .unwrap();
        assert_eq!(p.lat_dms, to_dms(p.lat_deg));
        assert_eq!(p.lon_dms, to_dms(p.lon_deg));
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::config::CameraConfig;
    use proptest::prelude::*;

    /// Strategy for image dimensions.
    fn dims_strategy() -> impl Strategy<Value = ImageDims> {
        (1u32..=8000, 1u32..=6000).prop_map(|(w, h)| ImageDims::new(w, h))
    }

    /// Strategy for non-polar camera positions.
    fn fix_strategy() -> impl Strategy<Value = GpsFix> {
        (-89.0f64..89.0, -180.0f64..180.0).prop_map(|(lat, lon)| GpsFix::new(lat, lon, 0.0))
    }

    fn geometry_strategy() -> impl Strategy<Value = CameraGeometry> {
        (1.0f64..500.0, -360.0f64..360.0).prop_map(|(alt, heading)| {
            CameraGeometry::from_camera(&CameraConfig::default(), alt, heading)
        })
    }

    proptest! {
        /// Property: the image center always projects onto the camera fix.
        #[test]
        fn prop_center_is_identity(
            dims in dims_strategy(),
            fix in fix_strategy(),
            geometry in geometry_strategy(),
        ) {
            let p = GroundProjector::default()
                .project(&fix, &geometry, dims.center(), dims)
                .unwrap();
            prop_assert_eq!(p.lat_deg, fix.lat);
            prop_assert_eq!(p.lon_deg, fix.lon);
        }

        /// Property: heading rotation preserves the ground distance.
        #[test]
        fn prop_rotation_preserves_distance(
            x in 0.0f64..4000.0,
            y in 0.0f64..3000.0,
            geometry in geometry_strategy(),
        ) {
            let dims = ImageDims::new(4000, 3000);
            let p = GroundProjector::default()
                .project(&GpsFix::new(35.0, 139.0, 0.0), &geometry, PixelClick::new(x, y), dims)
                .unwrap();
            let before = p.x_meter.hypot(p.y_meter);
            let after = p.x_target.hypot(p.y_target);
            prop_assert!((before - after).abs() < 1e-9);
        }
    }
}
