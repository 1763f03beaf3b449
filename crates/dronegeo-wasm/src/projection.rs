//! One-shot projection binding.

use dronegeo_core::{
    CameraConfig, CameraGeometry, GeoError, GpsFix, GroundProjector, ImageDims, PixelClick,
    Projection,
};
use wasm_bindgen::prelude::*;

use crate::angle::JsDmsAngle;
use crate::geotag::JsGpsFix;

/// Result of projecting one click.
#[wasm_bindgen]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JsProjection {
    inner: Projection,
}

#[wasm_bindgen]
impl JsProjection {
    #[wasm_bindgen(getter)]
    pub fn lat_deg(&self) -> f64 {
        self.inner.lat_deg
    }

    #[wasm_bindgen(getter)]
    pub fn lon_deg(&self) -> f64 {
        self.inner.lon_deg
    }

    /// Meters east of the camera
    #[wasm_bindgen(getter)]
    pub fn x_target(&self) -> f64 {
        self.inner.x_target
    }

    /// Meters north of the camera
    #[wasm_bindgen(getter)]
    pub fn y_target(&self) -> f64 {
        self.inner.y_target
    }

    pub fn lat_dms(&self) -> JsDmsAngle {
        JsDmsAngle::from_dms(self.inner.lat_dms)
    }

    pub fn lon_dms(&self) -> JsDmsAngle {
        JsDmsAngle::from_dms(self.inner.lon_dms)
    }

    /// Every intermediate value as a plain object.
    pub fn to_json(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.inner).map_err(|e| JsValue::from_str(&e.to_string()))
    }
}

fn project(
    fix: &GpsFix,
    x: f64,
    y: f64,
    width: u32,
    height: u32,
    altitude_m: f64,
    heading_deg: f64,
) -> Result<Projection, GeoError> {
    let geometry = CameraGeometry::from_camera(&CameraConfig::default(), altitude_m, heading_deg);
    GroundProjector::default().project(
        fix,
        &geometry,
        PixelClick::new(x, y),
        ImageDims::new(width, height),
    )
}

/// Project a pixel of a photo onto the ground using the default camera.
///
/// `heading_deg` is counter-clockwise from north. Throws at the poles or for
/// non-positive altitude and dimensions.
///
/// # Example (TypeScript)
///
/// ```typescript
/// const fix = read_gps_fix(bytes);
/// const p = project_pixel(fix, 1204, 877, 4000, 3000, 100, 0);
/// console.log(p.lat_deg, p.lon_deg);
/// ```
#[wasm_bindgen]
pub fn project_pixel(
    fix: &JsGpsFix,
    x: f64,
    y: f64,
    width: u32,
    height: u32,
    altitude_m: f64,
    heading_deg: f64,
) -> Result<JsProjection, JsValue> {
    project(fix.inner(), x, y, width, height, altitude_m, heading_deg)
        .map(|inner| JsProjection { inner })
        .map_err(|e| JsValue::from_str(&e.to_string()))
}
