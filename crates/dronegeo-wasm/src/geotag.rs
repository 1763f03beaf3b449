//! Geotag reading bindings.

use dronegeo_core::geotag::{self, GpsFix};
use dronegeo_core::{GeoError, PhotoTags};
use wasm_bindgen::prelude::*;

use crate::angle::JsDmsAngle;

/// Camera position read from a photo.
#[wasm_bindgen]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JsGpsFix {
    inner: GpsFix,
}

#[wasm_bindgen]
impl JsGpsFix {
    /// Latitude in decimal degrees (south negative)
    #[wasm_bindgen(getter)]
    pub fn lat(&self) -> f64 {
        self.inner.lat
    }

    /// Longitude in decimal degrees (west negative)
    #[wasm_bindgen(getter)]
    pub fn lon(&self) -> f64 {
        self.inner.lon
    }

    /// Altitude in meters
    #[wasm_bindgen(getter)]
    pub fn alt(&self) -> f64 {
        self.inner.alt
    }

    pub fn lat_dms(&self) -> JsDmsAngle {
        JsDmsAngle::from_dms(self.inner.lat_dms())
    }

    pub fn lon_dms(&self) -> JsDmsAngle {
        JsDmsAngle::from_dms(self.inner.lon_dms())
    }
}

impl JsGpsFix {
    pub(crate) fn inner(&self) -> &GpsFix {
        &self.inner
    }
}

fn gps_fix(bytes: &[u8]) -> Result<Option<GpsFix>, GeoError> {
    PhotoTags::from_bytes("", bytes)?.fix()
}

fn capture_time(bytes: &[u8]) -> Result<Option<String>, GeoError> {
    Ok(PhotoTags::from_bytes("", bytes)?.timestamp())
}

/// Read the GPS fix from photo bytes.
///
/// Returns `undefined` when the photo has no EXIF or no GPS block, and throws
/// when the GPS block is incomplete.
///
/// # Example
///
/// ```typescript
/// const fix = read_gps_fix(new Uint8Array(await file.arrayBuffer()));
/// if (fix) console.log(fix.lat, fix.lon, fix.lat_dms().toString());
/// ```
#[wasm_bindgen]
pub fn read_gps_fix(bytes: &[u8]) -> Result<Option<JsGpsFix>, JsValue> {
    gps_fix(bytes)
        .map(|fix| fix.map(|inner| JsGpsFix { inner }))
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Read the capture time exactly as stored in the photo (`YYYY:MM:DD HH:MM:SS`).
#[wasm_bindgen]
pub fn read_capture_time(bytes: &[u8]) -> Result<Option<String>, JsValue> {
    capture_time(bytes).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Image direction bearing in degrees clockwise from north, if recorded.
#[wasm_bindgen]
pub fn read_bearing(bytes: &[u8]) -> Result<Option<f64>, JsValue> {
    PhotoTags::from_bytes("", bytes)
        .map(|photo| photo.tags.as_ref().and_then(geotag::extract_bearing))
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use dronegeo_core::fixtures::{self, MINIMAL_JPEG};

    #[test]
    fn test_no_exif_is_empty() {
        assert_eq!(gps_fix(MINIMAL_JPEG).unwrap(), None);
        assert_eq!(capture_time(MINIMAL_JPEG).unwrap(), None);
        assert!(read_gps_fix(MINIMAL_JPEG).unwrap().is_none());
        assert_eq!(read_bearing(MINIMAL_JPEG).unwrap(), None);
    }

    #[test]
    fn test_reads_geotagged_photo() {
        let bytes = fixtures::reference_jpeg();
        let fix = read_gps_fix(&bytes).unwrap().unwrap();
        assert_eq!(fix.lat(), 37.286447);
        assert_eq!(fix.inner().lon, 139.473903);
        assert_eq!(
            read_capture_time(&bytes).unwrap().as_deref(),
            Some(fixtures::REFERENCE_DATETIME)
        );
    }

    #[test]
    fn test_fix_accessors() {
        let fix = JsGpsFix {
            inner: GpsFix::new(37.286447, 139.473903, 213.796),
        };
        assert_eq!(fix.lat(), 37.286447);
        assert_eq!(fix.inner().lon, 139.473903);
        assert_eq!(fix.lat_dms().to_display_string(), "37°17'11.209\"");
    }
}
