//! Immutable configuration passed into the projector, profiler and sessions.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{GeoError, Result};

/// Polar radius of the Earth in meters.
pub const POLE_RADIUS_M: f64 = 6_356_752.314;

/// Equatorial radius of the Earth in meters.
pub const EQUATOR_RADIUS_M: f64 = 6_378_137.0;

/// Earth radii used by the local-tangent-plane conversions.
///
/// North-south distances use the polar radius; east-west distances use the
/// equatorial radius scaled by `cos(latitude)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EarthRadii {
    pub polar_m: f64,
    pub equatorial_m: f64,
}

impl Default for EarthRadii {
    fn default() -> Self {
        Self {
            polar_m: POLE_RADIUS_M,
            equatorial_m: EQUATOR_RADIUS_M,
        }
    }
}

impl EarthRadii {
    /// North-south meters for a latitude difference in degrees.
    pub fn lat_delta_to_meters(&self, d_lat: f64) -> f64 {
        self.polar_m * d_lat.to_radians()
    }

    /// East-west meters for a longitude difference in degrees at `ref_lat`.
    pub fn lon_delta_to_meters(&self, d_lon: f64, ref_lat: f64) -> f64 {
        self.equatorial_m * ref_lat.to_radians().cos() * d_lon.to_radians()
    }

    /// Latitude difference in degrees for a north-south distance.
    pub fn meters_to_lat_delta(&self, dy: f64) -> f64 {
        dy * 180.0 / (std::f64::consts::PI * self.polar_m)
    }

    /// Longitude difference in degrees for an east-west distance at `ref_lat`.
    ///
    /// Fails at the poles, where meridians converge and the delta is undefined.
    pub fn meters_to_lon_delta(&self, dx: f64, ref_lat: f64) -> Result<f64> {
        if !ref_lat.is_finite() || ref_lat.abs() >= 90.0 {
            return Err(GeoError::Domain(format!(
                "longitude delta undefined at latitude {ref_lat}"
            )));
        }
        let cos_lat = ref_lat.to_radians().cos();
        Ok(dx * 180.0 / (std::f64::consts::PI * self.equatorial_m * cos_lat))
    }

    fn validate(&self) -> Result<()> {
        if !(self.polar_m > 0.0 && self.equatorial_m > 0.0) {
            return Err(GeoError::Config("earth radii must be positive".into()));
        }
        Ok(())
    }
}

/// Fixed camera constants: focal length and sensor size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub focal_length_mm: f64,
    pub sensor_width_mm: f64,
    pub sensor_height_mm: f64,
}

impl Default for CameraConfig {
    fn default() -> Self {
        // 4/3" sensor with a 25 mm lens
        Self {
            focal_length_mm: 25.0,
            sensor_width_mm: 17.3,
            sensor_height_mm: 13.0,
        }
    }
}

impl CameraConfig {
    fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("focal_length_mm", self.focal_length_mm),
            ("sensor_width_mm", self.sensor_width_mm),
            ("sensor_height_mm", self.sensor_height_mm),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(GeoError::Config(format!("{name} must be positive, got {value}")));
            }
        }
        Ok(())
    }
}

/// Quadrilateral survey area given by four (lat, lon) corners in order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurveyArea {
    pub corners: [(f64, f64); 4],
}

impl SurveyArea {
    pub fn new(corners: [(f64, f64); 4]) -> Self {
        Self { corners }
    }

    /// Mean of the four corners as (lat, lon).
    pub fn center(&self) -> (f64, f64) {
        let (lat, lon) = self
            .corners
            .iter()
            .fold((0.0, 0.0), |(a, b), (lat, lon)| (a + lat, b + lon));
        (lat / 4.0, lon / 4.0)
    }

    /// Even-odd point-in-polygon test on the corner ring.
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        let mut inside = false;
        let mut j = self.corners.len() - 1;
        for i in 0..self.corners.len() {
            let (yi, xi) = self.corners[i];
            let (yj, xj) = self.corners[j];
            if (yi > lat) != (yj > lat) && lon < (xj - xi) * (lat - yi) / (yj - yi) + xi {
                inside = !inside;
            }
            j = i;
        }
        inside
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeoConfig {
    pub earth: EarthRadii,
    pub camera: CameraConfig,
    /// Flight altitude above ground used when the operator gives none.
    pub default_altitude_m: f64,
    pub survey_area: Option<SurveyArea>,
    /// File extensions treated as photos, matched case-insensitively.
    pub photo_extensions: Vec<String>,
}

impl Default for GeoConfig {
    fn default() -> Self {
        Self {
            earth: EarthRadii::default(),
            camera: CameraConfig::default(),
            default_altitude_m: 100.0,
            survey_area: None,
            photo_extensions: vec!["jpg".into(), "jpeg".into()],
        }
    }
}

impl GeoConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and validate a JSON configuration; missing fields take defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| GeoError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| GeoError::io(path, e))?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> Result<()> {
        self.earth.validate()?;
        self.camera.validate()?;
        if !(self.default_altitude_m.is_finite() && self.default_altitude_m > 0.0) {
            return Err(GeoError::Config("default_altitude_m must be positive".into()));
        }
        Ok(())
    }

    /// True if `path` has one of the configured photo extensions.
    pub fn is_photo(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| {
                self.photo_extensions
                    .iter()
                    .any(|allowed| allowed.eq_ignore_ascii_case(ext))
            })
    }
}
