use serde::{Deserialize, Serialize};

use crate::angle::{round_degrees, to_dms, DmsAngle};

/// Camera position at capture time.
///
/// Latitude and longitude are signed decimal degrees (south and west
/// negative) rounded to 6 places; altitude is meters and may be negative.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GpsFix {
    pub lat: f64,
    pub lon: f64,
    pub alt: f64,
}

impl GpsFix {
    /// Create a fix, rounding latitude and longitude to 6 decimals.
    pub fn new(lat: f64, lon: f64, alt: f64) -> Self {
        Self {
            lat: round_degrees(lat),
            lon: round_degrees(lon),
            alt,
        }
    }

    pub fn lat_dms(&self) -> DmsAngle {
        to_dms(self.lat)
    }

    pub fn lon_dms(&self) -> DmsAngle {
        to_dms(self.lon)
    }

    /// True when both coordinates lie in their valid ranges.
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && self.lat.abs() <= 90.0
            && self.lon.abs() <= 180.0
    }
}
