//! Angle conversion bindings.

use dronegeo_core::angle::{self, DmsAngle};
use wasm_bindgen::prelude::*;

/// A degrees-minutes-seconds angle for JavaScript.
///
/// The sign is carried by `negative`; the components are magnitudes.
#[wasm_bindgen]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JsDmsAngle {
    inner: DmsAngle,
}

#[wasm_bindgen]
impl JsDmsAngle {
    #[wasm_bindgen(getter)]
    pub fn negative(&self) -> bool {
        self.inner.negative
    }

    #[wasm_bindgen(getter)]
    pub fn degrees(&self) -> u32 {
        self.inner.degrees
    }

    #[wasm_bindgen(getter)]
    pub fn minutes(&self) -> u32 {
        self.inner.minutes
    }

    #[wasm_bindgen(getter)]
    pub fn seconds(&self) -> f64 {
        self.inner.seconds
    }

    /// Decimal degrees, rounded to 6 places.
    pub fn to_decimal(&self) -> f64 {
        angle::to_decimal(&self.inner)
    }

    /// Formatted as `37°17'11.209"`.
    #[wasm_bindgen(js_name = toString)]
    pub fn to_display_string(&self) -> String {
        self.inner.to_string()
    }
}

impl JsDmsAngle {
    pub(crate) fn from_dms(inner: DmsAngle) -> Self {
        Self { inner }
    }
}

/// Convert decimal degrees to DMS.
#[wasm_bindgen]
pub fn deg_to_dms(degrees: f64) -> JsDmsAngle {
    JsDmsAngle::from_dms(angle::to_dms(degrees))
}

/// Convert DMS to decimal degrees.
///
/// A minus sign on any component applies to the whole angle, so
/// `dms_to_deg(-0, 30, 0)` is `-0.5`.
#[wasm_bindgen]
pub fn dms_to_deg(degrees: f64, minutes: f64, seconds: f64) -> f64 {
    angle::to_decimal(&DmsAngle::from_signed_parts(degrees, minutes, seconds))
}
