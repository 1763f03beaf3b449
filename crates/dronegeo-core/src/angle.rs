//! Conversion between decimal degrees and degree-minute-second angles.
//!
//! Decimal values are rounded to 6 places and DMS seconds to 3 places, so a
//! round trip through [`to_dms`] and [`to_decimal`] loses at most the seconds
//! rounding (under 3e-7 degrees).
//!
//! Negative angles keep the sign in [`DmsAngle::negative`]; degrees, minutes
//! and seconds are always non-negative magnitudes. This keeps angles between
//! -1° and 0° representable.
//!
//! The tuple forms used by [`deg_to_dms`] and [`dms_to_deg`] put the sign on
//! the leading non-zero component: `-0.5°` is `(0, -30, 0.0)`.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Decimal places kept for decimal-degree values.
pub const DECIMAL_PLACES: i32 = 6;

/// Decimal places kept for DMS seconds.
pub const SECONDS_PLACES: i32 = 3;

/// Round `value` to `places` decimal digits.
#[inline]
pub fn round_to(value: f64, places: i32) -> f64 {
    let scale = 10f64.powi(places);
    (value * scale).round() / scale
}

/// Round a decimal-degree value to [`DECIMAL_PLACES`].
#[inline]
pub fn round_degrees(value: f64) -> f64 {
    round_to(value, DECIMAL_PLACES)
}

/// An angle in degrees, minutes and seconds.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DmsAngle {
    /// True for south/west (negative) angles.
    pub negative: bool,
    /// Whole degrees (magnitude).
    pub degrees: u32,
    /// Whole minutes, 0..60.
    pub minutes: u32,
    /// Seconds, 0.0..60.0, rounded to 3 decimals.
    pub seconds: f64,
}

impl DmsAngle {
    /// Create an angle whose sign is taken from `degrees`.
    pub fn new(degrees: i32, minutes: u32, seconds: f64) -> Self {
        Self::with_sign(degrees < 0, degrees.unsigned_abs(), minutes, seconds)
    }

    /// Create an angle with an explicit sign (needed for `-0° 30' 0"`).
    pub fn with_sign(negative: bool, degrees: u32, minutes: u32, seconds: f64) -> Self {
        Self {
            negative,
            degrees,
            minutes,
            seconds,
        }
    }

    /// Degree component with the sign applied.
    pub fn signed_degrees(&self) -> i64 {
        let d = i64::from(self.degrees);
        if self.negative {
            -d
        } else {
            d
        }
    }

    /// Tuple form `(degrees, minutes, seconds)` with the sign on the leading
    /// non-zero component.
    pub fn as_tuple(&self) -> (i64, i64, f64) {
        let sign = if self.negative { -1 } else { 1 };
        let minutes = i64::from(self.minutes);
        if self.degrees != 0 {
            (self.signed_degrees(), minutes, self.seconds)
        } else if minutes != 0 {
            (0, sign * minutes, self.seconds)
        } else if self.negative {
            (0, 0, -self.seconds)
        } else {
            (0, 0, self.seconds)
        }
    }

    /// Build from components as typed by a person. A minus sign on any
    /// component, including `-0`, makes the whole angle negative. Fractional
    /// degrees and minutes are truncated.
    pub fn from_signed_parts(degrees: f64, minutes: f64, seconds: f64) -> Self {
        let negative = [degrees, minutes, seconds].iter().any(|v| v.is_sign_negative());
        Self::with_sign(negative, degrees.abs() as u32, minutes.abs() as u32, seconds.abs())
    }

    /// Inverse of [`DmsAngle::as_tuple`]: negative when any component is.
    pub fn from_tuple(dms: (i64, i64, f64)) -> Self {
        let (d, m, s) = dms;
        let negative = d < 0 || m < 0 || s < 0.0;
        let degrees = u32::try_from(d.unsigned_abs()).unwrap_or(u32::MAX);
        let minutes = u32::try_from(m.unsigned_abs()).unwrap_or(u32::MAX);
        Self::with_sign(negative, degrees, minutes, s.abs())
    }
}

impl fmt::Display for DmsAngle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negative {
            f.write_str("-")?;
        }
        write!(f, "{}°{}'{:.3}\"", self.degrees, self.minutes, self.seconds)
    }
}

/// Convert decimal degrees to DMS.
///
/// The integer part becomes degrees, the fractional remainder times 60 is
/// split into whole minutes, and what remains times 60 is the seconds
/// (rounded to 3 decimals). A seconds value that rounds up to 60 carries
/// into minutes, and 60 minutes carry into degrees.
///
/// Degrees saturate at `u32::MAX`; non-finite input yields zero minutes.
pub fn to_dms(decimal_degrees: f64) -> DmsAngle {
    let negative = decimal_degrees < 0.0;
    let magnitude = if decimal_degrees.is_finite() {
        decimal_degrees.abs()
    } else {
        f64::from(u32::MAX)
    };

    let degrees = magnitude.trunc();
    let minutes_full = magnitude.fract() * 60.0;
    let minutes = minutes_full.trunc();
    let seconds = round_to(minutes_full.fract() * 60.0, SECONDS_PLACES);

    let mut degrees = degrees as u32;
    let mut minutes = minutes as u32;
    let mut seconds = seconds;

    if seconds >= 60.0 {
        seconds -= 60.0;
        minutes += 1;
    }
    if minutes >= 60 {
        minutes -= 60;
        degrees = degrees.saturating_add(1);
    }

    DmsAngle::with_sign(negative, degrees, minutes, round_to(seconds, SECONDS_PLACES))
}

/// Convert DMS to decimal degrees, rounded to 6 decimals.
pub fn to_decimal(angle: &DmsAngle) -> f64 {
    let magnitude =
        f64::from(angle.degrees) + f64::from(angle.minutes) / 60.0 + angle.seconds / 3600.0;
    let signed = if angle.negative { -magnitude } else { magnitude };
    round_degrees(signed)
}

/// Tuple-returning form of [`to_dms`]; see [`DmsAngle::as_tuple`].
pub fn deg_to_dms(decimal_degrees: f64) -> (i64, i64, f64) {
    to_dms(decimal_degrees).as_tuple()
}

/// Tuple-accepting form of [`to_decimal`]; see [`DmsAngle::from_tuple`].
pub fn dms_to_deg(dms: (i64, i64, f64)) -> f64 {
    to_decimal(&DmsAngle::from_tuple(dms))
}


// ============================================================================
// Property-Based Tests
// ============================================================================
