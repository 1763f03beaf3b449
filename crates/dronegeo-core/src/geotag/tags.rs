//! Typed tag table decoded from a photo's EXIF container.

use std::collections::BTreeMap;
use std::fmt;
use std::io::{BufRead, Cursor, Seek};

use exif::{Context, Exif, In, Reader, Tag, Value};
use serde::{Deserialize, Serialize};

use crate::error::{GeoError, Result};

/// The EXIF keys the geotag reader understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TagKey {
    /// Capture time, `YYYY:MM:DD HH:MM:SS`.
    DateTime,
    /// `N` or `S`.
    GpsLatitudeRef,
    /// Degree, minute, second rationals.
    GpsLatitude,
    /// `E` or `W`.
    GpsLongitudeRef,
    /// Degree, minute, second rationals.
    GpsLongitude,
    /// 0 = above sea level, 1 = below.
    GpsAltitudeRef,
    /// Altitude in meters as a rational.
    GpsAltitude,
    /// Bearing of the image direction, clockwise from north.
    GpsImgDirection,
}

impl TagKey {
    /// Every known key.
    pub const ALL: [TagKey; 8] = [
        TagKey::DateTime,
        TagKey::GpsLatitudeRef,
        TagKey::GpsLatitude,
        TagKey::GpsLongitudeRef,
        TagKey::GpsLongitude,
        TagKey::GpsAltitudeRef,
        TagKey::GpsAltitude,
        TagKey::GpsImgDirection,
    ];

    /// Keys a GPS block must contain to yield a fix.
    pub const REQUIRED_GPS: [TagKey; 5] = [
        TagKey::GpsLatitudeRef,
        TagKey::GpsLatitude,
        TagKey::GpsLongitudeRef,
        TagKey::GpsLongitude,
        TagKey::GpsAltitude,
    ];

    /// The EXIF tag name.
    pub fn name(self) -> &'static str {
        match self {
            TagKey::DateTime => "DateTime",
            TagKey::GpsLatitudeRef => "GPSLatitudeRef",
            TagKey::GpsLatitude => "GPSLatitude",
            TagKey::GpsLongitudeRef => "GPSLongitudeRef",
            TagKey::GpsLongitude => "GPSLongitude",
            TagKey::GpsAltitudeRef => "GPSAltitudeRef",
            TagKey::GpsAltitude => "GPSAltitude",
            TagKey::GpsImgDirection => "GPSImgDirection",
        }
    }

    /// The corresponding kamadak-exif tag.
    pub fn exif_tag(self) -> Tag {
        match self {
            TagKey::DateTime => Tag::DateTime,
            TagKey::GpsLatitudeRef => Tag::GPSLatitudeRef,
            TagKey::GpsLatitude => Tag::GPSLatitude,
            TagKey::GpsLongitudeRef => Tag::GPSLongitudeRef,
            TagKey::GpsLongitude => Tag::GPSLongitude,
            TagKey::GpsAltitudeRef => Tag::GPSAltitudeRef,
            TagKey::GpsAltitude => Tag::GPSAltitude,
            TagKey::GpsImgDirection => Tag::GPSImgDirection,
        }
    }

    pub fn from_exif_tag(tag: Tag) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.exif_tag() == tag)
    }

    /// True for keys stored in the GPS sub-IFD.
    pub fn is_gps(self) -> bool {
        !matches!(self, TagKey::DateTime)
    }

    /// True if a GPS block missing this key is malformed.
    pub fn is_required(self) -> bool {
        Self::REQUIRED_GPS.contains(&self)
    }
}

impl fmt::Display for TagKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An unsigned EXIF rational.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rational {
    pub num: u32,
    pub denom: u32,
}

impl Rational {
    pub fn new(num: u32, denom: u32) -> Self {
        Self { num, denom }
    }

    /// The quotient, or `None` for a zero denominator.
    pub fn to_f64(self) -> Option<f64> {
        (self.denom != 0).then(|| f64::from(self.num) / f64::from(self.denom))
    }
}

impl From<exif::Rational> for Rational {
    fn from(r: exif::Rational) -> Self {
        Self::new(r.num, r.denom)
    }
}

/// Raw value of a tag, reduced to the shapes geotags use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TagValue {
    Ascii(String),
    Rationals(Vec<Rational>),
    Bytes(Vec<u8>),
    Integers(Vec<u32>),
}

impl TagValue {
    pub fn as_ascii(&self) -> Option<&str> {
        match self {
            TagValue::Ascii(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_rationals(&self) -> Option<&[Rational]> {
        match self {
            TagValue::Rationals(v) => Some(v),
            _ => None,
        }
    }

    /// First element as an integer, for BYTE/SHORT/LONG tags.
    pub fn first_uint(&self) -> Option<u32> {
        match self {
            TagValue::Bytes(v) => v.first().map(|&b| u32::from(b)),
            TagValue::Integers(v) => v.first().copied(),
            _ => None,
        }
    }

    fn from_exif(value: &Value) -> Option<Self> {
        match value {
            Value::Ascii(parts) => {
                let text = parts
                    .first()
                    .map(|bytes| String::from_utf8_lossy(bytes).trim_end_matches('\0').to_string())
                    .unwrap_or_default();
                Some(TagValue::Ascii(text))
            }
            Value::Rational(v) => Some(TagValue::Rationals(
                v.iter().copied().map(Rational::from).collect(),
            )),
            Value::Byte(v) => Some(TagValue::Bytes(v.clone())),
            Value::Short(v) => Some(TagValue::Integers(v.iter().map(|&s| u32::from(s)).collect())),
            Value::Long(v) => Some(TagValue::Integers(v.clone())),
            _ => None,
        }
    }
}

/// Lookup from known tag keys to raw values.
///
/// Tracks separately whether a GPS sub-table was present at all, so an empty
/// GPS block is distinguishable from a photo without one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TagTable {
    values: BTreeMap<TagKey, TagValue>,
    gps_block: bool,
}

impl TagTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value; inserting a GPS key marks the GPS block as present.
    pub fn insert(&mut self, key: TagKey, value: TagValue) -> &mut Self {
        if key.is_gps() {
            self.gps_block = true;
        }
        self.values.insert(key, value);
        self
    }

    /// Mark the GPS sub-table as present even if none of its keys are known.
    pub fn mark_gps_block(&mut self) -> &mut Self {
        self.gps_block = true;
        self
    }

    pub fn has_gps_block(&self) -> bool {
        self.gps_block
    }

    pub fn get(&self, key: TagKey) -> Option<&TagValue> {
        self.values.get(&key)
    }

    /// Fetch a key that must be present.
    pub fn require(&self, key: TagKey) -> Result<&TagValue> {
        self.get(key).ok_or(GeoError::MalformedGpsBlock { key })
    }

    pub fn require_ascii(&self, key: TagKey) -> Result<&str> {
        self.require(key)?
            .as_ascii()
            .ok_or(GeoError::MalformedGpsBlock { key })
    }

    pub fn require_rationals(&self, key: TagKey) -> Result<&[Rational]> {
        self.require(key)?
            .as_rationals()
            .ok_or(GeoError::MalformedGpsBlock { key })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Build a table from decoded EXIF, keeping only primary-image fields.
    pub fn from_exif(exif: &Exif) -> Self {
        let mut table = Self::new();
        for field in exif.fields().filter(|f| f.ifd_num == In::PRIMARY) {
            if field.tag.context() == Context::Gps {
                table.gps_block = true;
            }
            let Some(key) = TagKey::from_exif_tag(field.tag) else {
                continue;
            };
            if let Some(value) = TagValue::from_exif(&field.value) {
                table.insert(key, value);
            }
        }
        table
    }

    /// Read the tag table from an image container (JPEG, TIFF, ...).
    ///
    /// Returns `Ok(None)` when the container carries no EXIF data.
    pub fn read_from_container<R: BufRead + Seek>(reader: &mut R) -> Result<Option<Self>> {
        match Reader::new().read_from_container(reader) {
            Ok(exif) => Ok(Some(Self::from_exif(&exif))),
            Err(
                exif::Error::NotFound(_)
                | exif::Error::NotSupported(_)
                | exif::Error::BlankValue(_),
            ) => Ok(None),
            Err(e) => Err(GeoError::Exif(e.to_string())),
        }
    }

    /// Read the tag table from in-memory photo bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Option<Self>> {
        Self::read_from_container(&mut Cursor::new(bytes))
    }
}
