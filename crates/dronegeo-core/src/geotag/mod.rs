//! Geotag extraction from photo metadata.
//!
//! Photos are decoded into a [`TagTable`] holding only the keys the reader
//! knows about, then reduced to a [`GpsFix`] and a capture timestamp.
//!
//! Three outcomes are kept apart:
//! - no EXIF at all: [`TagTable::read_from_container`] returns `Ok(None)`
//! - EXIF without a GPS block: [`extract`] returns `Ok(None)`
//! - a GPS block missing required keys: `GeoError::MalformedGpsBlock`

mod fix;
mod reader;
mod tags;

pub use fix::GpsFix;
pub use reader::{extract, extract_bearing, extract_timestamp};
pub use tags::{Rational, TagKey, TagTable, TagValue};
