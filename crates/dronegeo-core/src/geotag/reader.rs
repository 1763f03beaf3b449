//! GPS fix and timestamp extraction from a [`TagTable`].

use super::{GpsFix, Rational, TagKey, TagTable};
use crate::error::{GeoError, Result};

/// Extract the GPS fix from a tag table.
///
/// Returns `Ok(None)` when the photo has no GPS sub-table, and
/// `GeoError::MalformedGpsBlock` when the sub-table is present but a
/// required key is missing or unusable.
pub fn extract(tags: &TagTable) -> Result<Option<GpsFix>> {
    if !tags.has_gps_block() {
        return Ok(None);
    }

    let lat = coordinate(tags, TagKey::GpsLatitudeRef, TagKey::GpsLatitude, 'S', 90.0)?;
    let lon = coordinate(tags, TagKey::GpsLongitudeRef, TagKey::GpsLongitude, 'W', 180.0)?;
    let alt = altitude(tags)?;

    Ok(Some(GpsFix::new(lat, lon, alt)))
}

/// Capture time exactly as stored in the `DateTime` tag.
pub fn extract_timestamp(tags: &TagTable) -> Option<String> {
    tags.get(TagKey::DateTime)
        .and_then(|v| v.as_ascii())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Image direction bearing (degrees clockwise from north), if recorded.
pub fn extract_bearing(tags: &TagTable) -> Option<f64> {
    tags.get(TagKey::GpsImgDirection)?
        .as_rationals()?
        .first()
        .and_then(|r| r.to_f64())
}

/// -1 for the negative hemisphere letter, +1 otherwise.
fn hemisphere_sign(reference: &str, negative: char) -> f64 {
    match reference.trim().chars().next() {
        Some(c) if c.eq_ignore_ascii_case(&negative) => -1.0,
        _ => 1.0,
    }
}

fn dms_triple(parts: &[Rational], key: TagKey) -> Result<f64> {
    let malformed = || GeoError::MalformedGpsBlock { key };
    if parts.len() < 3 {
        return Err(malformed());
    }
    let deg = parts[0].to_f64().ok_or_else(malformed)?;
    let min = parts[1].to_f64().ok_or_else(malformed)?;
    let sec = parts[2].to_f64().ok_or_else(malformed)?;
    Ok(deg + min / 60.0 + sec / 3600.0)
}

fn coordinate(
    tags: &TagTable,
    ref_key: TagKey,
    value_key: TagKey,
    negative: char,
    limit: f64,
) -> Result<f64> {
    let sign = hemisphere_sign(tags.require_ascii(ref_key)?, negative);
    let magnitude = dms_triple(tags.require_rationals(value_key)?, value_key)?;
    if magnitude > limit {
        return Err(GeoError::MalformedGpsBlock { key: value_key });
    }
    Ok(sign * magnitude)
}

fn altitude(tags: &TagTable) -> Result<f64> {
    let key = TagKey::GpsAltitude;
    let alt = tags
        .require_rationals(key)?
        .first()
        .and_then(|r| r.to_f64())
        .ok_or(GeoError::MalformedGpsBlock { key })?;

    // AltitudeRef 1 means below sea level
    let below = tags
        .get(TagKey::GpsAltitudeRef)
        .and_then(|v| v.first_uint())
        == Some(1);
    Ok(if below { -alt } else { alt })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use crate::geotag::TagValue;

    fn table(lat_ref: &str, lon_ref: &str) -> TagTable {
        let mut t = TagTable::new();
        t.insert(TagKey::GpsLatitudeRef, TagValue::Ascii(lat_ref.into()))
            .insert(
                TagKey::GpsLatitude,
                TagValue::Rationals(vec![
                    Rational::new(37, 1),
                    Rational::new(17, 1),
                    Rational::new(112092, 10000),
                ]),
            )
            .insert(TagKey::GpsLongitudeRef, TagValue::Ascii(lon_ref.into()))
            .insert(
                TagKey::GpsLongitude,
                TagValue::Rationals(vec![
                    Rational::new(139, 1),
                    Rational::new(28, 1),
                    Rational::new(260508, 10000),
                ]),
            )
            .insert(
                TagKey::GpsAltitude,
                TagValue::Rationals(vec![Rational::new(213796, 1000)]),
            );
        t
    }

    #[test]
    fn test_reference_fix() {
        let fix = extract(&table("N", "E")).unwrap().unwrap();
        assert_eq!(fix, GpsFix::new(37.286447, 139.473903, 213.796));
    }

    #[test]
    fn test_south_west_are_negative() {
        let fix = extract(&table("S", "W")).unwrap().unwrap();
        assert_eq!(fix.lat, -37.286447);
        assert_eq!(fix.lon, -139.473903);
    }

    #[test]
    fn test_mixed_hemispheres() {
        let fix = extract(&table("S", "E")).unwrap().unwrap();
        assert!(fix.lat < 0.0);
        assert!(fix.lon > 0.0);
    }

    #[test]
    fn test_no_gps_block_is_empty() {
        let mut t = TagTable::new();
        t.insert(TagKey::DateTime, TagValue::Ascii("2018:05:12 10:22:33".into()));
        assert_eq!(extract(&t), Ok(None));
    }

    #[test]
    fn test_missing_required_key_is_malformed() {
        for key in TagKey::REQUIRED_GPS {
            let mut t = TagTable::new();
            t.mark_gps_block();
            for other in TagKey::REQUIRED_GPS.iter().filter(|k| **k != key) {
                if let Some(v) = table("N", "E").get(*other) {
                    t.insert(*other, v.clone());
                }
            }
            assert_eq!(extract(&t), Err(GeoError::MalformedGpsBlock { key }));
        }
    }

    #[test]
    fn test_empty_gps_block_is_malformed() {
        let mut t = TagTable::new();
        t.mark_gps_block();
        assert!(matches!(
            extract(&t),
            Err(GeoError::MalformedGpsBlock { .. })
        ));
    }

    #[test]
    fn test_short_dms_is_malformed() {
        let mut t = table("N", "E");
        t.insert(
            TagKey::GpsLatitude,
            TagValue::Rationals(vec![Rational::new(37, 1)]),
        );
        assert_eq!(
            extract(&t),
            Err(GeoError::MalformedGpsBlock {
                key: TagKey::GpsLatitude
            })
        );
    }

    #[test]
    fn test_zero_denominator_is_malformed() {
        let mut t = table("N", "E");
        t.insert(
            TagKey::GpsAltitude,
            TagValue::Rationals(vec![Rational::new(100, 0)]),
        );
        assert_eq!(
            extract(&t),
            Err(GeoError::MalformedGpsBlock {
                key: TagKey::GpsAltitude
            })
        );
    }

    #[test]
    fn test_out_of_range_latitude_is_malformed() {
        let mut t = table("N", "E");
        t.insert(
            TagKey::GpsLatitude,
            TagValue::Rationals(vec![
                Rational::new(91, 1),
                Rational::new(0, 1),
                Rational::new(0, 1),
            ]),
        );
        assert!(extract(&t).is_err());
    }

    #[test]
    fn test_below_sea_level() {
        let mut t = table("N", "E");
        t.insert(TagKey::GpsAltitudeRef, TagValue::Bytes(vec![1]));
        let fix = extract(&t).unwrap().unwrap();
        assert_eq!(fix.alt, -213.796);
    }

    #[test]
    fn test_timestamp_verbatim() {
        let mut t = TagTable::new();
        assert_eq!(extract_timestamp(&t), None);
        t.insert(TagKey::DateTime, TagValue::Ascii("2018:05:12 10:22:33".into()));
        assert_eq!(extract_timestamp(&t).as_deref(), Some("2018:05:12 10:22:33"));
    }

    #[test]
    fn test_bearing() {
        let mut t = table("N", "E");
        assert_eq!(extract_bearing(&t), None);
        t.insert(
            TagKey::GpsImgDirection,
            TagValue::Rationals(vec![Rational::new(4500, 100)]),
        );
        assert_eq!(extract_bearing(&t), Some(45.0));
    }

    #[test]
    fn test_reference_jpeg_end_to_end() {
        let tags = TagTable::from_bytes(&fixtures::reference_jpeg())
            .unwrap()
            .unwrap();
        let fix = extract(&tags).unwrap().unwrap();
        assert_eq!(fix, GpsFix::new(37.286447, 139.473903, 213.796));
        assert_eq!(
            extract_timestamp(&tags).as_deref(),
            Some(fixtures::REFERENCE_DATETIME)
        );
    }

    #[test]
    fn test_incomplete_jpeg_gps_block() {
        let mut fields = fixtures::datetime_field("2020:01:01 00:00:00");
        fields.extend(
            fixtures::gps_fields(
                "N",
                [(37, 1), (17, 1), (0, 1)],
                "E",
                [(139, 1), (28, 1), (0, 1)],
                (100, 1),
            )
            .into_iter()
            .take(2),
        );
        let tags = TagTable::from_bytes(&fixtures::jpeg_with_fields(&fields))
            .unwrap()
            .unwrap();
        assert_eq!(
            extract(&tags),
            Err(GeoError::MalformedGpsBlock {
                key: TagKey::GpsLongitudeRef
            })
        );
    }
}
