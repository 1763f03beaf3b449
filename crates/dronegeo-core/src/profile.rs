//! Flight-path profiling of a photo folder.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::{GeoConfig, SurveyArea};
use crate::error::{GeoError, Result};
use crate::geotag::GpsFix;
use crate::photo::{file_name_of, PhotoTags};

/// Fraction of the span added on each side of a [`MapExtent`].
pub const EXTENT_PADDING: f64 = 0.05;

/// One photo of a flight. Fields are `None` when the photo lacks EXIF or GPS.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightPathRecord {
    pub fname: String,
    pub fpath: PathBuf,
    pub timestamp: Option<String>,
    pub fix: Option<GpsFix>,
}

impl FlightPathRecord {
    /// Read one photo into a record.
    ///
    /// A photo without EXIF or without a GPS block still yields a record.
    /// A malformed GPS block or an unreadable file is an error.
    pub fn from_path(path: &Path) -> Result<Self> {
        let photo = PhotoTags::from_path(path)?;
        Ok(Self {
            fix: photo.fix()?,
            timestamp: photo.timestamp(),
            fname: photo.file_name,
            fpath: path.to_path_buf(),
        })
    }
}

/// A photo the profiler skipped, with the reason.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileDiagnostic {
    pub path: PathBuf,
    pub error: GeoError,
}

/// Lat/lon bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapExtent {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl MapExtent {
    /// Bounding box of `(lat, lon)` points padded by 5% of the span on each
    /// side. `None` for an empty input.
    pub fn from_points(points: impl IntoIterator<Item = (f64, f64)>) -> Option<Self> {
        let mut points = points.into_iter();
        let (lat, lon) = points.next()?;
        let tight = points.fold(
            Self {
                min_lat: lat,
                max_lat: lat,
                min_lon: lon,
                max_lon: lon,
            },
            |e, (lat, lon)| Self {
                min_lat: e.min_lat.min(lat),
                max_lat: e.max_lat.max(lat),
                min_lon: e.min_lon.min(lon),
                max_lon: e.max_lon.max(lon),
            },
        );
        Some(tight.padded(EXTENT_PADDING))
    }

    pub fn padded(&self, fraction: f64) -> Self {
        let lat_pad = fraction * (self.max_lat - self.min_lat).abs();
        let lon_pad = fraction * (self.max_lon - self.min_lon).abs();
        Self {
            min_lat: self.min_lat - lat_pad,
            max_lat: self.max_lat + lat_pad,
            min_lon: self.min_lon - lon_pad,
            max_lon: self.max_lon + lon_pad,
        }
    }

    /// Smallest extent covering both.
    pub fn union(&self, other: &Self) -> Self {
        Self {
            min_lat: self.min_lat.min(other.min_lat),
            max_lat: self.max_lat.max(other.max_lat),
            min_lon: self.min_lon.min(other.min_lon),
            max_lon: self.max_lon.max(other.max_lon),
        }
    }

    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        (self.min_lat..=self.max_lat).contains(&lat) && (self.min_lon..=self.max_lon).contains(&lon)
    }
}

/// Result of profiling a folder.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlightProfile {
    pub records: Vec<FlightPathRecord>,
    pub diagnostics: Vec<ProfileDiagnostic>,
}

impl FlightProfile {
    /// Order records by capture time. Undated records go last; ties keep
    /// enumeration order.
    pub fn sort_chronologically(&mut self) {
        self.records
            .sort_by(|a, b| match (&a.timestamp, &b.timestamp) {
                (Some(a), Some(b)) => a.cmp(b),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => std::cmp::Ordering::Equal,
            });
    }

    pub fn fixes(&self) -> impl Iterator<Item = &GpsFix> {
        self.records.iter().filter_map(|r| r.fix.as_ref())
    }

    /// Padded extent of every located record.
    pub fn extent(&self) -> Option<MapExtent> {
        MapExtent::from_points(self.fixes().map(|f| (f.lat, f.lon)))
    }

    /// Number of fixes inside `area`.
    pub fn count_within(&self, area: &SurveyArea) -> usize {
        self.fixes().filter(|f| area.contains(f.lat, f.lon)).count()
    }
}

/// Profile every photo in `folder`.
///
/// Never fails: a missing folder or unreadable photo becomes a diagnostic
/// and the scan continues. Records appear in directory enumeration order.
pub fn profile_folder(folder: &Path, config: &GeoConfig) -> FlightProfile {
    let mut profile = FlightProfile::default();

    let entries = match std::fs::read_dir(folder) {
        Ok(entries) => entries,
        Err(e) => {
            let error = if e.kind() == std::io::ErrorKind::NotFound {
                GeoError::PathNotFound(folder.to_path_buf())
            } else {
                GeoError::io(folder, e)
            };
            warn!(folder = %folder.display(), error = %error, "cannot list folder");
            profile.diagnostics.push(ProfileDiagnostic {
                path: folder.to_path_buf(),
                error,
            });
            return profile;
        }
    };

    for entry in entries {
        let path = match entry {
            Ok(entry) => entry.path(),
            Err(e) => {
                warn!(folder = %folder.display(), error = %e, "skipping unreadable entry");
                profile.diagnostics.push(ProfileDiagnostic {
                    path: folder.to_path_buf(),
                    error: GeoError::io(folder, e),
                });
                continue;
            }
        };
        if !path.is_file() || !config.is_photo(&path) {
            continue;
        }

        match FlightPathRecord::from_path(&path) {
            Ok(record) => {
                if record.fix.is_none() {
                    debug!(photo = %record.fname, "no GPS fix");
                }
                profile.records.push(record);
            }
            Err(error) => {
                warn!(path = %path.display(), error = %error, "skipping photo");
                profile.diagnostics.push(ProfileDiagnostic { path, error });
            }
        }
    }

    let located = profile.fixes().count();
    info!(
        folder = %folder.display(),
        photos = profile.records.len(),
        located,
        skipped = profile.diagnostics.len(),
        "profiled folder"
    );
    if let Some(area) = &config.survey_area {
        info!(inside = profile.count_within(area), "fixes inside survey area");
    }

    profile
}

/// Default output name for a folder's flight path: `<folder>_flist.csv`.
pub fn flight_path_file_name(folder: &Path) -> String {
    format!("{}_flist.csv", file_name_of(folder))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    fn write(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, bytes).unwrap();
        path
    }

    #[test]
    fn test_profile_mixed_folder() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "DJI_0001.JPG", &fixtures::reference_jpeg());
        write(dir.path(), "DJI_0002.JPG", fixtures::MINIMAL_JPEG);
        write(
            dir.path(),
            "DJI_0003.jpg",
            &fixtures::jpeg_with_fields(&fixtures::datetime_field("2018:05:12 10:20:00")),
        );
        write(dir.path(), "notes.txt", b"not a photo");
        std::fs::create_dir(dir.path().join("sub.JPG")).unwrap();

        let mut profile = profile_folder(dir.path(), &GeoConfig::default());
        assert!(profile.diagnostics.is_empty(), "{:?}", profile.diagnostics);
        assert_eq!(profile.records.len(), 3);
        assert_eq!(profile.fixes().count(), 1);

        profile.sort_chronologically();
        let names: Vec<_> = profile.records.iter().map(|r| r.fname.as_str()).collect();
        assert_eq!(names, ["DJI_0003.jpg", "DJI_0001.JPG", "DJI_0002.JPG"]);

        let located = &profile.records[1];
        assert_eq!(located.fix, Some(GpsFix::new(37.286447, 139.473903, 213.796)));
        assert_eq!(located.timestamp.as_deref(), Some(fixtures::REFERENCE_DATETIME));
        assert_eq!(located.fpath, dir.path().join("DJI_0001.JPG"));
        assert_eq!(profile.records[2].timestamp, None);
    }

    #[test]
    fn test_malformed_photo_is_diagnosed_and_skipped() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "good.JPG", &fixtures::reference_jpeg());

        let mut fields = fixtures::reference_fields();
        fields.retain(|f| f.tag != exif::Tag::GPSLatitude);
        let bad = write(dir.path(), "bad.JPG", &fixtures::jpeg_with_fields(&fields));

        let profile = profile_folder(dir.path(), &GeoConfig::default());
        assert_eq!(profile.records.len(), 1);
        assert_eq!(profile.records[0].fname, "good.JPG");
        assert_eq!(profile.diagnostics.len(), 1);
        assert_eq!(profile.diagnostics[0].path, bad);
        assert!(matches!(
            profile.diagnostics[0].error,
            GeoError::MalformedGpsBlock { .. }
        ));
    }

    #[test]
    fn test_missing_folder() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("flight_99");
        let profile = profile_folder(&missing, &GeoConfig::default());
        assert!(profile.records.is_empty());
        assert_eq!(
            profile.diagnostics,
            vec![ProfileDiagnostic {
                path: missing.clone(),
                error: GeoError::PathNotFound(missing),
            }]
        );
    }

    #[test]
    fn test_empty_folder() {
        let dir = tempfile::tempdir().unwrap();
        let profile = profile_folder(dir.path(), &GeoConfig::default());
        assert_eq!(profile, FlightProfile::default());
        assert_eq!(profile.extent(), None);
    }

    #[test]
    fn test_extent_padding() {
        let extent =
            MapExtent::from_points([(35.0, 139.0), (35.1, 139.2), (35.05, 139.1)]).unwrap();
        assert!((extent.min_lat - 34.995).abs() < 1e-9);
        assert!((extent.max_lat - 35.105).abs() < 1e-9);
        assert!((extent.min_lon - 138.99).abs() < 1e-9);
        assert!((extent.max_lon - 139.21).abs() < 1e-9);
        assert!(extent.contains(35.05, 139.1));
        assert!(!extent.contains(35.2, 139.1));
    }

    #[test]
    fn test_extent_single_point_has_no_padding() {
        let extent = MapExtent::from_points([(35.0, 139.0)]).unwrap();
        assert_eq!(extent.min_lat, 35.0);
        assert_eq!(extent.max_lon, 139.0);
    }

    #[test]
    fn test_count_within_area() {
        let record = |lat, lon| FlightPathRecord {
            fname: String::new(),
            fpath: PathBuf::new(),
            timestamp: None,
            fix: Some(GpsFix::new(lat, lon, 0.0)),
        };
        let profile = FlightProfile {
            records: vec![record(1.5, 2.5), record(5.0, 5.0)],
            diagnostics: Vec::new(),
        };
        let area = SurveyArea::new([(1.0, 2.0), (1.0, 3.0), (2.0, 3.0), (2.0, 2.0)]);
        assert_eq!(profile.count_within(&area), 1);
    }

    #[test]
    fn test_flight_path_file_name() {
        assert_eq!(
            flight_path_file_name(Path::new("/data/20180512_takao")),
            "20180512_takao_flist.csv"
        );
    }
}
