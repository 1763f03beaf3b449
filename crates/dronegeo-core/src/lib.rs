//! dronegeo Core - Drone photo geolocation library
//!
//! This crate reads GPS geotags from drone photographs, converts between
//! decimal degrees and degrees-minutes-seconds, projects pixel clicks onto
//! ground coordinates, profiles photo folders into flight paths and
//! aggregates projected targets into CSV result files.

pub mod angle;
pub mod config;
pub mod error;
pub mod geotag;
pub mod photo;
pub mod profile;
pub mod projection;
pub mod records;
pub mod target;

#[cfg(any(test, feature = "test-util"))]
#[doc(hidden)]
pub mod fixtures;

pub use angle::{deg_to_dms, dms_to_deg, to_decimal, to_dms, DmsAngle};
pub use config::{CameraConfig, EarthRadii, GeoConfig, SurveyArea};
pub use error::{GeoError, Result};
pub use geotag::{GpsFix, TagKey, TagTable};
pub use photo::{PhotoTags, ResolvedPhoto};
pub use profile::{profile_folder, FlightPathRecord, FlightProfile, MapExtent, ProfileDiagnostic};
pub use projection::{heading_from_bearing, CameraGeometry, GroundProjector, ImageDims, PixelClick, Projection};
pub use target::{ClickCollector, PhotoOutcome, PointList, TargetAggregator, TargetRecord};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_photo_to_target_pipeline() {
        let config = GeoConfig::default();
        let photo = ResolvedPhoto::from_bytes("DJI_0001.JPG", &fixtures::reference_jpeg()).unwrap();

        let mut clicks = PointList::new();
        clicks.on_click(0.5, 0.5);
        clicks.on_click(1.0, 0.0);

        let mut aggregator = TargetAggregator::new(config);
        let geometry = aggregator.geometry(None, 0.0);
        let outcome = aggregator.add_photo(&photo, &geometry, &clicks);
        assert_eq!(outcome.added, 2);

        let center = &aggregator.records()[0];
        assert_eq!(center.lat_deg(), 37.286447);
        assert_eq!(center.lon_deg(), 139.473903);
        assert_eq!(center.lat_dms().as_tuple(), (37, 17, 11.209));

        // Top-right corner of a 1x1 image covers half the 69.2 x 52 m footprint
        let corner = &aggregator.records()[1];
        let (east, north) = corner.ground_offset_m();
        assert!((east - 34.6).abs() < 1e-9);
        assert!((north - 26.0).abs() < 1e-9);
    }
}
