//! Accumulates projected targets across the photos of a session.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::ClickCollector;
use crate::angle::DmsAngle;
use crate::config::GeoConfig;
use crate::error::GeoError;
use crate::photo::ResolvedPhoto;
use crate::projection::{CameraGeometry, GroundProjector, PixelClick, Projection};

/// One projected target. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetRecord {
    file: String,
    projection: Projection,
}

impl TargetRecord {
    pub fn new(file: impl Into<String>, projection: Projection) -> Self {
        Self {
            file: file.into(),
            projection,
        }
    }

    pub fn file(&self) -> &str {
        &self.file
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    pub fn lat_deg(&self) -> f64 {
        self.projection.lat_deg
    }

    pub fn lon_deg(&self) -> f64 {
        self.projection.lon_deg
    }

    pub fn lat_dms(&self) -> DmsAngle {
        self.projection.lat_dms
    }

    pub fn lon_dms(&self) -> DmsAngle {
        self.projection.lon_dms
    }

    /// Raw click in pixels.
    pub fn pixel(&self) -> PixelClick {
        PixelClick::new(self.projection.xdata, self.projection.ydata)
    }

    /// Click relative to the image center, Y up.
    pub fn centered_pixel(&self) -> (f64, f64) {
        (self.projection.xdata_trans, self.projection.ydata_trans)
    }

    /// Offset in meters in the image frame.
    pub fn offset_m(&self) -> (f64, f64) {
        (self.projection.x_meter, self.projection.y_meter)
    }

    /// Offset in meters east and north.
    pub fn ground_offset_m(&self) -> (f64, f64) {
        (self.projection.x_target, self.projection.y_target)
    }

    /// Longitude and latitude deltas in degrees.
    pub fn delta_deg(&self) -> (f64, f64) {
        (self.projection.x_deg, self.projection.y_deg)
    }
}

/// A click that could not be projected.
#[derive(Debug, Clone, PartialEq)]
pub struct ClickFailure {
    pub click: PixelClick,
    pub error: GeoError,
}

/// What [`TargetAggregator::add_photo`] did with one photo's clicks.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PhotoOutcome {
    pub added: usize,
    pub failures: Vec<ClickFailure>,
}

/// Append-only collection of target records for a session.
#[derive(Debug, Clone)]
pub struct TargetAggregator {
    config: GeoConfig,
    projector: GroundProjector,
    records: Vec<TargetRecord>,
}

impl TargetAggregator {
    pub fn new(config: GeoConfig) -> Self {
        Self {
            projector: GroundProjector::from_config(&config),
            config,
            records: Vec::new(),
        }
    }

    pub fn config(&self) -> &GeoConfig {
        &self.config
    }

    /// Camera geometry from the configured camera.
    ///
    /// `altitude_m` falls back to the configured default.
    pub fn geometry(&self, altitude_m: Option<f64>, heading_deg: f64) -> CameraGeometry {
        CameraGeometry::from_camera(
            &self.config.camera,
            altitude_m.unwrap_or(self.config.default_altitude_m),
            heading_deg,
        )
    }

    /// Project every click currently held by `clicks` and append the results.
    ///
    /// A click that fails to project is reported in the outcome and does not
    /// affect the others.
    pub fn add_photo(
        &mut self,
        photo: &ResolvedPhoto,
        geometry: &CameraGeometry,
        clicks: &dyn ClickCollector,
    ) -> PhotoOutcome {
        let mut outcome = PhotoOutcome::default();
        for click in clicks.current_points() {
            match self.projector.project(&photo.fix, geometry, click, photo.dims) {
                Ok(projection) => {
                    self.records
                        .push(TargetRecord::new(photo.file_name.clone(), projection));
                    outcome.added += 1;
                }
                Err(error) => {
                    warn!(photo = %photo.file_name, x = click.x, y = click.y, error = %error, "click not projected");
                    outcome.failures.push(ClickFailure { click, error });
                }
            }
        }
        debug!(photo = %photo.file_name, added = outcome.added, total = self.records.len(), "photo committed");
        outcome
    }

    pub fn records(&self) -> &[TargetRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn into_records(self) -> Vec<TargetRecord> {
        self.records
    }
}
