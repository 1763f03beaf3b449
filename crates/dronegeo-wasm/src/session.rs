//! Browser target-marking session.
//!
//! The page forwards canvas clicks to [`JsTargetSession::on_click`] and
//! [`JsTargetSession::on_remove`], then commits the photo once the operator
//! is done with it.

use dronegeo_core::records::{self, TargetRow};
use dronegeo_core::target::{ClickCollector, PointList, TargetAggregator};
use dronegeo_core::{CameraConfig, GeoConfig, GeoError, ResolvedPhoto};
use wasm_bindgen::prelude::*;

/// Accumulates targets across the photos of one marking session.
#[wasm_bindgen]
#[derive(Debug, Clone)]
pub struct JsTargetSession {
    aggregator: TargetAggregator,
    points: PointList,
    altitude_m: f64,
    heading_deg: f64,
    last_failures: Vec<String>,
}

impl JsTargetSession {
    fn build(
        altitude_m: f64,
        focal_length_mm: f64,
        sensor_width_mm: f64,
        sensor_height_mm: f64,
    ) -> Result<Self, GeoError> {
        let config = GeoConfig {
            camera: CameraConfig {
                focal_length_mm,
                sensor_width_mm,
                sensor_height_mm,
            },
            default_altitude_m: altitude_m,
            ..GeoConfig::default()
        };
        config.validate()?;
        Ok(Self {
            aggregator: TargetAggregator::new(config),
            points: PointList::new(),
            altitude_m,
            heading_deg: 0.0,
            last_failures: Vec::new(),
        })
    }

    fn commit(&mut self, file_name: &str, bytes: &[u8]) -> Result<usize, GeoError> {
        let photo = ResolvedPhoto::from_bytes(file_name, bytes)?;
        let geometry = self
            .aggregator
            .geometry(Some(self.altitude_m), self.heading_deg);
        let outcome = self.aggregator.add_photo(&photo, &geometry, &self.points);
        self.last_failures = outcome
            .failures
            .iter()
            .map(|f| format!("({}, {}): {}", f.click.x, f.click.y, f.error))
            .collect();
        self.points.clear();
        Ok(outcome.added)
    }

    fn rows(&self) -> Vec<TargetRow> {
        self.aggregator
            .records()
            .iter()
            .map(TargetRow::from)
            .collect()
    }

    fn csv(&self) -> Result<String, GeoError> {
        let mut buf = Vec::new();
        records::write_targets(&mut buf, self.aggregator.records())?;
        String::from_utf8(buf).map_err(|e| GeoError::Persistence {
            path: "<csv>".into(),
            reason: e.to_string(),
        })
    }
}

#[wasm_bindgen]
impl JsTargetSession {
    /// Start a session for a camera flying at `altitude_m` above ground.
    #[wasm_bindgen(constructor)]
    pub fn new(
        altitude_m: f64,
        focal_length_mm: f64,
        sensor_width_mm: f64,
        sensor_height_mm: f64,
    ) -> Result<JsTargetSession, JsValue> {
        Self::build(altitude_m, focal_length_mm, sensor_width_mm, sensor_height_mm)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Heading of the image top, degrees counter-clockwise from north.
    pub fn set_heading(&mut self, heading_deg: f64) {
        self.heading_deg = heading_deg;
    }

    pub fn set_altitude(&mut self, altitude_m: f64) {
        self.altitude_m = altitude_m;
    }

    pub fn on_click(&mut self, x: f64, y: f64) {
        self.points.on_click(x, y);
    }

    /// Remove the pending point nearest to `(x, y)`.
    pub fn on_remove(&mut self, x: f64, y: f64) {
        self.points.on_remove(x, y);
    }

    /// Pending points as a flat `[x0, y0, x1, y1, ...]` array.
    pub fn current_points(&self) -> Vec<f64> {
        self.points
            .as_slice()
            .iter()
            .flat_map(|p| [p.x, p.y])
            .collect()
    }

    #[wasm_bindgen(getter)]
    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    /// Project the pending points in the photo and clear them.
    ///
    /// Returns the number of targets added. Throws, keeping the pending
    /// points, when the photo has no usable GPS fix.
    pub fn commit_photo(&mut self, file_name: &str, bytes: &[u8]) -> Result<usize, JsValue> {
        self.commit(file_name, bytes)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Points of the last commit that could not be projected.
    pub fn last_failures(&self) -> Vec<String> {
        self.last_failures.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn record_count(&self) -> usize {
        self.aggregator.len()
    }

    /// All targets as plain objects with the CSV column names.
    pub fn records(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.rows()).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// All targets as CSV text.
    pub fn to_csv(&self) -> Result<String, JsValue> {
        self.csv().map_err(|e| JsValue::from_str(&e.to_string()))
    }
}
