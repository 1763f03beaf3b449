//! CSV persistence of flight paths and targets, and merging of saved runs.
//!
//! Writers only borrow the in-memory records, so a failed save leaves them
//! intact for the caller to retry or print.

use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{GeoError, Result};
use crate::profile::{FlightPathRecord, MapExtent, ProfileDiagnostic};
use crate::target::TargetRecord;

/// Placeholder path reported for errors on caller-supplied writers and readers.
const STREAM: &str = "<stream>";

/// Suffix of flight path files: `<folder>_flist.csv`.
pub const FLIGHT_PATH_SUFFIX: &str = "_flist.csv";

/// Prefix of target files: `target_<folder>.csv`.
pub const TARGET_PREFIX: &str = "target_";

/// Header of flight path files.
pub const FLIGHT_PATH_COLUMNS: [&str; 6] = ["fname", "fpath", "DateTime", "lat", "lon", "alt"];

/// Header of target files.
pub const TARGET_COLUMNS: [&str; 13] = [
    "file",
    "lat_deg",
    "lon_deg",
    "xdata",
    "ydata",
    "xdata_trans",
    "ydata_trans",
    "x_meter",
    "y_meter",
    "x_target",
    "y_target",
    "x_deg",
    "y_deg",
];

/// One row of a flight path file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightPathRow {
    pub fname: String,
    pub fpath: String,
    #[serde(rename = "DateTime")]
    pub date_time: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub alt: Option<f64>,
}

impl From<&FlightPathRecord> for FlightPathRow {
    fn from(record: &FlightPathRecord) -> Self {
        Self {
            fname: record.fname.clone(),
            fpath: record.fpath.display().to_string(),
            date_time: record.timestamp.clone(),
            lat: record.fix.map(|f| f.lat),
            lon: record.fix.map(|f| f.lon),
            alt: record.fix.map(|f| f.alt),
        }
    }
}

/// One row of a target file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetRow {
    pub file: String,
    pub lat_deg: f64,
    pub lon_deg: f64,
    pub xdata: f64,
    pub ydata: f64,
    pub xdata_trans: f64,
    pub ydata_trans: f64,
    pub x_meter: f64,
    pub y_meter: f64,
    pub x_target: f64,
    pub y_target: f64,
    pub x_deg: f64,
    pub y_deg: f64,
}

impl From<&TargetRecord> for TargetRow {
    fn from(record: &TargetRecord) -> Self {
        let p = record.projection();
        Self {
            file: record.file().to_string(),
            lat_deg: p.lat_deg,
            lon_deg: p.lon_deg,
            xdata: p.xdata,
            ydata: p.ydata,
            xdata_trans: p.xdata_trans,
            ydata_trans: p.ydata_trans,
            x_meter: p.x_meter,
            y_meter: p.y_meter,
            x_target: p.x_target,
            y_target: p.y_target,
            x_deg: p.x_deg,
            y_deg: p.y_deg,
        }
    }
}

/// Write `header` then every row; an empty `rows` still yields the header.
fn write_rows<W, T, I>(writer: W, header: &[&str], rows: I) -> std::result::Result<(), csv::Error>
where
    W: Write,
    T: Serialize,
    I: IntoIterator<Item = T>,
{
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    wtr.write_record(header)?;
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

fn read_rows<R: Read, T: DeserializeOwned>(reader: R) -> std::result::Result<Vec<T>, csv::Error> {
    csv::Reader::from_reader(reader).deserialize().collect()
}

fn create(path: &Path) -> Result<std::fs::File> {
    std::fs::File::create(path).map_err(|e| GeoError::persistence(path, e))
}

fn open(path: &Path) -> Result<std::fs::File> {
    std::fs::File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => GeoError::PathNotFound(path.to_path_buf()),
        _ => GeoError::persistence(path, e),
    })
}

pub fn write_flight_path<W: Write>(writer: W, records: &[FlightPathRecord]) -> Result<()> {
    write_rows(writer, &FLIGHT_PATH_COLUMNS, records.iter().map(FlightPathRow::from))
        .map_err(|e| GeoError::persistence(STREAM, e))
}

pub fn write_targets<W: Write>(writer: W, records: &[TargetRecord]) -> Result<()> {
    write_target_rows(writer, &records.iter().map(TargetRow::from).collect::<Vec<_>>())
}

pub fn write_target_rows<W: Write>(writer: W, rows: &[TargetRow]) -> Result<()> {
    write_rows(writer, &TARGET_COLUMNS, rows).map_err(|e| GeoError::persistence(STREAM, e))
}

pub fn save_flight_path(path: impl AsRef<Path>, records: &[FlightPathRecord]) -> Result<()> {
    let path = path.as_ref();
    write_rows(create(path)?, &FLIGHT_PATH_COLUMNS, records.iter().map(FlightPathRow::from))
        .map_err(|e| GeoError::persistence(path, e))?;
    info!(path = %path.display(), rows = records.len(), "saved flight path");
    Ok(())
}

pub fn save_targets(path: impl AsRef<Path>, records: &[TargetRecord]) -> Result<()> {
    save_target_rows(path, &records.iter().map(TargetRow::from).collect::<Vec<_>>())
}

pub fn save_target_rows(path: impl AsRef<Path>, rows: &[TargetRow]) -> Result<()> {
    let path = path.as_ref();
    write_rows(create(path)?, &TARGET_COLUMNS, rows).map_err(|e| GeoError::persistence(path, e))?;
    info!(path = %path.display(), rows = rows.len(), "saved targets");
    Ok(())
}

pub fn read_flight_rows(path: impl AsRef<Path>) -> Result<Vec<FlightPathRow>> {
    let path = path.as_ref();
    read_rows(open(path)?).map_err(|e| GeoError::persistence(path, e))
}

pub fn read_target_rows(path: impl AsRef<Path>) -> Result<Vec<TargetRow>> {
    let path = path.as_ref();
    read_rows(open(path)?).map_err(|e| GeoError::persistence(path, e))
}

/// Every saved flight path and target of a directory, merged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Summary {
    pub routes: Vec<FlightPathRow>,
    pub targets: Vec<TargetRow>,
    pub diagnostics: Vec<ProfileDiagnostic>,
}

impl Summary {
    /// Padded extent over located route points and targets.
    pub fn extent(&self) -> Option<MapExtent> {
        let routes = self.routes.iter().filter_map(|r| r.lat.zip(r.lon));
        let targets = self.targets.iter().map(|t| (t.lat_deg, t.lon_deg));
        MapExtent::from_points(routes.chain(targets))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SavedKind {
    Route,
    Target,
}

fn classify(path: &Path) -> Option<SavedKind> {
    let name = path.file_name()?.to_str()?;
    if name.starts_with(TARGET_PREFIX) && name.ends_with(".csv") {
        Some(SavedKind::Target)
    } else if name.ends_with(FLIGHT_PATH_SUFFIX) {
        Some(SavedKind::Route)
    } else {
        None
    }
}

/// Merge every `target_*.csv` and `*_flist.csv` in `dir`.
///
/// Files are read in name order. Unreadable files become diagnostics.
pub fn collect_summary(dir: &Path) -> Result<Summary> {
    let entries = std::fs::read_dir(dir).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => GeoError::PathNotFound(dir.to_path_buf()),
        _ => GeoError::io(dir, e),
    })?;
    let mut paths: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file())
        .collect();
    paths.sort();

    let mut summary = Summary::default();
    for path in paths {
        let result = match classify(&path) {
            Some(SavedKind::Target) => read_target_rows(&path).map(|rows| summary.targets.extend(rows)),
            Some(SavedKind::Route) => read_flight_rows(&path).map(|rows| summary.routes.extend(rows)),
            None => continue,
        };
        if let Err(error) = result {
            warn!(path = %path.display(), error = %error, "skipping result file");
            summary.diagnostics.push(ProfileDiagnostic { path, error });
        }
    }

    info!(
        dir = %dir.display(),
        routes = summary.routes.len(),
        targets = summary.targets.len(),
        "collected summary"
    );
    Ok(summary)
}
