//! Target aggregation: operator clicks in photos become ground coordinates.

mod aggregator;
mod collector;

pub use aggregator::{ClickFailure, PhotoOutcome, TargetAggregator, TargetRecord};
pub use collector::{ClickCollector, PointList};

use std::path::Path;

use crate::photo::file_name_of;

/// Default output name for a folder's targets: `target_<folder>.csv`.
pub fn target_file_name(folder: &Path) -> String {
    format!("target_{}.csv", file_name_of(folder))
}

/// Photo file name for a 4-digit image ID: `DJI_<id>.JPG`.
///
/// Returns `None` unless `id` is exactly four ASCII digits.
pub fn photo_file_name(id: &str) -> Option<String> {
    let id = id.trim();
    (id.len() == 4 && id.bytes().all(|b| b.is_ascii_digit())).then(|| format!("DJI_{id}.JPG"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_photo_file_name() {
        assert_eq!(photo_file_name("0132").as_deref(), Some("DJI_0132.JPG"));
        assert_eq!(photo_file_name(" 0007\n").as_deref(), Some("DJI_0007.JPG"));
        assert_eq!(photo_file_name("132"), None);
        assert_eq!(photo_file_name("01a2"), None);
        assert_eq!(photo_file_name("01320"), None);
    }

    #[test]
    fn test_target_file_name() {
        assert_eq!(target_file_name(Path::new("data/flight_01")), "target_flight_01.csv");
    }
}
