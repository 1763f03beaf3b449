//! Photo file access: tag tables and pixel dimensions.
//!
//! Each call opens the file, reads what it needs and drops the handle before
//! returning. There are no retries.

use std::fs::File;
use std::io::{BufRead, BufReader, Cursor, Seek};
use std::path::Path;

use image::ImageReader;
use serde::{Deserialize, Serialize};

use crate::error::{GeoError, Result};
use crate::geotag::{self, GpsFix, TagTable};
use crate::projection::ImageDims;

/// Read image dimensions from a reader without decoding pixel data.
pub fn read_image_dims<R: BufRead + Seek>(reader: R) -> Result<ImageDims> {
    let (width, height) = ImageReader::new(reader)
        .with_guessed_format()
        .map_err(|e| GeoError::Image(e.to_string()))?
        .into_dimensions()
        .map_err(|e| GeoError::Image(e.to_string()))?;
    Ok(ImageDims::new(width, height))
}

pub fn image_dims_from_bytes(bytes: &[u8]) -> Result<ImageDims> {
    read_image_dims(Cursor::new(bytes))
}

pub fn image_dims_from_path(path: impl AsRef<Path>) -> Result<ImageDims> {
    let path = path.as_ref();
    read_image_dims(BufReader::new(open(path)?))
}

fn open(path: &Path) -> Result<File> {
    File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => GeoError::PathNotFound(path.to_path_buf()),
        _ => GeoError::io(path, e),
    })
}

/// Final path component as a display string.
pub(crate) fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Tag table of one photo; `tags` is `None` when the photo has no EXIF.
#[derive(Debug, Clone, PartialEq)]
pub struct PhotoTags {
    pub file_name: String,
    pub tags: Option<TagTable>,
}

impl PhotoTags {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut reader = BufReader::new(open(path)?);
        Ok(Self {
            file_name: file_name_of(path),
            tags: TagTable::read_from_container(&mut reader)?,
        })
    }

    pub fn from_bytes(file_name: impl Into<String>, bytes: &[u8]) -> Result<Self> {
        Ok(Self {
            file_name: file_name.into(),
            tags: TagTable::from_bytes(bytes)?,
        })
    }

    /// GPS fix if the photo has EXIF and a GPS block.
    pub fn fix(&self) -> Result<Option<GpsFix>> {
        match &self.tags {
            Some(tags) => geotag::extract(tags),
            None => Ok(None),
        }
    }

    pub fn timestamp(&self) -> Option<String> {
        self.tags.as_ref().and_then(geotag::extract_timestamp)
    }

    pub fn bearing(&self) -> Option<f64> {
        self.tags.as_ref().and_then(geotag::extract_bearing)
    }
}

/// A photo ready for projection: it has a fix and known dimensions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedPhoto {
    pub file_name: String,
    pub dims: ImageDims,
    pub fix: GpsFix,
    pub timestamp: Option<String>,
    /// Clockwise image direction from north, when recorded.
    pub bearing: Option<f64>,
}

impl ResolvedPhoto {
    /// Read and resolve a photo file.
    ///
    /// # Errors
    ///
    /// - `GeoError::PathNotFound` if the file does not exist
    /// - `GeoError::MissingMetadata` if it has no EXIF
    /// - `GeoError::MissingGpsFix` if the EXIF has no GPS block
    /// - `GeoError::MalformedGpsBlock` if the GPS block is incomplete
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => GeoError::PathNotFound(path.to_path_buf()),
            _ => GeoError::io(path, e),
        })?;
        Self::from_bytes(file_name_of(path), &bytes)
    }

    pub fn from_bytes(file_name: impl Into<String>, bytes: &[u8]) -> Result<Self> {
        let photo = PhotoTags::from_bytes(file_name, bytes)?;
        if photo.tags.is_none() {
            return Err(GeoError::MissingMetadata(photo.file_name));
        }
        let Some(fix) = photo.fix()? else {
            return Err(GeoError::MissingGpsFix(photo.file_name));
        };
        let dims = image_dims_from_bytes(bytes)?;

        Ok(Self {
            dims,
            fix,
            timestamp: photo.timestamp(),
            bearing: photo.bearing(),
            file_name: photo.file_name,
        })
    }
}
