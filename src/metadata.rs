use chrono::{NaiveDate, NaiveDateTime};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::process::Command;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum MetadataError {
    #[error("Failed to open {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot read EXIF data from {path}: {message}")]
    Exif { path: PathBuf, message: String },

    #[error("No capture date in {0}")]
    NoTimestamp(PathBuf),

    #[error("Cannot run {tool}: {source}")]
    ToolUnavailable {
        tool: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("GPS write failed for {path}: {message}")]
    WriteFailed { path: PathBuf, message: String },
}

/// Image metadata collaborator
pub trait MetadataSource {
    /// Capture date and time of an image
    fn read_capture_timestamp(&self, path: &Path) -> Result<NaiveDateTime, MetadataError>;

    /// Embed GPS coordinates. Returns only once the write is confirmed.
    fn write_gps(&self, path: &Path, latitude: f64, longitude: f64) -> Result<(), MetadataError>;
}

/// Reads EXIF in-process and writes GPS through the exiftool binary
#[derive(Debug, Clone)]
pub struct ExifToolMetadata {
    exiftool: PathBuf,
}

impl ExifToolMetadata {
    pub fn new(exiftool: impl Into<PathBuf>) -> Self {
        Self {
            exiftool: exiftool.into(),
        }
    }
}

/// `YYYY:MM:DD HH:MM:SS` as stored in EXIF
fn parse_exif_datetime(raw: &[u8]) -> Option<NaiveDateTime> {
    let dt = exif::DateTime::from_ascii(raw).ok()?;
    NaiveDate::from_ymd_opt(dt.year.into(), dt.month.into(), dt.day.into())?.and_hms_opt(
        dt.hour.into(),
        dt.minute.into(),
        dt.second.into(),
    )
}

/// exiftool arguments writing absolute coordinates plus hemisphere refs
pub fn gps_arguments(latitude: f64, longitude: f64) -> Vec<String> {
    let lat_ref = if latitude >= 0.0 { "N" } else { "S" };
    let lon_ref = if longitude >= 0.0 { "E" } else { "W" };
    vec![
        "-overwrite_original".to_string(),
        format!("-GPSLatitude={}", latitude.abs()),
        format!("-GPSLatitudeRef={}", lat_ref),
        format!("-GPSLongitude={}", longitude.abs()),
        format!("-GPSLongitudeRef={}", lon_ref),
    ]
}

impl MetadataSource for ExifToolMetadata {
    fn read_capture_timestamp(&self, path: &Path) -> Result<NaiveDateTime, MetadataError> {
        let file = File::open(path).map_err(|e| MetadataError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let mut reader = BufReader::new(file);

        let exif = exif::Reader::new()
            .read_from_container(&mut reader)
            .map_err(|e| MetadataError::Exif {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

        for tag in [exif::Tag::DateTimeOriginal, exif::Tag::DateTime] {
            let Some(field) = exif.get_field(tag, exif::In::PRIMARY) else {
                continue;
            };
            if let exif::Value::Ascii(ref values) = field.value {
                if let Some(value) = values.first().and_then(|v| parse_exif_datetime(v)) {
                    debug!(path = ?path, %tag, %value, "Read capture timestamp");
                    return Ok(value);
                }
            }
            warn!(path = ?path, %tag, "Unparseable EXIF date");
        }

        Err(MetadataError::NoTimestamp(path.to_path_buf()))
    }

    fn write_gps(&self, path: &Path, latitude: f64, longitude: f64) -> Result<(), MetadataError> {
        debug!(path = ?path, latitude, longitude, "Writing GPS coordinates");

        let output = Command::new(&self.exiftool)
            .args(gps_arguments(latitude, longitude))
            .arg(path)
            .output()
            .map_err(|e| MetadataError::ToolUnavailable {
                tool: self.exiftool.clone(),
                source: e,
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);

        if !output.status.success() || !stdout.contains("1 image files updated") {
            let message = [stdout.trim(), stderr.trim()]
                .iter()
                .filter(|s| !s.is_empty())
                .copied()
                .collect::<Vec<_>>()
                .join(" ");
            return Err(MetadataError::WriteFailed {
                path: path.to_path_buf(),
                message: if message.is_empty() {
                    format!("exiftool exited with {}", output.status)
                } else {
                    message
                },
            });
        }

        Ok(())
    }
}
