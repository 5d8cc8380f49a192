//! Capture timestamp parsing.
//!
//! Dash-cam files are named `YYYYMMDD_HHMMSS<tags>.<ext>`; the first 15
//! characters of the name before the first `.` carry the capture time.

use chrono::NaiveDateTime;
use std::path::Path;
use thiserror::Error;

/// Number of characters of the stem holding the capture time.
pub const CAPTURE_PREFIX_LEN: usize = 15;

/// `chrono` format of the capture time prefix.
pub const CAPTURE_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Human-readable format used for group titles (and output file names).
pub const TITLE_FORMAT: &str = "%d %b %Y %H-%M-%S";

/// File name parsing error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NameError {
    #[error("File name is not valid UTF-8: {0}")]
    NotUtf8(String),

    #[error("File name '{0}' is shorter than the 15-character timestamp prefix")]
    TooShort(String),

    #[error("Invalid capture timestamp '{prefix}' in '{name}'")]
    InvalidTimestamp { name: String, prefix: String },
}

/// Return the part of a file name before its first `.`.
pub fn file_stem(path: &Path) -> Result<&str, NameError> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| NameError::NotUtf8(path.display().to_string()))?;
    Ok(name.split('.').next().unwrap_or(name))
}

/// Parse the capture timestamp from a file name.
///
/// # Examples
/// ```
/// use std::path::Path;
/// use camstitch_models::timestamp::parse_capture_time;
///
/// let ts = parse_capture_time(Path::new("20230305_101500_NF.mp4")).unwrap();
/// assert_eq!(ts.to_string(), "2023-03-05 10:15:00");
/// ```
pub fn parse_capture_time(path: &Path) -> Result<NaiveDateTime, NameError> {
    let stem = file_stem(path)?;

    let prefix: String = stem.chars().take(CAPTURE_PREFIX_LEN).collect();
    if prefix.chars().count() < CAPTURE_PREFIX_LEN {
        return Err(NameError::TooShort(stem.to_string()));
    }

    NaiveDateTime::parse_from_str(&prefix, CAPTURE_FORMAT).map_err(|_| {
        NameError::InvalidTimestamp {
            name: stem.to_string(),
            prefix,
        }
    })
}

/// Title of a group starting at `start`, e.g. `05 Mar 2023 10-15-00`.
pub fn group_title(start: &NaiveDateTime) -> String {
    start.format(TITLE_FORMAT).to_string()
}
