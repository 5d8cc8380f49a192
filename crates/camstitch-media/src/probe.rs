//! FFprobe duration lookup.

use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

use crate::command::check_ffprobe;
use crate::error::{MediaError, MediaResult};

/// Capability to read a clip's duration.
#[async_trait]
pub trait DurationProbe: Send + Sync {
    /// Duration of `path` in whole seconds.
    async fn duration_secs(&self, path: &Path) -> MediaResult<u32>;
}

/// Reads durations with the `ffprobe` binary.
#[derive(Debug, Clone)]
pub struct Ffprobe {
    program: String,
}

impl Default for Ffprobe {
    fn default() -> Self {
        Self::new("ffprobe")
    }
}

impl Ffprobe {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

#[async_trait]
impl DurationProbe for Ffprobe {
    async fn duration_secs(&self, path: &Path) -> MediaResult<u32> {
        if !path.exists() {
            return Err(MediaError::FileNotFound(path.to_path_buf()));
        }

        let program = check_ffprobe(&self.program)?;

        let output = Command::new(program)
            .args([
                "-v",
                "error",
                "-show_entries",
                "format=duration",
                "-of",
                "default=noprint_wrappers=1:nokey=1",
            ])
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await?;

        if !output.status.success() {
            return Err(MediaError::ffprobe_failed(
                format!("ffprobe exited with code {:?}", output.status.code()),
                Some(String::from_utf8_lossy(&output.stderr).to_string()),
            ));
        }

        parse_duration(&String::from_utf8_lossy(&output.stdout))
    }
}

/// Parse ffprobe's bare decimal duration and round it to whole seconds,
/// ties to even.
pub fn parse_duration(text: &str) -> MediaResult<u32> {
    let trimmed = text.trim();
    let secs: f64 = trimmed
        .parse()
        .map_err(|_| MediaError::InvalidDuration(trimmed.to_string()))?;

    if !secs.is_finite() || secs < 0.0 || secs > u32::MAX as f64 {
        return Err(MediaError::InvalidDuration(trimmed.to_string()));
    }

    Ok(secs.round_ties_even() as u32)
}
