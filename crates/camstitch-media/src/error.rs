//! Error types for media operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for media operations.
pub type MediaResult<T> = Result<T, MediaError>;

/// Errors that can occur while driving FFmpeg and FFprobe.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("FFmpeg not found: {0}")]
    FfmpegNotFound(String),

    #[error("FFprobe not found: {0}")]
    FfprobeNotFound(String),

    #[error("FFmpeg exited with code {exit_code:?}: {command}")]
    FfmpegFailed {
        command: String,
        exit_code: Option<i32>,
        stdout: Option<String>,
        stderr: Option<String>,
    },

    #[error("FFprobe command failed: {message}")]
    FfprobeFailed {
        message: String,
        stderr: Option<String>,
    },

    #[error("Invalid duration output: '{0}'")]
    InvalidDuration(String),

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl MediaError {
    /// Create an FFmpeg failure error.
    pub fn ffmpeg_failed(
        command: impl Into<String>,
        exit_code: Option<i32>,
        stdout: Option<String>,
        stderr: Option<String>,
    ) -> Self {
        Self::FfmpegFailed {
            command: command.into(),
            exit_code,
            stdout,
            stderr,
        }
    }

    /// Create an FFprobe failure error.
    pub fn ffprobe_failed(message: impl Into<String>, stderr: Option<String>) -> Self {
        Self::FfprobeFailed {
            message: message.into(),
            stderr,
        }
    }

    /// Full report of a failed run, including captured streams.
    pub fn report(&self) -> String {
        match self {
            Self::FfmpegFailed {
                command,
                exit_code,
                stdout,
                stderr,
            } => format!(
                "ffmpeg exited with code {}\n{}\nStdout: {}\nStderr: {}",
                exit_code.map_or_else(|| "none".to_string(), |c| c.to_string()),
                command,
                stdout.as_deref().unwrap_or("None"),
                stderr.as_deref().unwrap_or("None"),
            ),
            other => other.to_string(),
        }
    }
}
