//! FFmpeg CLI wrapper for dash-cam merging.
//!
//! This crate provides:
//! - Type-safe FFmpeg command building with multiple inputs
//! - A filter graph builder for named-stream operations
//! - The `Encoder` capability and its child-process implementation
//! - Clip duration probing through FFprobe

pub mod command;
pub mod error;
pub mod filters;
pub mod probe;

pub use command::{
    check_ffmpeg, check_ffprobe, Encoder, EncoderOutput, FfmpegCommand, FfmpegRunner,
};
pub use error::{MediaError, MediaResult};
pub use filters::{FilterGraph, StreamRef};
pub use probe::{parse_duration, DurationProbe, Ffprobe};
