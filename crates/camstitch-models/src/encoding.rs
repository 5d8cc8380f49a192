//! Video encoding configuration.

use serde::{Deserialize, Serialize};

/// Default video codec (NVENC H.264)
pub const DEFAULT_VIDEO_CODEC: &str = "h264_nvenc";
/// Default audio codec
pub const DEFAULT_AUDIO_CODEC: &str = "aac";
/// Default encoding preset
pub const DEFAULT_PRESET: &str = "slow";
/// Default constant quantizer (lower is better)
pub const DEFAULT_QP: u8 = 20;
/// Default audio bitrate, also used as the silent-audio sample rate
pub const DEFAULT_AUDIO_BITRATE: &str = "44100";

/// Source frame size the back view is scaled from.
pub const SOURCE_WIDTH: u32 = 1920;
pub const SOURCE_HEIGHT: u32 = 1080;
/// Down-scale factor of the back view overlay.
pub const BACK_VIEW_SCALE: f64 = 1.5;

/// Video encoding configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncodingConfig {
    /// Video codec (e.g., "h264_nvenc", "libx264")
    #[serde(default = "default_video_codec")]
    pub codec: String,

    /// Encoding preset (e.g., "fast", "medium", "slow")
    #[serde(default = "default_preset")]
    pub preset: String,

    /// Constant quantizer
    #[serde(default = "default_qp")]
    pub qp: u8,

    /// Audio codec
    #[serde(default = "default_audio_codec")]
    pub audio_codec: String,

    /// Audio bitrate
    #[serde(default = "default_audio_bitrate")]
    pub audio_bitrate: String,

    /// Decode on the GPU and use the CUDA scale/overlay filters
    #[serde(default = "default_use_cuda")]
    pub use_cuda: bool,
}

fn default_video_codec() -> String {
    DEFAULT_VIDEO_CODEC.to_string()
}
fn default_preset() -> String {
    DEFAULT_PRESET.to_string()
}
fn default_qp() -> u8 {
    DEFAULT_QP
}
fn default_audio_codec() -> String {
    DEFAULT_AUDIO_CODEC.to_string()
}
fn default_audio_bitrate() -> String {
    DEFAULT_AUDIO_BITRATE.to_string()
}
fn default_use_cuda() -> bool {
    true
}

impl Default for EncodingConfig {
    fn default() -> Self {
        Self {
            codec: DEFAULT_VIDEO_CODEC.to_string(),
            preset: DEFAULT_PRESET.to_string(),
            qp: DEFAULT_QP,
            audio_codec: DEFAULT_AUDIO_CODEC.to_string(),
            audio_bitrate: DEFAULT_AUDIO_BITRATE.to_string(),
            use_cuda: true,
        }
    }
}

impl EncodingConfig {
    /// CPU-only configuration (libx264, software filters).
    pub fn software() -> Self {
        Self {
            codec: "libx264".to_string(),
            use_cuda: false,
            ..Default::default()
        }
    }

    /// Flags placed before every decoded input.
    pub fn input_args(&self) -> Vec<String> {
        if self.use_cuda {
            vec![
                "-hwaccel".to_string(),
                "cuda".to_string(),
                "-hwaccel_output_format".to_string(),
                "cuda".to_string(),
            ]
        } else {
            Vec::new()
        }
    }

    /// Convert to FFmpeg output arguments.
    pub fn to_ffmpeg_args(&self) -> Vec<String> {
        vec![
            "-c:v".to_string(),
            self.codec.clone(),
            "-preset".to_string(),
            self.preset.clone(),
            "-qp".to_string(),
            self.qp.to_string(),
            "-c:a".to_string(),
            self.audio_codec.clone(),
            "-b:a".to_string(),
            self.audio_bitrate.clone(),
        ]
    }

    /// Name of the scale filter for the configured decode path.
    pub fn scale_filter(&self) -> &'static str {
        if self.use_cuda {
            "scale_cuda"
        } else {
            "scale"
        }
    }

    /// Name of the overlay filter for the configured decode path.
    pub fn overlay_filter(&self) -> &'static str {
        if self.use_cuda {
            "overlay_cuda"
        } else {
            "overlay"
        }
    }

    /// Size of the scaled-down back view.
    pub fn back_view_size(&self) -> (u32, u32) {
        (
            (SOURCE_WIDTH as f64 / BACK_VIEW_SCALE).round() as u32,
            (SOURCE_HEIGHT as f64 / BACK_VIEW_SCALE).round() as u32,
        )
    }
}
