//! Stitcher configuration.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use camstitch_models::clip::{DEFAULT_FRONT_PATTERN, DEFAULT_PARKED_PATTERN};
use camstitch_models::encoding::{
    DEFAULT_AUDIO_BITRATE, DEFAULT_AUDIO_CODEC, DEFAULT_PRESET, DEFAULT_QP, DEFAULT_VIDEO_CODEC,
};
use camstitch_models::{EncodingConfig, TagRules};

use crate::error::StitchResult;

/// Maximum gap between a group's latest clip and the next one (2 hours).
pub const DEFAULT_GROUP_GAP: Duration = Duration::from_secs(2 * 60 * 60);

/// Pairs rendered together into one intermediate file.
pub const DEFAULT_BATCH_SIZE: usize = 4;

/// Upper bound on the gap, keeps the chrono conversion in range.
const MAX_GROUP_GAP_SECS: u64 = 100 * 365 * 24 * 60 * 60;

/// Which existing groups a new clip may join.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GroupingPolicy {
    /// Scan all groups in creation order and join the first that accepts.
    #[default]
    FirstMatch,
    /// Only consider the most recently created group.
    Latest,
}

impl FromStr for GroupingPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "first-match" | "first_match" | "first" => Ok(Self::FirstMatch),
            "latest" | "last" => Ok(Self::Latest),
            other => Err(format!("unknown grouping policy '{}'", other)),
        }
    }
}

/// Stitcher configuration.
#[derive(Debug, Clone)]
pub struct StitchConfig {
    /// Directory holding the dash-cam clips (not searched recursively)
    pub input_dir: PathBuf,
    /// Directory receiving intermediate and final videos
    pub output_dir: PathBuf,
    /// Maximum gap between consecutive clips of a group
    pub group_gap: Duration,
    /// Pairs per intermediate render
    pub batch_size: usize,
    /// Group scan policy
    pub grouping: GroupingPolicy,
    /// Regex marking front-camera clips
    pub front_pattern: String,
    /// Regex marking parking-mode clips
    pub parked_pattern: String,
    /// FFmpeg binary
    pub ffmpeg_path: String,
    /// FFprobe binary
    pub ffprobe_path: String,
    /// Capture encoder output instead of inheriting it
    pub capture_output: bool,
    /// Encoder settings for chunk renders and the final merge
    pub encoding: EncodingConfig,
}

impl Default for StitchConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("input"),
            output_dir: PathBuf::from("."),
            group_gap: DEFAULT_GROUP_GAP,
            batch_size: DEFAULT_BATCH_SIZE,
            grouping: GroupingPolicy::FirstMatch,
            front_pattern: DEFAULT_FRONT_PATTERN.to_string(),
            parked_pattern: DEFAULT_PARKED_PATTERN.to_string(),
            ffmpeg_path: "ffmpeg".to_string(),
            ffprobe_path: "ffprobe".to_string(),
            capture_output: false,
            encoding: EncodingConfig::default(),
        }
    }
}

impl StitchConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create config from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let parse = |key: &str| lookup(key).and_then(|s| s.trim().parse::<u64>().ok());

        Self {
            input_dir: lookup("CAMSTITCH_INPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("input")),
            output_dir: lookup("CAMSTITCH_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(".")),
            group_gap: Duration::from_secs(
                parse("CAMSTITCH_GROUP_GAP_SECS")
                    .unwrap_or(DEFAULT_GROUP_GAP.as_secs())
                    .min(MAX_GROUP_GAP_SECS),
            ),
            batch_size: parse("CAMSTITCH_BATCH_SIZE")
                .map(|n| n.max(1) as usize)
                .unwrap_or(DEFAULT_BATCH_SIZE),
            grouping: lookup("CAMSTITCH_GROUPING")
                .and_then(|s| s.parse().ok())
                .unwrap_or_default(),
            front_pattern: lookup("CAMSTITCH_FRONT_PATTERN")
                .unwrap_or_else(|| DEFAULT_FRONT_PATTERN.to_string()),
            parked_pattern: lookup("CAMSTITCH_PARKED_PATTERN")
                .unwrap_or_else(|| DEFAULT_PARKED_PATTERN.to_string()),
            ffmpeg_path: lookup("CAMSTITCH_FFMPEG").unwrap_or_else(|| "ffmpeg".to_string()),
            ffprobe_path: lookup("CAMSTITCH_FFPROBE").unwrap_or_else(|| "ffprobe".to_string()),
            capture_output: lookup("CAMSTITCH_CAPTURE_OUTPUT")
                .and_then(|s| parse_bool(&s))
                .unwrap_or(false),
            encoding: EncodingConfig {
                codec: lookup("CAMSTITCH_VIDEO_CODEC")
                    .unwrap_or_else(|| DEFAULT_VIDEO_CODEC.to_string()),
                preset: lookup("CAMSTITCH_PRESET").unwrap_or_else(|| DEFAULT_PRESET.to_string()),
                qp: lookup("CAMSTITCH_QP")
                    .and_then(|s| s.trim().parse().ok())
                    .unwrap_or(DEFAULT_QP),
                audio_codec: lookup("CAMSTITCH_AUDIO_CODEC")
                    .unwrap_or_else(|| DEFAULT_AUDIO_CODEC.to_string()),
                audio_bitrate: lookup("CAMSTITCH_AUDIO_BITRATE")
                    .unwrap_or_else(|| DEFAULT_AUDIO_BITRATE.to_string()),
                use_cuda: lookup("CAMSTITCH_CUDA")
                    .and_then(|s| parse_bool(&s))
                    .unwrap_or(true),
            },
        }
    }

    /// Compile the filename tag rules.
    pub fn tag_rules(&self) -> StitchResult<TagRules> {
        Ok(TagRules::new(&self.front_pattern, &self.parked_pattern)?)
    }

    /// Group gap as a chrono duration for timestamp arithmetic.
    pub fn gap(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.group_gap.as_secs().min(MAX_GROUP_GAP_SECS) as i64)
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> StitchConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        StitchConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]);
        assert_eq!(config.group_gap, Duration::from_secs(7200));
        assert_eq!(config.batch_size, 4);
        assert_eq!(config.grouping, GroupingPolicy::FirstMatch);
        assert_eq!(config.encoding, EncodingConfig::default());
        assert_eq!(config.gap(), chrono::Duration::hours(2));
        assert_eq!(config.input_dir, PathBuf::from("input"));
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("CAMSTITCH_GROUP_GAP_SECS", "600"),
            ("CAMSTITCH_BATCH_SIZE", "0"),
            ("CAMSTITCH_GROUPING", "latest"),
            ("CAMSTITCH_CUDA", "false"),
            ("CAMSTITCH_QP", "23"),
            ("CAMSTITCH_OUTPUT_DIR", "/videos"),
        ]);
        assert_eq!(config.group_gap, Duration::from_secs(600));
        assert_eq!(config.batch_size, 1);
        assert_eq!(config.grouping, GroupingPolicy::Latest);
        assert!(!config.encoding.use_cuda);
        assert_eq!(config.encoding.qp, 23);
        assert_eq!(config.output_dir, PathBuf::from("/videos"));
    }

    #[test]
    fn test_unparseable_values_fall_back() {
        let config = config_from(&[
            ("CAMSTITCH_GROUP_GAP_SECS", "two hours"),
            ("CAMSTITCH_GROUPING", "random"),
            ("CAMSTITCH_CUDA", "maybe"),
        ]);
        assert_eq!(config.group_gap, DEFAULT_GROUP_GAP);
        assert_eq!(config.grouping, GroupingPolicy::FirstMatch);
        assert!(config.encoding.use_cuda);
    }

    #[test]
    fn test_tag_rules_error() {
        let config = config_from(&[("CAMSTITCH_PARKED_PATTERN", "[")]);
        assert!(matches!(
            config.tag_rules(),
            Err(crate::error::StitchError::TagRule(_))
        ));
    }
}
