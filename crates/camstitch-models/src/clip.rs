//! Dash-cam clips and filename tags.

use chrono::NaiveDateTime;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::timestamp::{file_stem, parse_capture_time, NameError};

/// Default pattern marking a front-camera clip.
pub const DEFAULT_FRONT_PATTERN: &str = "A";
/// Default pattern marking a parking-mode clip.
pub const DEFAULT_PARKED_PATTERN: &str = "P";

/// Camera that recorded a clip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewPoint {
    Front,
    Back,
}

/// Recording mode of a clip.
///
/// Parking-mode front clips are recorded without audio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Motion {
    Parked,
    Moving,
}

/// Invalid tag pattern.
#[derive(Debug, Error)]
#[error("Invalid {which} pattern '{pattern}': {source}")]
pub struct TagRuleError {
    pub which: &'static str,
    pub pattern: String,
    #[source]
    pub source: regex::Error,
}

/// Rules classifying a file stem into view-point and motion tags.
///
/// A stem matching `front` is a front clip, anything else is a back clip.
/// A stem matching `parked` is a parking-mode clip, anything else is moving.
/// The defaults match a literal `A` and `P` anywhere in the stem.
#[derive(Debug, Clone)]
pub struct TagRules {
    front: Regex,
    parked: Regex,
}

impl TagRules {
    /// Build rules from two regular expressions.
    pub fn new(front: &str, parked: &str) -> Result<Self, TagRuleError> {
        Ok(Self {
            front: compile("front", front)?,
            parked: compile("parked", parked)?,
        })
    }

    /// Classify a file stem.
    pub fn classify(&self, stem: &str) -> (ViewPoint, Motion) {
        let view_point = if self.front.is_match(stem) {
            ViewPoint::Front
        } else {
            ViewPoint::Back
        };
        let motion = if self.parked.is_match(stem) {
            Motion::Parked
        } else {
            Motion::Moving
        };
        (view_point, motion)
    }

    pub fn front_pattern(&self) -> &str {
        self.front.as_str()
    }

    pub fn parked_pattern(&self) -> &str {
        self.parked.as_str()
    }
}

impl Default for TagRules {
    fn default() -> Self {
        Self {
            front: Regex::new(DEFAULT_FRONT_PATTERN).expect("default front pattern is valid"),
            parked: Regex::new(DEFAULT_PARKED_PATTERN).expect("default parked pattern is valid"),
        }
    }
}

fn compile(which: &'static str, pattern: &str) -> Result<Regex, TagRuleError> {
    Regex::new(pattern).map_err(|source| TagRuleError {
        which,
        pattern: pattern.to_string(),
        source,
    })
}

/// Everything derivable from a clip's file name alone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipName {
    pub path: PathBuf,
    pub captured_at: NaiveDateTime,
    pub view_point: ViewPoint,
    pub motion: Motion,
}

impl ClipName {
    /// Parse a file name with the given tag rules.
    pub fn parse(path: impl AsRef<Path>, rules: &TagRules) -> Result<Self, NameError> {
        let path = path.as_ref();
        let captured_at = parse_capture_time(path)?;
        let (view_point, motion) = rules.classify(file_stem(path)?);

        Ok(Self {
            path: path.to_path_buf(),
            captured_at,
            view_point,
            motion,
        })
    }

    /// Attach a probed duration, producing the final clip.
    pub fn with_duration(self, duration_secs: u32) -> MediaClip {
        MediaClip {
            path: self.path,
            captured_at: self.captured_at,
            view_point: self.view_point,
            motion: self.motion,
            duration_secs,
        }
    }
}

/// One probed dash-cam clip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaClip {
    /// Path to the media file
    pub path: PathBuf,
    /// Capture time parsed from the file name
    pub captured_at: NaiveDateTime,
    /// Camera that recorded the clip
    pub view_point: ViewPoint,
    /// Recording mode
    pub motion: Motion,
    /// Duration in whole seconds
    pub duration_secs: u32,
}

impl MediaClip {
    /// Whether the clip has no audio track of its own.
    pub fn needs_silent_audio(&self) -> bool {
        self.motion == Motion::Parked && self.view_point == ViewPoint::Front
    }
}
