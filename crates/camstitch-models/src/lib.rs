//! Shared data models for camstitch.
//!
//! This crate provides Serde-serializable types for:
//! - Dash-cam clips and their view-point/motion tags
//! - Recording sessions (clip groups)
//! - Capture timestamps parsed from file names
//! - Encoding configuration

pub mod clip;
pub mod encoding;
pub mod group;
pub mod timestamp;

// Re-export common types
pub use clip::{ClipName, MediaClip, Motion, TagRuleError, TagRules, ViewPoint};
pub use encoding::EncodingConfig;
pub use group::ClipGroup;
pub use timestamp::{group_title, parse_capture_time, NameError};
