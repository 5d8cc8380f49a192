//! Dash-cam clip stitcher.
//!
//! This crate provides:
//! - Grouping of timestamped clips into recording sessions
//! - Batch planning of front/back picture-in-picture renders
//! - Sequential rendering with per-group failure isolation
//! - Scan summary reporting

pub mod config;
pub mod error;
pub mod grouper;
pub mod logging;
pub mod planner;
pub mod render;
pub mod report;

pub use config::{GroupingPolicy, StitchConfig};
pub use error::{StitchError, StitchResult};
pub use grouper::{assign_clip, list_input_files, Grouper, ScanOutcome, SkipReason, SkippedFile};
pub use logging::GroupLogger;
pub use planner::{BatchPlan, GroupPlan, Planner};
pub use render::{RenderOutcome, RenderSummary, Renderer};
pub use report::{estimated_compile_time, format_duration, summary_table};
