//! Grouping of dash-cam clips into recording sessions.
//!
//! Clips are visited in discovery order. A clip joins the first existing
//! group whose window (latest clip + gap) it falls into, otherwise it starts
//! a new group. Clips whose name or duration cannot be read are skipped.

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::Duration;
use tracing::{debug, warn};

use camstitch_media::DurationProbe;
use camstitch_models::{ClipGroup, ClipName, MediaClip, NameError, TagRules};

use crate::config::{GroupingPolicy, StitchConfig};
use crate::error::{StitchError, StitchResult};

/// Why a file was left out of every group.
#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    /// The file name carries no valid capture timestamp
    Name(NameError),
    /// The duration could not be probed
    Duration(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(e) => write!(f, "{}", e),
            Self::Duration(e) => write!(f, "duration unknown: {}", e),
        }
    }
}

/// A file that was not grouped.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: SkipReason,
}

/// Result of grouping a file list.
#[derive(Debug, Clone, Default)]
pub struct ScanOutcome {
    pub groups: Vec<ClipGroup>,
    pub skipped: Vec<SkippedFile>,
}

/// Groups clips into sessions, probing each clip's duration.
pub struct Grouper<P> {
    probe: P,
    rules: TagRules,
    gap: Duration,
    policy: GroupingPolicy,
}

impl<P: DurationProbe> Grouper<P> {
    pub fn new(probe: P, rules: TagRules, gap: Duration, policy: GroupingPolicy) -> Self {
        Self {
            probe,
            rules,
            gap,
            policy,
        }
    }

    /// Build a grouper from the stitcher configuration.
    pub fn from_config(probe: P, config: &StitchConfig) -> StitchResult<Self> {
        Ok(Self::new(
            probe,
            config.tag_rules()?,
            config.gap(),
            config.grouping,
        ))
    }

    /// Parse and probe one file.
    pub async fn load_clip(&self, path: &Path) -> Result<MediaClip, SkipReason> {
        let name = ClipName::parse(path, &self.rules).map_err(SkipReason::Name)?;
        let duration = self
            .probe
            .duration_secs(path)
            .await
            .map_err(|e| SkipReason::Duration(e.to_string()))?;
        Ok(name.with_duration(duration))
    }

    /// Group `files` in the given order, calling `on_file` after each file.
    pub async fn group<I, F>(&self, files: I, mut on_file: F) -> ScanOutcome
    where
        I: IntoIterator<Item = PathBuf>,
        F: FnMut(&Path),
    {
        let mut outcome = ScanOutcome::default();

        for path in files {
            match self.load_clip(&path).await {
                Ok(clip) => {
                    debug!(
                        clip = %path.display(),
                        view_point = ?clip.view_point,
                        motion = ?clip.motion,
                        duration_secs = clip.duration_secs,
                        "Loaded clip"
                    );
                    assign_clip(&mut outcome.groups, clip, self.gap, self.policy);
                }
                Err(reason) => {
                    warn!(clip = %path.display(), "Skipping clip: {}", reason);
                    outcome.skipped.push(SkippedFile {
                        path: path.clone(),
                        reason,
                    });
                }
            }
            on_file(&path);
        }

        outcome
    }
}

/// Place a clip into the first accepting group, or start a new group.
///
/// Returns the index of the group that received the clip.
pub fn assign_clip(
    groups: &mut Vec<ClipGroup>,
    clip: MediaClip,
    gap: Duration,
    policy: GroupingPolicy,
) -> usize {
    let at = clip.captured_at;
    let target = match policy {
        GroupingPolicy::FirstMatch => groups.iter().position(|g| g.accepts(at, gap)),
        GroupingPolicy::Latest => groups
            .last()
            .filter(|g| g.accepts(at, gap))
            .map(|_| groups.len() - 1),
    };

    match target {
        Some(index) => {
            groups[index].push(clip);
            index
        }
        None => {
            groups.push(ClipGroup::new(clip));
            groups.len() - 1
        }
    }
}

/// List the regular files of `dir` (non-recursive), sorted by file name.
pub async fn list_input_files(dir: &Path) -> StitchResult<Vec<PathBuf>> {
    if !tokio::fs::try_exists(dir).await? {
        return Err(StitchError::InputDirNotFound(dir.to_path_buf()));
    }

    let mut files = Vec::new();
    let mut entries = tokio::fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        if entry.file_type().await?.is_file() {
            files.push(entry.path());
        }
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}
