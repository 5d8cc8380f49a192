//! Batch pipeline planning.
//!
//! A group's front and back clips are paired by index, the pairs are split
//! into batches, and every batch becomes one FFmpeg render:
//!
//! ```text
//! fronts ──concat──▶ [front_v][front_a] ─────────────┐
//! backs  ──concat──▶ [back_v] ──scale──▶ [back_s] ──overlay(0,0)──▶ [v]
//! ```
//!
//! The batch files are then concatenated into the group's final video.

use std::path::{Path, PathBuf};

use camstitch_media::filters::concat_inputs;
use camstitch_media::{FfmpegCommand, FilterGraph, StreamRef};
use camstitch_models::{ClipGroup, EncodingConfig, MediaClip};

use crate::config::{StitchConfig, DEFAULT_BATCH_SIZE};

pub const FRONT_VIDEO: &str = "front_v";
pub const FRONT_AUDIO: &str = "front_a";
pub const BACK_VIDEO: &str = "back_v";
pub const BACK_SCALED: &str = "back_s";
pub const OUTPUT_VIDEO: &str = "v";

/// A (front, back) clip pair.
pub type ClipPair = (MediaClip, MediaClip);

/// Render plan for one batch of pairs.
#[derive(Debug, Clone)]
pub struct BatchPlan {
    /// Position of the batch within its group
    pub index: usize,
    pub pairs: Vec<ClipPair>,
    /// Intermediate file written by this batch
    pub output: PathBuf,
    pub command: FfmpegCommand,
}

/// Every render needed to produce one group's final video.
#[derive(Debug, Clone)]
pub struct GroupPlan {
    pub title: String,
    pub batches: Vec<BatchPlan>,
    /// Concatenation of the batch files, `None` when there is nothing to render
    pub merge: Option<FfmpegCommand>,
    pub final_output: PathBuf,
    /// Front clips without a back partner
    pub dropped_front: usize,
    /// Back clips without a front partner
    pub dropped_back: usize,
}

impl GroupPlan {
    pub fn pair_count(&self) -> usize {
        self.batches.iter().map(|b| b.pairs.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }

    /// All commands in execution order.
    pub fn commands(&self) -> impl Iterator<Item = &FfmpegCommand> {
        self.batches
            .iter()
            .map(|b| &b.command)
            .chain(self.merge.iter())
    }
}

/// Builds render plans for clip groups.
#[derive(Debug, Clone)]
pub struct Planner {
    encoding: EncodingConfig,
    batch_size: usize,
    output_dir: PathBuf,
}

impl Planner {
    pub fn new(encoding: EncodingConfig, batch_size: usize, output_dir: impl AsRef<Path>) -> Self {
        Self {
            encoding,
            batch_size: batch_size.max(1),
            output_dir: output_dir.as_ref().to_path_buf(),
        }
    }

    pub fn from_config(config: &StitchConfig) -> Self {
        Self::new(config.encoding.clone(), config.batch_size, &config.output_dir)
    }

    pub fn final_output(&self, group: &ClipGroup) -> PathBuf {
        self.output_dir.join(format!("{}.mp4", group.title()))
    }

    pub fn batch_output(&self, title: &str, index: usize) -> PathBuf {
        self.output_dir.join(format!("{}_{}.mp4", title, index))
    }

    /// Plan every render of `group`.
    pub fn plan(&self, group: &ClipGroup) -> GroupPlan {
        let title = group.title();
        let pairs = pair_clips(&group.front, &group.back);
        let pair_count = pairs.len();

        let batches: Vec<BatchPlan> = chunk_pairs(pairs, self.batch_size)
            .into_iter()
            .enumerate()
            .map(|(index, pairs)| {
                let output = self.batch_output(&title, index);
                let command = self.batch_command(&pairs, &output);
                BatchPlan {
                    index,
                    pairs,
                    output,
                    command,
                }
            })
            .collect();

        let final_output = self.final_output(group);
        let merge = if batches.is_empty() {
            None
        } else {
            let parts: Vec<&Path> = batches.iter().map(|b| b.output.as_path()).collect();
            Some(self.merge_command(&parts, &final_output))
        };

        GroupPlan {
            title,
            batches,
            merge,
            final_output,
            dropped_front: group.front.len() - pair_count,
            dropped_back: group.back.len() - pair_count,
        }
    }

    /// Build the picture-in-picture render of one batch.
    ///
    /// Pair `i` contributes inputs `2i` (front) and `2i + 1` (back).
    pub fn batch_command(&self, pairs: &[ClipPair], output: &Path) -> FfmpegCommand {
        let mut cmd = FfmpegCommand::new(output);
        let mut graph = FilterGraph::new(self.encoding.audio_bitrate.clone());
        let mut fronts = Vec::with_capacity(pairs.len());
        let mut backs = Vec::with_capacity(pairs.len());

        for (front, back) in pairs {
            let index = cmd.input_count();
            cmd = cmd.input_with_args(&front.path, self.encoding.input_args());
            let audio = if front.needs_silent_audio() {
                graph.silence(front.duration_secs)
            } else {
                StreamRef::audio(index)
            };
            fronts.push((StreamRef::video(index), Some(audio)));

            let index = cmd.input_count();
            cmd = cmd.input_with_args(&back.path, self.encoding.input_args());
            backs.push((StreamRef::video(index), None));
        }

        let (width, height) = self.encoding.back_view_size();
        let graph = graph
            .concat(
                &fronts,
                &StreamRef::label(FRONT_VIDEO),
                Some(&StreamRef::label(FRONT_AUDIO)),
            )
            .concat(&backs, &StreamRef::label(BACK_VIDEO), None)
            .scale(
                self.encoding.scale_filter(),
                &StreamRef::label(BACK_VIDEO),
                width,
                height,
                &StreamRef::label(BACK_SCALED),
            )
            .overlay(
                self.encoding.overlay_filter(),
                &StreamRef::label(FRONT_VIDEO),
                &StreamRef::label(BACK_SCALED),
                0,
                0,
                &StreamRef::label(OUTPUT_VIDEO),
            );

        cmd.filter_complex(graph.build())
            .map(OUTPUT_VIDEO)
            .map(FRONT_AUDIO)
            .output_args(self.encoding.to_ffmpeg_args())
    }

    /// Build the concatenation of batch files into the final video.
    pub fn merge_command(&self, parts: &[&Path], output: &Path) -> FfmpegCommand {
        parts
            .iter()
            .fold(FfmpegCommand::new(output), |cmd, part| cmd.input(part))
            .filter_complex(concat_inputs(parts.len()))
            .output_args(self.encoding.to_ffmpeg_args())
    }
}

impl Default for Planner {
    fn default() -> Self {
        Self::new(EncodingConfig::default(), DEFAULT_BATCH_SIZE, ".")
    }
}

/// Pair front and back clips by index, stopping at the shorter list.
pub fn pair_clips(front: &[MediaClip], back: &[MediaClip]) -> Vec<ClipPair> {
    front.iter().cloned().zip(back.iter().cloned()).collect()
}

/// Split pairs into consecutive batches of at most `size`.
pub fn chunk_pairs(pairs: Vec<ClipPair>, size: usize) -> Vec<Vec<ClipPair>> {
    pairs.chunks(size.max(1)).map(<[ClipPair]>::to_vec).collect()
}
