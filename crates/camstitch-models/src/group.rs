//! Recording sessions.

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::clip::{MediaClip, ViewPoint};
use crate::timestamp::group_title;

/// A run of clips captured within a bounded gap of each other.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipGroup {
    /// Capture time of the first clip
    pub start: NaiveDateTime,
    /// Capture time of the most recently added clip
    pub end: NaiveDateTime,
    /// Front clips in discovery order
    pub front: Vec<MediaClip>,
    /// Back clips in discovery order
    pub back: Vec<MediaClip>,
    /// Final merged video, once rendered
    pub final_output: Option<PathBuf>,
}

impl ClipGroup {
    /// Start a new group from its first clip.
    pub fn new(clip: MediaClip) -> Self {
        let mut group = Self {
            start: clip.captured_at,
            end: clip.captured_at,
            front: Vec::new(),
            back: Vec::new(),
            final_output: None,
        };
        group.push(clip);
        group
    }

    /// Whether a clip captured at `at` falls inside this group's window.
    pub fn accepts(&self, at: NaiveDateTime, gap: Duration) -> bool {
        at - gap < self.end
    }

    /// Append a clip and advance the window end to its capture time.
    pub fn push(&mut self, clip: MediaClip) {
        self.end = clip.captured_at;
        match clip.view_point {
            ViewPoint::Front => self.front.push(clip),
            ViewPoint::Back => self.back.push(clip),
        }
    }

    pub fn title(&self) -> String {
        group_title(&self.start)
    }

    /// Time between the first and the most recent clip.
    pub fn span(&self) -> Duration {
        self.end - self.start
    }

    pub fn clip_count(&self) -> usize {
        self.front.len() + self.back.len()
    }

    /// Length of the merged video in minutes (one front clip per minute).
    pub fn real_minutes(&self) -> usize {
        self.front.len()
    }

    /// Front and back clip counts differ.
    pub fn has_missing_pair(&self) -> bool {
        self.front.len() != self.back.len()
    }

    /// Number of renderable (front, back) pairs.
    pub fn pair_count(&self) -> usize {
        self.front.len().min(self.back.len())
    }

    /// Every clip in the group, front clips first.
    pub fn clips(&self) -> impl Iterator<Item = &MediaClip> {
        self.front.iter().chain(self.back.iter())
    }
}
