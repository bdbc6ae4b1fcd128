//! Scripted input for headless runs.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::snapshot::InputSnapshot;

/// Keys held for a number of frames.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputSegment {
    pub frames: u64,
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    pub boost: bool,
    /// Fires once, on the first frame of the segment.
    pub toggle_physics_mode: bool,
    /// Orbit delta applied every frame of the segment.
    pub orbit: (f32, f32),
    /// Zoom delta applied every frame of the segment.
    pub zoom: f32,
}

/// Consecutive segments; frames past the end are idle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InputScript {
    segments: Vec<InputSegment>,
}

impl InputScript {
    pub fn new(segments: Vec<InputSegment>) -> Self {
        Self { segments }
    }

    /// Parse a RON list of segments.
    pub fn from_ron(source: &str) -> Result<Self, ron::error::SpannedError> {
        ron::from_str(source)
    }

    /// Frames covered by all segments.
    pub fn total_frames(&self) -> u64 {
        self.segments.iter().map(|s| s.frames).sum()
    }

    /// Snapshot for the zero-based `frame`.
    pub fn snapshot_at(&self, frame: u64) -> InputSnapshot {
        let mut start = 0;
        for segment in &self.segments {
            if frame < start + segment.frames {
                return InputSnapshot {
                    left: segment.left,
                    right: segment.right,
                    up: segment.up,
                    down: segment.down,
                    boost: segment.boost,
                    toggle_physics_mode: segment.toggle_physics_mode && frame == start,
                    orbit_delta: Vec2::new(segment.orbit.0, segment.orbit.1),
                    zoom_delta: segment.zoom,
                };
            }
            start += segment.frames;
        }
        InputSnapshot::idle()
    }
}
