//! Once-per-second throughput report emitted by the game loop.
//!
//! Delivered to a [`MetricsSink`](crate::gameloop::MetricsSink); the binary
//! forwards them over a channel and prints them like a window title line.

use std::fmt;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FrameReport {
    /// Render passes in the last second.
    pub frames: u32,
    /// Logical ticks in the last second.
    pub ticks: u32,
    /// Mean frames per second since the loop started.
    pub average_frames: u32,
    /// Whole seconds reported so far.
    pub seconds: u32,
}

impl fmt::Display for FrameReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "FPS: {},   AVG: {},   TPS: {},   SEC: {}",
            self.frames, self.average_frames, self.ticks, self.seconds
        )
    }
}
